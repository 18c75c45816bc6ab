use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "lift")]
#[command(bin_name = "lift")]
#[command(version)]
#[command(about = "Plan workout routines and log sessions against them")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        short = 'd',
        long,
        env = "LIFT_DB_PATH",
        help = "Path to the SQLite database (default: data/fitness.sqlite)."
    )]
    pub db: Option<String>,

    #[arg(
        short = 'c',
        long,
        env = "LIFT_CONFIG",
        help = "TOML config file (default: ./lift.toml when present)."
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "LIFT_LOG",
        help = "Log filter such as warn, info or lift=debug; RUST_LOG wins."
    )]
    pub log_level: Option<String>,

    #[arg(long, global = true, help = "Print JSON instead of text.")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Create, edit and inspect routines.")]
    Routine(RoutineArgs),
    #[command(about = "Manage routine slots (one or more exercises run back to back).")]
    Slot(SlotArgs),
    #[command(about = "Manage exercises placed in a slot.")]
    Item(ItemArgs),
    #[command(about = "Manage planned sets.")]
    Set(SetArgs),
    #[command(about = "Start, log and finish workout sessions.")]
    Workout(WorkoutArgs),
    #[command(about = "Browse the exercise library.")]
    Exercise(ExerciseArgs),
    #[command(about = "Load the exercise library from a local JSON file.")]
    Catalog(CatalogArgs),
    #[command(about = "Show or update the user profile.")]
    Profile(ProfileArgs),
    #[command(about = "Check that the database answers.")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn toward_top(self) -> bool {
        self == MoveDirection::Up
    }
}

#[derive(Debug, Args)]
pub struct RoutineArgs {
    #[command(subcommand)]
    pub command: RoutineSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum RoutineSubcommands {
    #[command(about = "Create an empty routine.")]
    New(RoutineNewArgs),
    #[command(about = "Rename a routine or replace its description.")]
    Update(RoutineUpdateArgs),
    #[command(about = "Delete a routine and everything in it.")]
    Delete(IdArgs),
    #[command(about = "Show the full routine tree.")]
    Show(IdArgs),
    #[command(about = "List routines.")]
    Ls,
    #[command(about = "Replace the weekdays a routine is scheduled on.")]
    Days(RoutineDaysArgs),
}

#[derive(Debug, Args)]
pub struct RoutineNewArgs {
    #[arg(help = "Routine name (1-100 characters).")]
    pub name: String,
    #[arg(short = 'm', long = "desc", default_value = "", help = "Description.")]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct RoutineUpdateArgs {
    #[arg(help = "Routine id.")]
    pub id: i64,
    #[arg(help = "New name.")]
    pub name: String,
    #[arg(short = 'm', long = "desc", default_value = "", help = "New description.")]
    pub description: String,
}

#[derive(Debug, Args)]
pub struct RoutineDaysArgs {
    #[arg(help = "Routine id.")]
    pub id: i64,
    #[arg(help = "Weekdays (monday..sunday or mon..sun); none clears the schedule.")]
    pub days: Vec<String>,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    #[arg(help = "Row id.")]
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    #[arg(help = "Row id.")]
    pub id: i64,
    #[arg(value_enum, help = "Direction to move.")]
    pub direction: MoveDirection,
}

#[derive(Debug, Args)]
pub struct SlotArgs {
    #[command(subcommand)]
    pub command: SlotSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum SlotSubcommands {
    #[command(about = "Append an empty slot to a routine.")]
    Add(SlotAddArgs),
    #[command(about = "Swap a slot with its neighbour.")]
    Move(MoveArgs),
    #[command(about = "Delete a slot and its exercises.")]
    Delete(IdArgs),
}

#[derive(Debug, Args)]
pub struct SlotAddArgs {
    #[arg(help = "Routine id.")]
    pub routine_id: i64,
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ItemSubcommands {
    #[command(about = "Add an exercise to a slot with one empty set.")]
    Add(ItemAddArgs),
    #[command(about = "Show an exercise item with its sets.")]
    Show(IdArgs),
    #[command(about = "Set rest time and notes.")]
    Update(ItemUpdateArgs),
    #[command(about = "Swap an exercise item with its neighbour.")]
    Move(MoveArgs),
    #[command(about = "Delete an exercise item; an emptied slot goes too.")]
    Delete(IdArgs),
}

#[derive(Debug, Args)]
pub struct ItemAddArgs {
    #[arg(help = "Slot id.")]
    pub slot_id: i64,
    #[arg(help = "Exercise id from the library.")]
    pub exercise_id: String,
}

#[derive(Debug, Args)]
pub struct ItemUpdateArgs {
    #[arg(help = "Exercise item id.")]
    pub id: i64,
    #[arg(short = 'r', long, default_value_t = 0, help = "Rest after the exercise, seconds (0-3600).")]
    pub rest: i64,
    #[arg(short = 'n', long, default_value = "", help = "Free-text notes.")]
    pub notes: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum SetSubcommands {
    #[command(about = "Append a set copying the previous one.")]
    Add(SetAddArgs),
    #[command(about = "Overwrite a set's planned values; omitted values are cleared.")]
    Update(SetUpdateArgs),
    #[command(about = "Swap a set with its neighbour.")]
    Move(MoveArgs),
    #[command(about = "Delete a set.")]
    Delete(IdArgs),
}

#[derive(Debug, Args)]
pub struct SetAddArgs {
    #[arg(help = "Exercise item id.")]
    pub item_id: i64,
}

#[derive(Debug, Args)]
pub struct SetValueArgs {
    #[arg(short = 'r', long, help = "Reps (1-99).")]
    pub reps: Option<i64>,
    #[arg(short = 'w', long, help = "Weight (>0, at most 300).")]
    pub weight: Option<f64>,
    #[arg(short = 't', long, help = "Duration in seconds (1-7200).")]
    pub duration: Option<i64>,
}

#[derive(Debug, Args)]
pub struct SetUpdateArgs {
    #[arg(help = "Set id.")]
    pub id: i64,
    #[command(flatten)]
    pub values: SetValueArgs,
}

#[derive(Debug, Args)]
pub struct WorkoutArgs {
    #[command(subcommand)]
    pub command: WorkoutSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum WorkoutSubcommands {
    #[command(about = "Start a session from a routine.")]
    Start(WorkoutStartArgs),
    #[command(about = "Show the open session, if any.")]
    Active,
    #[command(about = "Show one session.")]
    Show(IdArgs),
    #[command(about = "List sessions, newest first.")]
    Ls,
    #[command(about = "Record the measured values of a set.")]
    Log(WorkoutLogArgs),
    #[command(about = "Record how long a slot took and the rest after it.")]
    Timing(WorkoutTimingArgs),
    #[command(about = "Record the rest actually taken after an exercise.")]
    Rest(WorkoutRestArgs),
    #[command(about = "Finish a session with its total duration.")]
    End(WorkoutEndArgs),
    #[command(about = "Delete a session and everything logged in it.")]
    Discard(IdArgs),
}

#[derive(Debug, Args)]
pub struct WorkoutStartArgs {
    #[arg(help = "Routine id.")]
    pub routine_id: i64,
}

#[derive(Debug, Args)]
pub struct WorkoutLogArgs {
    #[arg(help = "Record set id.")]
    pub record_set_id: i64,
    #[command(flatten)]
    pub values: SetValueArgs,
    #[arg(long = "at", help = "Completion time (RFC3339); defaults to now.")]
    pub completed_at: Option<String>,
}

#[derive(Debug, Args)]
pub struct WorkoutTimingArgs {
    #[arg(help = "Record item id.")]
    pub record_item_id: i64,
    #[arg(short = 't', long, help = "Time spent on the slot, seconds; omit to keep.")]
    pub duration: Option<i64>,
    #[arg(short = 'r', long, help = "Rest taken after the slot, seconds; omit to keep.")]
    pub rest: Option<i64>,
}

#[derive(Debug, Args)]
pub struct WorkoutRestArgs {
    #[arg(help = "Record exercise item id.")]
    pub record_exercise_item_id: i64,
    #[arg(short = 'r', long, help = "Rest taken, seconds; omit to clear.")]
    pub rest: Option<i64>,
}

#[derive(Debug, Args)]
pub struct WorkoutEndArgs {
    #[arg(help = "Session id.")]
    pub id: i64,
    #[arg(help = "Total duration in seconds.")]
    pub duration: i64,
}

#[derive(Debug, Args)]
pub struct ExerciseArgs {
    #[command(subcommand)]
    pub command: ExerciseSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ExerciseSubcommands {
    #[command(about = "List exercises.")]
    Ls,
    #[command(about = "Show one exercise with image URLs.")]
    Show(ExerciseShowArgs),
}

#[derive(Debug, Args)]
pub struct ExerciseShowArgs {
    #[arg(help = "Exercise id.")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum CatalogSubcommands {
    #[command(about = "Upsert exercises from a free-exercise-db JSON file.")]
    Load(CatalogLoadArgs),
    #[command(about = "Show when the library was last loaded.")]
    Status,
}

#[derive(Debug, Args)]
pub struct CatalogLoadArgs {
    #[arg(help = "Path to exercises.json.")]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileSubcommands,
}

#[derive(Debug, Subcommand)]
pub enum ProfileSubcommands {
    #[command(about = "Show the profile.")]
    Show,
    #[command(about = "Overwrite the profile.")]
    Update(ProfileUpdateArgs),
    #[command(about = "Show height and weight history.")]
    History,
}

#[derive(Debug, Args)]
pub struct ProfileUpdateArgs {
    #[arg(short = 'n', long, help = "Name (1-50 characters).")]
    pub name: String,
    #[arg(long, help = "Mark the profile as female.")]
    pub female: bool,
    #[arg(long, help = "Height (0-250).")]
    pub height: Option<f64>,
    #[arg(long, help = "Weight (0-200).")]
    pub weight: Option<f64>,
    #[arg(long = "birth-date", help = "Birth date, YYYY-MM-DD.")]
    pub birth_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, MoveDirection, SetSubcommands, WorkoutSubcommands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_update_with_partial_values() {
        let cli = Cli::parse_from(["lift", "--json", "set", "update", "7", "--reps", "10"]);
        assert!(cli.json);
        match cli.command {
            Commands::Set(args) => match args.command {
                SetSubcommands::Update(update) => {
                    assert_eq!(update.id, 7);
                    assert_eq!(update.values.reps, Some(10));
                    assert_eq!(update.values.weight, None);
                }
                other => panic!("unexpected set command: {:?}", other),
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_move_direction_and_workout_end() {
        let cli = Cli::parse_from(["lift", "slot", "move", "3", "up"]);
        match cli.command {
            Commands::Slot(args) => match args.command {
                super::SlotSubcommands::Move(args) => {
                    assert_eq!(args.direction, MoveDirection::Up);
                    assert!(args.direction.toward_top());
                }
                other => panic!("unexpected slot command: {:?}", other),
            },
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::parse_from(["lift", "workout", "end", "4", "1800", "--json"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Workout(args) if matches!(
                args.command,
                WorkoutSubcommands::End(ref end) if end.id == 4 && end.duration == 1800
            )
        ));
    }
}

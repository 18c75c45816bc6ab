mod app;
mod catalog;
mod cli;
mod config;
mod db;
mod domain;
mod logging;
mod ordering;
mod profile;
mod routines;
mod ui;
mod workouts;

use serde::Serialize;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn print_json(value: &impl Serialize) -> Result<(), app::AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints `value` as JSON or through the text renderer.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T)) -> Result<(), app::AppError> {
    if json {
        print_json(value)
    } else {
        text(value);
        Ok(())
    }
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;
    use cli::Commands;

    let cli = cli::Cli::parse();
    let settings = config::Settings::load(config::Overrides {
        config_path: cli.config.clone(),
        db_path: cli.db.clone(),
        log_level: cli.log_level.clone(),
    })?;
    logging::init(&settings.log_level);
    tracing::debug!(db = %settings.db_path, "opening store");

    let app = app::App::open(&settings.db_path, &settings.image_base_url)?;
    let json = cli.json;

    match cli.command {
        Commands::Routine(args) => run_routine(&app, args.command, json),
        Commands::Slot(args) => run_slot(&app, args.command, json),
        Commands::Item(args) => run_item(&app, args.command, json),
        Commands::Set(args) => run_set(&app, args.command, json),
        Commands::Workout(args) => run_workout(&app, args.command, json),
        Commands::Exercise(args) => run_exercise(&app, args.command, json),
        Commands::Catalog(args) => run_catalog(&app, args.command, json),
        Commands::Profile(args) => run_profile(&app, args.command, json),
        Commands::Health => {
            app.ping()?;
            emit(json, &serde_json::json!({ "status": "ok" }), |_| {
                println!("ok")
            })
        }
    }
}

fn run_routine(
    app: &app::App,
    command: cli::RoutineSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::RoutineSubcommands;

    let routines = app.routines();
    match command {
        RoutineSubcommands::New(args) => {
            let routine = routines.create_routine(&args.name, &args.description)?;
            emit(json, &routine, ui::print_routine)
        }
        RoutineSubcommands::Update(args) => {
            let routine = routines.update_routine(args.id, &args.name, &args.description)?;
            emit(json, &routine, ui::print_routine)
        }
        RoutineSubcommands::Delete(args) => {
            routines.delete_routine(args.id)?;
            emit(json, &serde_json::json!({ "deleted": args.id }), |_| {
                println!("deleted routine {}", args.id)
            })
        }
        RoutineSubcommands::Show(args) => {
            let routine = routines.get_routine(args.id)?;
            emit(json, &routine, ui::print_routine)
        }
        RoutineSubcommands::Ls => {
            let list = routines.list_routines()?;
            emit(json, &list, |list| ui::print_routine_list(list))
        }
        RoutineSubcommands::Days(args) => {
            let routine = routines.set_routine_days(args.id, &args.days)?;
            emit(json, &routine, ui::print_routine)
        }
    }
}

fn run_slot(
    app: &app::App,
    command: cli::SlotSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::SlotSubcommands;

    let routines = app.routines();
    match command {
        SlotSubcommands::Add(args) => {
            let id = routines.add_routine_item(args.routine_id)?;
            emit(
                json,
                &serde_json::json!({ "routine_id": args.routine_id, "routine_item_id": id }),
                |_| println!("added slot {} to routine {}", id, args.routine_id),
            )
        }
        SlotSubcommands::Move(args) => {
            let plan = routines.move_routine_item(args.id, args.direction.toward_top())?;
            print_move(json, "slot", args.id, plan)
        }
        SlotSubcommands::Delete(args) => {
            let routine_id = routines.delete_routine_item(args.id)?;
            print_deleted(json, "slot", args.id, routine_id)
        }
    }
}

fn run_item(
    app: &app::App,
    command: cli::ItemSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::ItemSubcommands;

    let routines = app.routines();
    match command {
        ItemSubcommands::Add(args) => {
            let item = routines.add_exercise_to_item(args.slot_id, &args.exercise_id)?;
            emit(json, &item, ui::print_exercise_item)
        }
        ItemSubcommands::Show(args) => {
            let item = routines.get_exercise_item(args.id)?;
            emit(json, &item, ui::print_exercise_item)
        }
        ItemSubcommands::Update(args) => {
            let item = routines.update_exercise_item(args.id, args.rest, &args.notes)?;
            emit(json, &item, ui::print_exercise_item)
        }
        ItemSubcommands::Move(args) => {
            let plan = routines.move_exercise_item(args.id, args.direction.toward_top())?;
            print_move(json, "item", args.id, plan)
        }
        ItemSubcommands::Delete(args) => {
            let routine_id = routines.delete_exercise_item(args.id)?;
            print_deleted(json, "item", args.id, routine_id)
        }
    }
}

fn run_set(app: &app::App, command: cli::SetSubcommands, json: bool) -> Result<(), app::AppError> {
    use cli::SetSubcommands;

    let routines = app.routines();
    match command {
        SetSubcommands::Add(args) => {
            let set = routines.add_set(args.item_id)?;
            emit(json, &set, ui::print_planned_set)
        }
        SetSubcommands::Update(args) => {
            let set = routines.update_set(args.id, set_values(&args.values))?;
            emit(json, &set, ui::print_planned_set)
        }
        SetSubcommands::Move(args) => {
            let plan = routines.move_set(args.id, args.direction.toward_top())?;
            print_move(json, "set", args.id, plan)
        }
        SetSubcommands::Delete(args) => {
            let routine_id = routines.delete_set(args.id)?;
            print_deleted(json, "set", args.id, routine_id)
        }
    }
}

fn run_workout(
    app: &app::App,
    command: cli::WorkoutSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::WorkoutSubcommands;

    let workouts = app.workouts();
    match command {
        WorkoutSubcommands::Start(args) => {
            let session = workouts.start_session(args.routine_id)?;
            emit(json, &session, ui::print_session)
        }
        WorkoutSubcommands::Active => {
            let state = workouts.state()?;
            let active = workouts.get_active_session()?;
            emit(
                json,
                &serde_json::json!({ "state": state, "session": active }),
                |_| match &active {
                    Some(session) => ui::print_session(session),
                    None => println!("no active session ({})", state.as_str()),
                },
            )
        }
        WorkoutSubcommands::Show(args) => {
            let session = workouts.get_session(args.id)?;
            emit(json, &session, ui::print_session)
        }
        WorkoutSubcommands::Ls => {
            let sessions = workouts.list_sessions()?;
            emit(json, &sessions, |sessions| ui::print_session_list(sessions))
        }
        WorkoutSubcommands::Log(args) => {
            let set = workouts.record_set_completion(
                args.record_set_id,
                set_values(&args.values),
                args.completed_at.as_deref(),
            )?;
            emit(json, &set, ui::print_record_set)
        }
        WorkoutSubcommands::Timing(args) => {
            workouts.record_item_timing(args.record_item_id, args.duration, args.rest)?;
            emit(
                json,
                &serde_json::json!({
                    "record_item_id": args.record_item_id,
                    "duration": args.duration,
                    "actual_rest_time": args.rest,
                }),
                |_| println!("recorded timing for record item {}", args.record_item_id),
            )
        }
        WorkoutSubcommands::Rest(args) => {
            workouts.record_exercise_rest(args.record_exercise_item_id, args.rest)?;
            emit(
                json,
                &serde_json::json!({
                    "record_exercise_item_id": args.record_exercise_item_id,
                    "actual_rest_time": args.rest,
                }),
                |_| {
                    println!(
                        "recorded rest for record exercise item {}",
                        args.record_exercise_item_id
                    )
                },
            )
        }
        WorkoutSubcommands::End(args) => {
            let session = workouts.end_session(args.id, args.duration)?;
            emit(json, &session, ui::print_session)
        }
        WorkoutSubcommands::Discard(args) => {
            workouts.discard_session(args.id)?;
            emit(json, &serde_json::json!({ "discarded": args.id }), |_| {
                println!("discarded session {}", args.id)
            })
        }
    }
}

fn run_exercise(
    app: &app::App,
    command: cli::ExerciseSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use catalog::ExerciseCatalog;
    use cli::ExerciseSubcommands;

    let catalog = app.catalog();
    match command {
        ExerciseSubcommands::Ls => {
            let exercises = catalog.list_all()?;
            emit(json, &exercises, |exercises| ui::print_exercise_list(exercises))
        }
        ExerciseSubcommands::Show(args) => {
            let exercise = catalog.get_by_id(&args.id)?.ok_or_else(|| {
                app::AppError::not_found(app::EntityKind::Exercise, &args.id)
            })?;
            emit(json, &catalog.view(exercise), ui::print_exercise)
        }
    }
}

fn run_catalog(
    app: &app::App,
    command: cli::CatalogSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::CatalogSubcommands;

    match command {
        CatalogSubcommands::Load(args) => {
            let summary = app.catalog_sync().load_file(app.connection(), &args.file)?;
            emit(json, &summary, |summary| {
                println!(
                    "loaded {}: {} created, {} updated, {} unchanged, {} skipped",
                    summary.source,
                    summary.created_count,
                    summary.updated_count,
                    summary.unchanged_count,
                    summary.skipped_count
                );
                if let Some(last_error) = summary.last_error.as_deref() {
                    println!("last skipped: {last_error}");
                }
            })
        }
        CatalogSubcommands::Status => {
            let last_sync = app.catalog_sync().last_sync();
            emit(json, &serde_json::json!({ "last_sync": last_sync }), |_| {
                match last_sync.as_deref() {
                    Some(at) => println!("last loaded {at}"),
                    None => println!("never loaded"),
                }
            })
        }
    }
}

fn run_profile(
    app: &app::App,
    command: cli::ProfileSubcommands,
    json: bool,
) -> Result<(), app::AppError> {
    use cli::ProfileSubcommands;

    let profile = app.profile();
    match command {
        ProfileSubcommands::Show => {
            let current = profile.get_profile()?;
            emit(json, &current, ui::print_profile)
        }
        ProfileSubcommands::Update(args) => {
            let updated = profile.update_profile(profile::ProfileUpdate {
                name: args.name,
                is_female: args.female,
                height: args.height,
                weight: args.weight,
                birth_date: args.birth_date,
            })?;
            emit(json, &updated, ui::print_profile)
        }
        ProfileSubcommands::History => {
            let history = profile.measurement_history()?;
            emit(json, &history, ui::print_history)
        }
    }
}

fn set_values(args: &cli::SetValueArgs) -> domain::model::SetValues {
    domain::model::SetValues {
        reps: args.reps,
        weight: args.weight,
        duration: args.duration,
    }
}

fn print_move(
    json: bool,
    label: &str,
    id: i64,
    plan: ordering::SwapPlan,
) -> Result<(), app::AppError> {
    emit(
        json,
        &serde_json::json!({
            "id": id,
            "order_index": plan.neighbor.order_index,
            "swapped_with": plan.neighbor.id,
        }),
        |_| {
            println!(
                "moved {} {} to position {} (swapped with {})",
                label, id, plan.neighbor.order_index, plan.neighbor.id
            )
        },
    )
}

fn print_deleted(
    json: bool,
    label: &str,
    id: i64,
    routine_id: i64,
) -> Result<(), app::AppError> {
    emit(
        json,
        &serde_json::json!({ "deleted": id, "routine_id": routine_id }),
        |_| println!("deleted {} {} from routine {}", label, id, routine_id),
    )
}

use std::io::{self, IsTerminal};

use crate::catalog::ExerciseView;
use crate::domain::model::{
    Exercise, ExerciseItem, MeasurementHistory, PlannedSet, RecordRoutine, RecordSet, Routine,
    RoutineSummary, SessionSummary, SetValues, UserProfile,
};
use crate::domain::session::SessionState;

pub fn print_routine(routine: &Routine) {
    let palette = Palette::auto();
    println!(
        "{} {}",
        palette.id(&format!("#{}", routine.id)),
        palette.heading(&routine.name)
    );
    if !routine.description.is_empty() {
        println!("{}", palette.dim(&routine.description));
    }
    if !routine.days.is_empty() {
        println!("{}", palette.dim(&format!("days: {}", routine.days.join(", "))));
    }
    if routine.items.is_empty() {
        println!("{}", palette.dim("no slots yet"));
        return;
    }

    for item in &routine.items {
        let label = if item.is_superset() { "superset" } else { "slot" };
        println!(
            "{} {}",
            palette.id(&format!("[{}] {}", item.order_index, label)),
            palette.dim(&format!("id={}", item.id))
        );
        for exercise_item in &item.exercise_items {
            for line in exercise_item_lines(exercise_item, &palette, 1) {
                println!("{line}");
            }
        }
    }
}

pub fn print_exercise_item(item: &ExerciseItem) {
    let palette = Palette::auto();
    for line in exercise_item_lines(item, &palette, 0) {
        println!("{line}");
    }
}

fn exercise_item_lines(item: &ExerciseItem, palette: &Palette, depth: usize) -> Vec<String> {
    let indent = "  ".repeat(depth);
    let mut lines = vec![format!(
        "{indent}{} {} {}",
        palette.id(&format!("item {}", item.id)),
        item.exercise_id,
        palette.dim(&format!("rest {}s", item.rest_time))
    )];
    if !item.notes.is_empty() {
        lines.push(format!("{indent}  {}", palette.dim(&item.notes)));
    }
    for set in &item.sets {
        lines.push(format!("{indent}  {}", planned_set_line(set, palette)));
    }
    lines
}

fn planned_set_line(set: &PlannedSet, palette: &Palette) -> String {
    let kind = if set.is_timed() { " timed" } else { "" };
    format!(
        "{} {}{}",
        palette.id(&format!("set {}", set.id)),
        describe_values(&set.values()),
        palette.dim(kind)
    )
}

pub fn print_planned_set(set: &PlannedSet) {
    println!("{}", planned_set_line(set, &Palette::auto()));
}

pub fn print_routine_list(routines: &[RoutineSummary]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Routines"));
    if routines.is_empty() {
        println!("{}", palette.dim("no routines yet"));
        return;
    }
    for routine in routines {
        let days = if routine.days.is_empty() {
            String::new()
        } else {
            format!(" ({})", routine.days.join(", "))
        };
        println!(
            "{} {} {}{}",
            palette.id(&format!("#{}", routine.id)),
            routine.name,
            palette.dim(&format!("{} slot(s)", routine.item_count)),
            palette.dim(&days)
        );
    }
}

pub fn print_session(session: &RecordRoutine) {
    let palette = Palette::auto();
    println!(
        "{} {} {}",
        palette.id(&format!("session {}", session.id)),
        palette.state(session.state),
        palette.dim(&format!(
            "routine {} | {}/{} sets done{}",
            session.routine_id,
            session.completed_set_count(),
            session.set_count(),
            session
                .duration
                .map(|seconds| format!(" | {}", format_duration(seconds)))
                .unwrap_or_default()
        ))
    );
    for item in &session.items {
        let mut timing = Vec::new();
        if let Some(duration) = item.duration {
            timing.push(format!("took {}", format_duration(duration)));
        }
        if let Some(rest) = item.actual_rest_time {
            timing.push(format!("rested {rest}s"));
        }
        println!(
            "{} {}",
            palette.id(&format!("[{}] record item {}", item.order_index, item.id)),
            palette.dim(&timing.join(", "))
        );
        for exercise_item in &item.exercise_items {
            let rest = exercise_item
                .actual_rest_time
                .map(|rest| format!(" rested {rest}s"))
                .unwrap_or_default();
            println!(
                "  {} {} {}",
                palette.id(&format!("exercise {}", exercise_item.id)),
                exercise_item.exercise_id,
                palette.dim(&format!("planned rest {}s{}", exercise_item.rest_time, rest))
            );
            for set in &exercise_item.sets {
                println!("    {}", record_set_line(set, &palette));
            }
        }
    }
}

fn record_set_line(set: &RecordSet, palette: &Palette) -> String {
    let mark = if set.completed_at.is_some() {
        palette.done("done")
    } else {
        palette.dim("todo")
    };
    format!(
        "{} {} {}",
        palette.id(&format!("set {}", set.id)),
        describe_values(&set.actual_values()),
        mark
    )
}

pub fn print_record_set(set: &RecordSet) {
    println!("{}", record_set_line(set, &Palette::auto()));
}

pub fn print_session_list(sessions: &[SessionSummary]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Sessions"));
    if sessions.is_empty() {
        println!("{}", palette.dim("no sessions yet"));
        return;
    }
    for session in sessions {
        let routine = session
            .routine_name
            .clone()
            .unwrap_or_else(|| format!("routine {} (deleted)", session.routine_id));
        let duration = session
            .duration
            .map(format_duration)
            .unwrap_or_else(|| "open".to_string());
        println!(
            "{} {} {} {}",
            palette.id(&format!("#{}", session.id)),
            palette.state(session.state),
            routine,
            palette.dim(&format!("{} {}", session.created_at, duration))
        );
    }
}

pub fn print_exercise_list(exercises: &[Exercise]) {
    let palette = Palette::auto();
    println!("{}", palette.heading("Exercises"));
    if exercises.is_empty() {
        println!("{}", palette.dim("library is empty; run `lift catalog load`"));
        return;
    }
    for exercise in exercises {
        println!(
            "{} {} {}",
            palette.id(&exercise.id),
            exercise.name,
            palette.dim(&format!("{} / {}", exercise.category, exercise.level))
        );
    }
    println!("{}", palette.dim(&format!("{} exercise(s)", exercises.len())));
}

pub fn print_exercise(view: &ExerciseView) {
    let palette = Palette::auto();
    let exercise = &view.exercise;
    println!("{} {}", palette.id(&exercise.id), palette.heading(&exercise.name));
    let tags = [
        Some(exercise.level.as_str()),
        Some(exercise.category.as_str()),
        exercise.force.as_deref(),
        exercise.mechanic.as_deref(),
        exercise.equipment.as_deref(),
    ];
    let tags: Vec<&str> = tags.into_iter().flatten().collect();
    println!("{}", palette.dim(&tags.join(" | ")));
    if !exercise.primary_muscles.is_empty() {
        println!("primary: {}", exercise.primary_muscles.join(", "));
    }
    if !exercise.secondary_muscles.is_empty() {
        println!("secondary: {}", exercise.secondary_muscles.join(", "));
    }
    if let Some(instructions) = exercise.instructions.as_deref() {
        for (index, step) in instructions.lines().enumerate() {
            println!("{}. {}", index + 1, step);
        }
    }
    for url in &view.images {
        println!("{}", palette.dim(url));
    }
}

pub fn print_profile(profile: &UserProfile) {
    let palette = Palette::auto();
    println!("{}", palette.heading(&profile.name));
    let sex = if profile.is_female { "female" } else { "male" };
    let height = profile
        .height
        .map(|value| format!("{value}"))
        .unwrap_or_else(|| "-".to_string());
    let weight = profile
        .weight
        .map(|value| format!("{value}"))
        .unwrap_or_else(|| "-".to_string());
    let birth_date = profile.birth_date.as_deref().unwrap_or("-");
    println!(
        "{}",
        palette.dim(&format!(
            "{sex} | height {height} | weight {weight} | born {birth_date}"
        ))
    );
}

pub fn print_history(history: &MeasurementHistory) {
    let palette = Palette::auto();
    for (title, series) in [("Height", &history.heights), ("Weight", &history.weights)] {
        println!("{}", palette.heading(title));
        if series.is_empty() {
            println!("{}", palette.dim("no readings"));
        }
        for reading in series {
            println!("{} {}", palette.dim(&reading.created_at), reading.value);
        }
    }
}

pub fn describe_values(values: &SetValues) -> String {
    let mut parts = Vec::new();
    if let Some(reps) = values.reps {
        parts.push(format!("{reps} reps"));
    }
    if let Some(weight) = values.weight {
        parts.push(format!("@ {weight}"));
    }
    if let Some(duration) = values.duration {
        parts.push(format_duration(duration));
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    if minutes == 0 {
        format!("{rest}s")
    } else if rest == 0 {
        format!("{minutes}m")
    } else {
        format!("{minutes}m{rest:02}s")
    }
}

struct Palette {
    enabled: bool,
}

impl Palette {
    fn auto() -> Self {
        let enabled = std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        self.paint("1;36", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn id(&self, text: &str) -> String {
        self.paint("1;94", text)
    }

    fn done(&self, text: &str) -> String {
        self.paint("32", text)
    }

    fn state(&self, state: SessionState) -> String {
        let upper = state.as_str().to_ascii_uppercase();
        self.paint(state_color_code(state), &format!("[{upper}]"))
    }
}

fn state_color_code(state: SessionState) -> &'static str {
    match state {
        SessionState::NoActiveSession => "37",
        SessionState::InProgress => "33",
        SessionState::Completed => "32",
    }
}

use super::WorkoutService;
use crate::app::{AppError, EntityKind};
use crate::catalog::SqliteCatalog;
use crate::db::{self, exercises, DEFAULT_USER_ID};
use crate::domain::model::{Exercise, SetValues};
use crate::domain::session::SessionState;
use crate::routines::RoutineService;
use rusqlite::Connection;
use uuid::Uuid;

fn unique_db_path() -> String {
    std::env::temp_dir()
        .join(format!("lift-workouts-test-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

fn seed_exercise(conn: &Connection, id: &str) {
    let exercise = Exercise {
        id: id.to_string(),
        name: id.to_string(),
        level: "beginner".to_string(),
        category: "strength".to_string(),
        force: None,
        mechanic: None,
        equipment: None,
        instructions: None,
        primary_muscles: Vec::new(),
        secondary_muscles: Vec::new(),
    };
    exercises::upsert_exercise(conn, &exercise, "seed").expect("exercise seed should work");
}

struct Fixture {
    path: String,
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        let path = unique_db_path();
        let conn = db::open_connection(&path).expect("db should open");
        seed_exercise(&conn, "bench-press");
        seed_exercise(&conn, "dips");
        Self { path, conn }
    }

    fn routines(&self) -> RoutineService<'_, SqliteCatalog<'_>> {
        RoutineService::new(&self.conn, SqliteCatalog::new(&self.conn, ""))
    }

    fn workouts(&self) -> WorkoutService<'_> {
        WorkoutService::new(&self.conn, DEFAULT_USER_ID)
    }

    /// Two slots: bench press with two sets, dips with one.
    fn push_day(&self) -> i64 {
        let routines = self.routines();
        let routine = routines.create_routine("Push Day", "").expect("create");
        let slot = routines.add_routine_item(routine.id).expect("slot");
        let bench = routines
            .add_exercise_to_item(slot, "bench-press")
            .expect("bench");
        let second = routines.add_set(bench.id).expect("second set");
        routines
            .update_set(
                second.id,
                SetValues {
                    reps: Some(10),
                    weight: Some(60.0),
                    duration: None,
                },
            )
            .expect("update set");
        let slot = routines.add_routine_item(routine.id).expect("slot");
        routines.add_exercise_to_item(slot, "dips").expect("dips");
        routine.id
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        cleanup_db_files(&self.path);
    }
}

#[test]
fn start_session_snapshots_routine_tree() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    assert_eq!(
        workouts.state().expect("state"),
        SessionState::NoActiveSession
    );

    let session = workouts
        .start_session(routine_id)
        .expect("start should work");
    assert_eq!(session.state, SessionState::InProgress);
    assert_eq!(session.routine_id, routine_id);
    assert_eq!(session.items.len(), 2);
    assert_eq!(session.items[0].exercise_items.len(), 1);
    assert_eq!(session.items[0].exercise_items[0].exercise_id, "bench-press");
    assert_eq!(session.items[0].exercise_items[0].sets.len(), 2);
    assert_eq!(session.items[1].exercise_items[0].sets.len(), 1);
    assert_eq!(session.set_count(), 3);
    assert_eq!(session.completed_set_count(), 0);

    let second = &session.items[0].exercise_items[0].sets[1];
    assert_eq!(second.actual_reps, Some(10));
    assert_eq!(second.actual_weight, Some(60.0));
    assert_eq!(second.actual_duration, None);
    assert_eq!(workouts.state().expect("state"), SessionState::InProgress);
}

#[test]
fn snapshot_is_independent_of_later_routine_edits() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let session = fixture
        .workouts()
        .start_session(routine_id)
        .expect("start should work");

    let routines = fixture.routines();
    let tree = routines.get_routine(routine_id).expect("load");
    let set_id = tree.items[0].exercise_items[0].sets[1].id;
    routines
        .update_set(
            set_id,
            SetValues {
                reps: Some(5),
                weight: Some(100.0),
                duration: None,
            },
        )
        .expect("update");
    routines
        .delete_routine_item(tree.items[1].id)
        .expect("delete slot");

    let reloaded = fixture
        .workouts()
        .get_session(session.id)
        .expect("session should load");
    assert_eq!(reloaded.items.len(), 2);
    assert_eq!(
        reloaded.items[0].exercise_items[0].sets[1].actual_reps,
        Some(10)
    );
}

#[test]
fn second_start_conflicts_and_creates_nothing() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    workouts.start_session(routine_id).expect("first start");

    let err = workouts
        .start_session(routine_id)
        .expect_err("second start should conflict");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(workouts.list_sessions().expect("list").len(), 1);
}

#[test]
fn start_session_requires_live_routine() {
    let fixture = Fixture::new();
    let err = fixture
        .workouts()
        .start_session(77)
        .expect_err("unknown routine should fail");
    assert!(matches!(
        err,
        AppError::NotFound {
            entity: EntityKind::Routine,
            ..
        }
    ));
}

#[test]
fn end_session_completes_and_allows_restart() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    let session = workouts.start_session(routine_id).expect("start");

    assert!(matches!(
        workouts.end_session(session.id, -1),
        Err(AppError::Validation(_))
    ));
    let ended = workouts.end_session(session.id, 1800).expect("end");
    assert_eq!(ended.duration, Some(1800));
    assert_eq!(ended.state, SessionState::Completed);
    assert!(workouts.get_active_session().expect("active").is_none());

    let again = workouts
        .end_session(session.id, 1900)
        .expect("re-ending keeps the known behavior");
    assert_eq!(again.duration, Some(1900));

    let next = workouts.start_session(routine_id).expect("restart");
    assert_ne!(next.id, session.id);
    let sessions = workouts.list_sessions().expect("list");
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id, next.id);
    assert_eq!(sessions[0].routine_name.as_deref(), Some("Push Day"));
    assert_eq!(sessions[1].state, SessionState::Completed);

    assert!(matches!(
        workouts.end_session(999, 10),
        Err(AppError::NotFound { .. })
    ));
}

#[test]
fn record_leaf_writes_validate_and_persist() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    let session = workouts.start_session(routine_id).expect("start");
    let item = &session.items[0];
    let exercise_item = &item.exercise_items[0];
    let set = &exercise_item.sets[0];

    assert!(matches!(
        workouts.record_set_completion(
            set.id,
            SetValues {
                reps: Some(100),
                ..SetValues::default()
            },
            None
        ),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        workouts.record_set_completion(set.id, SetValues::default(), Some("yesterday")),
        Err(AppError::Validation(_))
    ));

    let done = workouts
        .record_set_completion(
            set.id,
            SetValues {
                reps: Some(12),
                weight: Some(40.0),
                duration: None,
            },
            Some("2026-03-01T10:15:00+01:00"),
        )
        .expect("completion should save");
    assert_eq!(done.actual_reps, Some(12));
    assert_eq!(done.completed_at.as_deref(), Some("2026-03-01T09:15:00Z"));

    workouts
        .record_item_timing(item.id, Some(300), Some(90))
        .expect("timing should save");
    assert!(matches!(
        workouts.record_item_timing(item.id, Some(-5), None),
        Err(AppError::Validation(_))
    ));
    workouts
        .record_exercise_rest(exercise_item.id, Some(60))
        .expect("rest should save");
    assert!(matches!(
        workouts.record_exercise_rest(exercise_item.id, Some(3601)),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        workouts.record_exercise_rest(4242, None),
        Err(AppError::NotFound { .. })
    ));

    let reloaded = workouts
        .get_active_session()
        .expect("active query")
        .expect("session should be open");
    assert_eq!(reloaded.completed_set_count(), 1);
    assert_eq!(reloaded.items[0].duration, Some(300));
    assert_eq!(reloaded.items[0].actual_rest_time, Some(90));
    assert_eq!(reloaded.items[0].exercise_items[0].actual_rest_time, Some(60));
}

#[test]
fn item_timing_keeps_values_left_out() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    let session = workouts.start_session(routine_id).expect("start");
    let item_id = session.items[0].id;

    workouts
        .record_item_timing(item_id, None, Some(90))
        .expect("rest should save");
    workouts
        .record_item_timing(item_id, Some(300), None)
        .expect("duration should save");

    let reloaded = workouts.get_session(session.id).expect("session");
    assert_eq!(reloaded.items[0].duration, Some(300));
    assert_eq!(reloaded.items[0].actual_rest_time, Some(90));

    workouts
        .record_item_timing(item_id, None, None)
        .expect("empty write is a no-op");
    let reloaded = workouts.get_session(session.id).expect("session");
    assert_eq!(reloaded.items[0].duration, Some(300));
    assert_eq!(reloaded.items[0].actual_rest_time, Some(90));
    assert!(matches!(
        workouts.record_item_timing(4242, None, Some(10)),
        Err(AppError::NotFound { .. })
    ));
}

#[test]
fn discard_removes_whole_tree() {
    let fixture = Fixture::new();
    let routine_id = fixture.push_day();
    let workouts = fixture.workouts();
    let session = workouts.start_session(routine_id).expect("start");

    workouts.discard_session(session.id).expect("discard");
    assert!(workouts.get_active_session().expect("active").is_none());
    for table in ["record_item", "record_exercise_item", "record_set"] {
        let count: i64 = fixture
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .expect("count should work");
        assert_eq!(count, 0, "{table} should be empty");
    }
    assert!(matches!(
        workouts.discard_session(session.id),
        Err(AppError::NotFound { .. })
    ));
}

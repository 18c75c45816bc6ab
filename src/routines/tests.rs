use super::RoutineService;
use crate::app::{AppError, EntityKind};
use crate::catalog::ExerciseCatalog;
use crate::db;
use crate::domain::model::{Exercise, SetValues};
use crate::ordering::OrderingError;
use rusqlite::Connection;
use uuid::Uuid;

struct FixedCatalog {
    ids: Vec<&'static str>,
}

impl ExerciseCatalog for FixedCatalog {
    fn get_by_id(&self, id: &str) -> Result<Option<Exercise>, AppError> {
        Ok(self.ids.iter().find(|known| **known == id).map(|known| Exercise {
            id: known.to_string(),
            name: known.replace('_', " "),
            level: "beginner".to_string(),
            category: "strength".to_string(),
            force: None,
            mechanic: None,
            equipment: None,
            instructions: None,
            primary_muscles: Vec::new(),
            secondary_muscles: Vec::new(),
        }))
    }

    fn list_all(&self) -> Result<Vec<Exercise>, AppError> {
        let mut all = Vec::new();
        for id in &self.ids {
            all.extend(self.get_by_id(id)?);
        }
        Ok(all)
    }
}

fn unique_db_path() -> String {
    std::env::temp_dir()
        .join(format!("lift-routines-test-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

fn open() -> (String, Connection) {
    let path = unique_db_path();
    let conn = db::open_connection(&path).expect("db should open");
    (path, conn)
}

fn service(conn: &Connection) -> RoutineService<'_, FixedCatalog> {
    RoutineService::new(
        conn,
        FixedCatalog {
            ids: vec!["bench-press", "Pullups", "Plank"],
        },
    )
}

fn slot_order(service: &RoutineService<'_, FixedCatalog>, routine_id: i64) -> Vec<i64> {
    service
        .get_routine(routine_id)
        .expect("routine should load")
        .items
        .iter()
        .map(|item| item.id)
        .collect()
}

#[test]
fn create_routine_validates_name() {
    let (path, conn) = open();
    let routines = service(&conn);

    let err = routines
        .create_routine("   ", "")
        .expect_err("blank name should fail");
    assert!(matches!(err, AppError::Validation(ref v) if v.field == "name"));

    let too_long = "x".repeat(101);
    assert!(matches!(
        routines.create_routine(&too_long, ""),
        Err(AppError::Validation(_))
    ));

    let exact = "y".repeat(100);
    let created = routines
        .create_routine(&exact, " heavy ")
        .expect("100 chars should be accepted");
    assert_eq!(created.description, "heavy");
    assert!(created.items.is_empty());

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn update_and_delete_routine_report_missing_ids() {
    let (path, conn) = open();
    let routines = service(&conn);

    assert!(matches!(
        routines.update_routine(99, "Legs", ""),
        Err(AppError::NotFound {
            entity: EntityKind::Routine,
            ..
        })
    ));
    assert!(matches!(
        routines.delete_routine(0),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        routines.delete_routine(99),
        Err(AppError::NotFound { .. })
    ));

    let routine = routines.create_routine("Legs", "").expect("create");
    let updated = routines
        .update_routine(routine.id, "Leg Day", "squats")
        .expect("update should work");
    assert_eq!(updated.name, "Leg Day");
    assert_eq!(updated.description, "squats");

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn delete_routine_cascades_to_descendants() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Pull", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let item = routines
        .add_exercise_to_item(slot, "Pullups")
        .expect("exercise");

    routines.delete_routine(routine.id).expect("delete should work");

    assert!(matches!(
        routines.get_routine(routine.id),
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        routines.get_exercise_item(item.id),
        Err(AppError::NotFound { .. })
    ));
    let live_sets: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM workout_set WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )
        .expect("count should work");
    assert_eq!(live_sets, 0);
    assert!(matches!(
        routines.delete_routine(routine.id),
        Err(AppError::NotFound { .. })
    ));

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn slots_append_densely_and_moves_invert() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Push Day", "").expect("create");
    let a = routines.add_routine_item(routine.id).expect("slot a");
    let b = routines.add_routine_item(routine.id).expect("slot b");
    let c = routines.add_routine_item(routine.id).expect("slot c");

    let indices: Vec<i64> = routines
        .get_routine(routine.id)
        .expect("load")
        .items
        .iter()
        .map(|item| item.order_index)
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);

    routines.move_routine_item(b, true).expect("move up");
    assert_eq!(slot_order(&routines, routine.id), vec![b, a, c]);
    routines.move_routine_item(b, false).expect("move down");
    assert_eq!(slot_order(&routines, routine.id), vec![a, b, c]);

    let err = routines
        .move_routine_item(a, true)
        .expect_err("top slot cannot move up");
    assert!(matches!(
        err,
        AppError::Ordering(OrderingError::OutOfRange { index: 0, .. })
    ));
    assert!(matches!(
        routines.move_routine_item(c, false),
        Err(AppError::Ordering(OrderingError::OutOfRange { .. }))
    ));
    assert_eq!(slot_order(&routines, routine.id), vec![a, b, c]);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn delete_leaves_gap_and_append_skips_it() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Gaps", "").expect("create");
    let _a = routines.add_routine_item(routine.id).expect("slot a");
    let b = routines.add_routine_item(routine.id).expect("slot b");
    let _c = routines.add_routine_item(routine.id).expect("slot c");

    let owner = routines.delete_routine_item(b).expect("delete slot");
    assert_eq!(owner, routine.id);
    routines.add_routine_item(routine.id).expect("slot d");

    let indices: Vec<i64> = routines
        .get_routine(routine.id)
        .expect("load")
        .items
        .iter()
        .map(|item| item.order_index)
        .collect();
    assert_eq!(indices, vec![0, 2, 3]);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn add_exercise_requires_known_ids_and_seeds_one_set() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Core", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");

    assert!(matches!(
        routines.add_exercise_to_item(slot, "Squat"),
        Err(AppError::NotFound {
            entity: EntityKind::Exercise,
            ..
        })
    ));
    assert!(matches!(
        routines.add_exercise_to_item(999, "Plank"),
        Err(AppError::NotFound {
            entity: EntityKind::RoutineItem,
            ..
        })
    ));

    let item = routines
        .add_exercise_to_item(slot, "Plank")
        .expect("add should work");
    assert_eq!(item.order_index, 0);
    assert_eq!(item.sets.len(), 1);
    assert_eq!(item.sets[0].values(), SetValues::default());

    let second = routines
        .add_exercise_to_item(slot, "Pullups")
        .expect("superset partner");
    assert_eq!(second.order_index, 1);
    let tree = routines.get_routine(routine.id).expect("load");
    assert!(tree.items[0].is_superset());

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn update_exercise_item_bounds_rest_time() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Rest", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let item = routines.add_exercise_to_item(slot, "Plank").expect("add");

    assert!(matches!(
        routines.update_exercise_item(item.id, 3601, ""),
        Err(AppError::Validation(_))
    ));
    let updated = routines
        .update_exercise_item(item.id, 3600, " slow ")
        .expect("3600 should be accepted");
    assert_eq!(updated.rest_time, 3600);
    assert_eq!(updated.notes, "slow");

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn move_exercise_item_stays_within_slot() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Superset", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let first = routines.add_exercise_to_item(slot, "Plank").expect("first");
    let second = routines
        .add_exercise_to_item(slot, "Pullups")
        .expect("second");

    routines
        .move_exercise_item(second.id, true)
        .expect("move up should work");
    let moved = routines.get_exercise_item(second.id).expect("load");
    let other = routines.get_exercise_item(first.id).expect("load");
    assert_eq!(moved.order_index, 0);
    assert_eq!(other.order_index, 1);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn deleting_only_exercise_item_removes_slot() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Slots", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let lone = routines.add_exercise_to_item(slot, "Plank").expect("add");

    let owner = routines
        .delete_exercise_item(lone.id)
        .expect("delete should work");
    assert_eq!(owner, routine.id);
    assert!(routines
        .get_routine(routine.id)
        .expect("load")
        .items
        .is_empty());

    let slot = routines.add_routine_item(routine.id).expect("slot");
    let keep = routines.add_exercise_to_item(slot, "Plank").expect("add");
    let drop_me = routines.add_exercise_to_item(slot, "Pullups").expect("add");
    routines
        .delete_exercise_item(drop_me.id)
        .expect("delete should work");
    let tree = routines.get_routine(routine.id).expect("load");
    assert_eq!(tree.items.len(), 1);
    assert_eq!(tree.items[0].exercise_items[0].id, keep.id);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn add_set_copies_previous_values() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Bench", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let item = routines
        .add_exercise_to_item(slot, "bench-press")
        .expect("add");

    let working = SetValues {
        reps: Some(8),
        weight: Some(80.0),
        duration: None,
    };
    routines
        .update_set(item.sets[0].id, working)
        .expect("update should work");
    let copy = routines.add_set(item.id).expect("add set");
    assert_eq!(copy.order_index, 1);
    assert_eq!(copy.values(), working);

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn update_set_enforces_boundaries_without_partial_writes() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Bounds", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let item = routines.add_exercise_to_item(slot, "Plank").expect("add");
    let set_id = item.sets[0].id;

    let rejected = [
        SetValues {
            reps: Some(0),
            ..SetValues::default()
        },
        SetValues {
            reps: Some(100),
            ..SetValues::default()
        },
        SetValues {
            weight: Some(0.0),
            ..SetValues::default()
        },
        SetValues {
            weight: Some(301.0),
            ..SetValues::default()
        },
        SetValues {
            duration: Some(0),
            ..SetValues::default()
        },
        SetValues {
            reps: Some(10),
            duration: Some(7201),
            ..SetValues::default()
        },
    ];
    for values in rejected {
        assert!(
            matches!(
                routines.update_set(set_id, values),
                Err(AppError::Validation(_))
            ),
            "expected {:?} to be rejected",
            values
        );
    }
    let untouched = routines.get_exercise_item(item.id).expect("load");
    assert_eq!(untouched.sets[0].values(), SetValues::default());

    let accepted = [
        (Some(1), Some(0.1), Some(1)),
        (Some(99), Some(300.0), Some(7200)),
    ];
    for (reps, weight, duration) in accepted {
        let values = SetValues {
            reps,
            weight,
            duration,
        };
        let saved = routines
            .update_set(set_id, values)
            .expect("boundary values should be accepted");
        assert_eq!(saved.values(), values);
    }

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn deleting_last_set_keeps_exercise_item() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Sets", "").expect("create");
    let slot = routines.add_routine_item(routine.id).expect("slot");
    let item = routines.add_exercise_to_item(slot, "Plank").expect("add");
    let extra = routines.add_set(item.id).expect("add set");

    routines.move_set(extra.id, true).expect("move set up");
    let reordered = routines.get_exercise_item(item.id).expect("load");
    assert_eq!(reordered.sets[0].id, extra.id);

    for set in &reordered.sets {
        let owner = routines.delete_set(set.id).expect("delete set");
        assert_eq!(owner, routine.id);
    }
    let emptied = routines
        .get_exercise_item(item.id)
        .expect("item should survive");
    assert!(emptied.sets.is_empty());

    drop(conn);
    cleanup_db_files(&path);
}

#[test]
fn routine_days_are_normalized() {
    let (path, conn) = open();
    let routines = service(&conn);
    let routine = routines.create_routine("Schedule", "").expect("create");

    let days = vec!["fri".to_string(), "Monday".to_string(), "mon".to_string()];
    let scheduled = routines
        .set_routine_days(routine.id, &days)
        .expect("days should save");
    assert_eq!(scheduled.days, vec!["monday", "friday"]);

    assert!(matches!(
        routines.set_routine_days(routine.id, &["Funday".to_string()]),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        routines.set_routine_days(404, &days),
        Err(AppError::NotFound { .. })
    ));

    let listed = routines.list_routines().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].days, vec!["monday", "friday"]);

    drop(conn);
    cleanup_db_files(&path);
}

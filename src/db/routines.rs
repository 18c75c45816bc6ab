use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::model::{
    ExerciseItem, PlannedSet, Routine, RoutineItem, RoutineSummary, SetValues,
};
use crate::domain::weekday;

use super::now_utc_rfc3339;

const ROUTINE_ITEM_COLUMNS: &str = "id, routine_id, order_index, created_at, updated_at";
const EXERCISE_ITEM_COLUMNS: &str =
    "id, routine_item_id, exercise_id, rest_time, notes, order_index, created_at, updated_at";
const SET_COLUMNS: &str =
    "id, exercise_item_id, reps, weight, duration, order_index, created_at, updated_at";

pub fn insert_routine(conn: &Connection, name: &str, description: &str) -> Result<i64> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO routine (name, description, created_at, updated_at)
VALUES (?1, ?2, ?3, ?3)
"#,
        params![name, description, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn routine_exists(conn: &Connection, id: i64) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM routine WHERE id = ?1 AND deleted_at IS NULL",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn update_routine(conn: &Connection, id: i64, name: &str, description: &str) -> Result<()> {
    conn.execute(
        r#"
UPDATE routine SET name = ?1, description = ?2, updated_at = ?3
WHERE id = ?4 AND deleted_at IS NULL
"#,
        params![name, description, now_utc_rfc3339(), id],
    )?;
    Ok(())
}

pub fn list_routines(conn: &Connection) -> Result<Vec<RoutineSummary>> {
    let mut stmt = conn.prepare(
        r#"
SELECT r.id, r.name, r.description, r.updated_at,
       (SELECT COUNT(*) FROM routine_item ri
        WHERE ri.routine_id = r.id AND ri.deleted_at IS NULL)
FROM routine r
WHERE r.deleted_at IS NULL
ORDER BY r.id ASC
"#,
    )?;
    let mut rows = stmt.query([])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let item_count: i64 = row.get(4)?;
        result.push(RoutineSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            days: Vec::new(),
            item_count: item_count as usize,
            updated_at: row.get(3)?,
        });
    }
    drop(rows);

    for summary in &mut result {
        summary.days = list_routine_days(conn, summary.id)?;
    }
    Ok(result)
}

pub fn list_routine_days(conn: &Connection, routine_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT day FROM routine_day WHERE routine_id = ?1")?;
    let mut rows = stmt.query(params![routine_id])?;
    let mut days = Vec::new();
    while let Some(row) = rows.next()? {
        days.push(row.get(0)?);
    }
    weekday::sort_names(&mut days);
    Ok(days)
}

pub fn replace_routine_days(conn: &Connection, routine_id: i64, days: &[&str]) -> Result<()> {
    conn.execute(
        "DELETE FROM routine_day WHERE routine_id = ?1",
        params![routine_id],
    )?;
    for day in days {
        conn.execute(
            "INSERT INTO routine_day (routine_id, day) VALUES (?1, ?2)",
            params![routine_id, day],
        )?;
    }
    conn.execute(
        "UPDATE routine SET updated_at = ?1 WHERE id = ?2",
        params![now_utc_rfc3339(), routine_id],
    )?;
    Ok(())
}

/// Marks the routine and every live descendant deleted, leaves first.
pub fn soft_delete_routine(conn: &Connection, id: i64, deleted_at: &str) -> Result<usize> {
    conn.execute(
        r#"
UPDATE workout_set SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND exercise_item_id IN (
    SELECT ei.id FROM exercise_item ei
    JOIN routine_item ri ON ri.id = ei.routine_item_id
    WHERE ri.routine_id = ?2
)
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE exercise_item SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND routine_item_id IN (
    SELECT id FROM routine_item WHERE routine_id = ?2
)
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE routine_item SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND routine_id = ?2
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE routine SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND id = ?2
"#,
        params![deleted_at, id],
    )
}

pub fn insert_routine_item(conn: &Connection, routine_id: i64, order_index: i64) -> Result<i64> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO routine_item (routine_id, order_index, created_at, updated_at)
VALUES (?1, ?2, ?3, ?3)
"#,
        params![routine_id, order_index, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The slot without its exercise items.
pub fn get_routine_item(conn: &Connection, id: i64) -> Result<Option<RoutineItem>> {
    conn.query_row(
        &format!(
            "SELECT {ROUTINE_ITEM_COLUMNS} FROM routine_item WHERE id = ?1 AND deleted_at IS NULL"
        ),
        params![id],
        routine_item_from_row,
    )
    .optional()
}

pub fn soft_delete_routine_item(conn: &Connection, id: i64, deleted_at: &str) -> Result<usize> {
    conn.execute(
        r#"
UPDATE workout_set SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND exercise_item_id IN (
    SELECT id FROM exercise_item WHERE routine_item_id = ?2
)
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE exercise_item SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND routine_item_id = ?2
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE routine_item SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND id = ?2
"#,
        params![deleted_at, id],
    )
}

pub fn insert_exercise_item(
    conn: &Connection,
    routine_item_id: i64,
    exercise_id: &str,
    order_index: i64,
) -> Result<i64> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO exercise_item (routine_item_id, exercise_id, order_index, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?4)
"#,
        params![routine_item_id, exercise_id, order_index, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The exercise item with its live sets.
pub fn get_exercise_item(conn: &Connection, id: i64) -> Result<Option<ExerciseItem>> {
    let item = conn
        .query_row(
            &format!(
                "SELECT {EXERCISE_ITEM_COLUMNS} FROM exercise_item \
                 WHERE id = ?1 AND deleted_at IS NULL"
            ),
            params![id],
            exercise_item_from_row,
        )
        .optional()?;
    match item {
        Some(mut item) => {
            item.sets = list_sets(conn, item.id)?;
            Ok(Some(item))
        }
        None => Ok(None),
    }
}

pub fn update_exercise_item(conn: &Connection, id: i64, rest_time: i64, notes: &str) -> Result<()> {
    conn.execute(
        r#"
UPDATE exercise_item SET rest_time = ?1, notes = ?2, updated_at = ?3
WHERE id = ?4 AND deleted_at IS NULL
"#,
        params![rest_time, notes, now_utc_rfc3339(), id],
    )?;
    Ok(())
}

pub fn soft_delete_exercise_item(conn: &Connection, id: i64, deleted_at: &str) -> Result<usize> {
    conn.execute(
        r#"
UPDATE workout_set SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND exercise_item_id = ?2
"#,
        params![deleted_at, id],
    )?;
    conn.execute(
        r#"
UPDATE exercise_item SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND id = ?2
"#,
        params![deleted_at, id],
    )
}

pub fn count_exercise_items(conn: &Connection, routine_item_id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM exercise_item WHERE routine_item_id = ?1 AND deleted_at IS NULL",
        params![routine_item_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn insert_set(
    conn: &Connection,
    exercise_item_id: i64,
    values: &SetValues,
    order_index: i64,
) -> Result<i64> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO workout_set (
    exercise_item_id, reps, weight, duration, order_index, created_at, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
"#,
        params![
            exercise_item_id,
            values.reps,
            values.weight,
            values.duration,
            order_index,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_set(conn: &Connection, id: i64) -> Result<Option<PlannedSet>> {
    conn.query_row(
        &format!("SELECT {SET_COLUMNS} FROM workout_set WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        set_from_row,
    )
    .optional()
}

pub fn list_sets(conn: &Connection, exercise_item_id: i64) -> Result<Vec<PlannedSet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SET_COLUMNS} FROM workout_set \
         WHERE exercise_item_id = ?1 AND deleted_at IS NULL \
         ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![exercise_item_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(set_from_row(row)?);
    }
    Ok(result)
}

pub fn update_set_values(conn: &Connection, id: i64, values: &SetValues) -> Result<()> {
    conn.execute(
        r#"
UPDATE workout_set SET reps = ?1, weight = ?2, duration = ?3, updated_at = ?4
WHERE id = ?5 AND deleted_at IS NULL
"#,
        params![
            values.reps,
            values.weight,
            values.duration,
            now_utc_rfc3339(),
            id
        ],
    )?;
    Ok(())
}

pub fn soft_delete_set(conn: &Connection, id: i64, deleted_at: &str) -> Result<usize> {
    conn.execute(
        r#"
UPDATE workout_set SET deleted_at = ?1, updated_at = ?1
WHERE deleted_at IS NULL AND id = ?2
"#,
        params![deleted_at, id],
    )
}

/// Routine id owning a live exercise item.
pub fn routine_id_for_exercise_item(conn: &Connection, exercise_item_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        r#"
SELECT ri.routine_id FROM exercise_item ei
JOIN routine_item ri ON ri.id = ei.routine_item_id
WHERE ei.id = ?1 AND ei.deleted_at IS NULL
"#,
        params![exercise_item_id],
        |row| row.get(0),
    )
    .optional()
}

/// Loads the full ordered tree: slots, their exercise items, their sets.
pub fn load_routine_tree(conn: &Connection, id: i64) -> Result<Option<Routine>> {
    let routine = conn
        .query_row(
            r#"
SELECT id, name, description, created_at, updated_at
FROM routine
WHERE id = ?1 AND deleted_at IS NULL
"#,
            params![id],
            |row| {
                Ok(Routine {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    days: Vec::new(),
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                    items: Vec::new(),
                })
            },
        )
        .optional()?;
    let Some(mut routine) = routine else {
        return Ok(None);
    };

    routine.days = list_routine_days(conn, id)?;
    routine.items = list_routine_items(conn, id)?;
    for item in &mut routine.items {
        item.exercise_items = list_exercise_items(conn, item.id)?;
        for exercise_item in &mut item.exercise_items {
            exercise_item.sets = list_sets(conn, exercise_item.id)?;
        }
    }
    Ok(Some(routine))
}

fn list_routine_items(conn: &Connection, routine_id: i64) -> Result<Vec<RoutineItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROUTINE_ITEM_COLUMNS} FROM routine_item \
         WHERE routine_id = ?1 AND deleted_at IS NULL \
         ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![routine_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(routine_item_from_row(row)?);
    }
    Ok(result)
}

fn list_exercise_items(conn: &Connection, routine_item_id: i64) -> Result<Vec<ExerciseItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXERCISE_ITEM_COLUMNS} FROM exercise_item \
         WHERE routine_item_id = ?1 AND deleted_at IS NULL \
         ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![routine_item_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(exercise_item_from_row(row)?);
    }
    Ok(result)
}

fn routine_item_from_row(row: &Row<'_>) -> Result<RoutineItem> {
    Ok(RoutineItem {
        id: row.get(0)?,
        routine_id: row.get(1)?,
        order_index: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
        exercise_items: Vec::new(),
    })
}

fn exercise_item_from_row(row: &Row<'_>) -> Result<ExerciseItem> {
    Ok(ExerciseItem {
        id: row.get(0)?,
        routine_item_id: row.get(1)?,
        exercise_id: row.get(2)?,
        rest_time: row.get(3)?,
        notes: row.get(4)?,
        order_index: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        sets: Vec::new(),
    })
}

fn set_from_row(row: &Row<'_>) -> Result<PlannedSet> {
    Ok(PlannedSet {
        id: row.get(0)?,
        exercise_item_id: row.get(1)?,
        reps: row.get(2)?,
        weight: row.get(3)?,
        duration: row.get(4)?,
        order_index: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

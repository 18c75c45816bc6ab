use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::model::{
    RecordExerciseItem, RecordItem, RecordRoutine, RecordSet, Routine, SessionSummary, SetValues,
};
use crate::domain::session::SessionState;

use super::now_utc_rfc3339;

const RECORD_ITEM_COLUMNS: &str = "id, record_routine_id, routine_item_id, duration, \
     actual_rest_time, order_index, created_at, updated_at";
const RECORD_EXERCISE_ITEM_COLUMNS: &str = "id, record_item_id, exercise_item_id, exercise_id, \
     rest_time, notes, actual_rest_time, order_index, created_at, updated_at";
const RECORD_SET_COLUMNS: &str = "id, record_exercise_item_id, set_id, actual_reps, \
     actual_weight, actual_duration, completed_at, order_index, created_at, updated_at";

/// Newest open session for the user.
pub fn active_session_id(conn: &Connection, user_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        r#"
SELECT id FROM record_routine
WHERE user_id = ?1 AND duration IS NULL
ORDER BY id DESC
LIMIT 1
"#,
        params![user_id],
        |row| row.get(0),
    )
    .optional()
}

/// Deep-copies the routine tree into a new open session. Actual set values
/// start as the planned ones.
pub fn insert_snapshot(conn: &Connection, user_id: i64, routine: &Routine) -> Result<i64> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO record_routine (user_id, routine_id, duration, created_at, updated_at)
VALUES (?1, ?2, NULL, ?3, ?3)
"#,
        params![user_id, routine.id, now],
    )?;
    let record_routine_id = conn.last_insert_rowid();

    let mut item_stmt = conn.prepare(
        r#"
INSERT INTO record_item (record_routine_id, routine_item_id, order_index, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?4)
"#,
    )?;
    let mut exercise_stmt = conn.prepare(
        r#"
INSERT INTO record_exercise_item (
    record_item_id, exercise_item_id, exercise_id, rest_time, notes, order_index,
    created_at, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
"#,
    )?;
    let mut set_stmt = conn.prepare(
        r#"
INSERT INTO record_set (
    record_exercise_item_id, set_id, actual_reps, actual_weight, actual_duration,
    order_index, created_at, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
"#,
    )?;

    for item in &routine.items {
        let record_item_id =
            item_stmt.insert(params![record_routine_id, item.id, item.order_index, now])?;
        for exercise_item in &item.exercise_items {
            let record_exercise_item_id = exercise_stmt.insert(params![
                record_item_id,
                exercise_item.id,
                exercise_item.exercise_id,
                exercise_item.rest_time,
                exercise_item.notes,
                exercise_item.order_index,
                now
            ])?;
            for set in &exercise_item.sets {
                set_stmt.insert(params![
                    record_exercise_item_id,
                    set.id,
                    set.reps,
                    set.weight,
                    set.duration,
                    set.order_index,
                    now
                ])?;
            }
        }
    }

    Ok(record_routine_id)
}

/// `Some(duration)` when the session exists.
pub fn session_duration(conn: &Connection, id: i64) -> Result<Option<Option<i64>>> {
    conn.query_row(
        "SELECT duration FROM record_routine WHERE id = ?1",
        params![id],
        |row| row.get::<_, Option<i64>>(0),
    )
    .optional()
}

pub fn set_session_duration(conn: &Connection, id: i64, duration: i64) -> Result<usize> {
    conn.execute(
        "UPDATE record_routine SET duration = ?1, updated_at = ?2 WHERE id = ?3",
        params![duration, now_utc_rfc3339(), id],
    )
}

/// Hard delete; children go with the `ON DELETE CASCADE` keys.
pub fn delete_session(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute("DELETE FROM record_routine WHERE id = ?1", params![id])
}

pub fn list_sessions(conn: &Connection, user_id: i64) -> Result<Vec<SessionSummary>> {
    let mut stmt = conn.prepare(
        r#"
SELECT rr.id, rr.routine_id, r.name, rr.duration, rr.created_at
FROM record_routine rr
LEFT JOIN routine r ON r.id = rr.routine_id AND r.deleted_at IS NULL
WHERE rr.user_id = ?1
ORDER BY rr.id DESC
"#,
    )?;
    let mut rows = stmt.query(params![user_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let duration: Option<i64> = row.get(3)?;
        result.push(SessionSummary {
            id: row.get(0)?,
            routine_id: row.get(1)?,
            routine_name: row.get(2)?,
            duration,
            state: SessionState::of_session(duration),
            created_at: row.get(4)?,
        });
    }
    Ok(result)
}

pub fn get_record_set(conn: &Connection, id: i64) -> Result<Option<RecordSet>> {
    conn.query_row(
        &format!("SELECT {RECORD_SET_COLUMNS} FROM record_set WHERE id = ?1"),
        params![id],
        record_set_from_row,
    )
    .optional()
}

pub fn update_record_set(
    conn: &Connection,
    id: i64,
    values: &SetValues,
    completed_at: &str,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE record_set
SET actual_reps = ?1, actual_weight = ?2, actual_duration = ?3, completed_at = ?4,
    updated_at = ?5
WHERE id = ?6
"#,
        params![
            values.reps,
            values.weight,
            values.duration,
            completed_at,
            now_utc_rfc3339(),
            id
        ],
    )
}

/// Absent values keep what is stored.
pub fn update_record_item_timing(
    conn: &Connection,
    id: i64,
    duration: Option<i64>,
    actual_rest_time: Option<i64>,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE record_item
SET duration = COALESCE(?1, duration),
    actual_rest_time = COALESCE(?2, actual_rest_time),
    updated_at = ?3
WHERE id = ?4
"#,
        params![duration, actual_rest_time, now_utc_rfc3339(), id],
    )
}

pub fn update_record_exercise_rest(
    conn: &Connection,
    id: i64,
    actual_rest_time: Option<i64>,
) -> Result<usize> {
    conn.execute(
        r#"
UPDATE record_exercise_item SET actual_rest_time = ?1, updated_at = ?2
WHERE id = ?3
"#,
        params![actual_rest_time, now_utc_rfc3339(), id],
    )
}

pub fn load_record_tree(conn: &Connection, id: i64) -> Result<Option<RecordRoutine>> {
    let record = conn
        .query_row(
            r#"
SELECT id, routine_id, duration, created_at, updated_at
FROM record_routine
WHERE id = ?1
"#,
            params![id],
            |row| {
                let duration: Option<i64> = row.get(2)?;
                Ok(RecordRoutine {
                    id: row.get(0)?,
                    routine_id: row.get(1)?,
                    duration,
                    state: SessionState::of_session(duration),
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                    items: Vec::new(),
                })
            },
        )
        .optional()?;
    let Some(mut record) = record else {
        return Ok(None);
    };

    record.items = list_record_items(conn, id)?;
    for item in &mut record.items {
        item.exercise_items = list_record_exercise_items(conn, item.id)?;
        for exercise_item in &mut item.exercise_items {
            exercise_item.sets = list_record_sets(conn, exercise_item.id)?;
        }
    }
    Ok(Some(record))
}

fn list_record_items(conn: &Connection, record_routine_id: i64) -> Result<Vec<RecordItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_ITEM_COLUMNS} FROM record_item \
         WHERE record_routine_id = ?1 ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![record_routine_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(RecordItem {
            id: row.get(0)?,
            record_routine_id: row.get(1)?,
            routine_item_id: row.get(2)?,
            duration: row.get(3)?,
            actual_rest_time: row.get(4)?,
            order_index: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            exercise_items: Vec::new(),
        });
    }
    Ok(result)
}

fn list_record_exercise_items(
    conn: &Connection,
    record_item_id: i64,
) -> Result<Vec<RecordExerciseItem>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_EXERCISE_ITEM_COLUMNS} FROM record_exercise_item \
         WHERE record_item_id = ?1 ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![record_item_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(RecordExerciseItem {
            id: row.get(0)?,
            record_item_id: row.get(1)?,
            exercise_item_id: row.get(2)?,
            exercise_id: row.get(3)?,
            rest_time: row.get(4)?,
            notes: row.get(5)?,
            actual_rest_time: row.get(6)?,
            order_index: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            sets: Vec::new(),
        });
    }
    Ok(result)
}

fn list_record_sets(conn: &Connection, record_exercise_item_id: i64) -> Result<Vec<RecordSet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECORD_SET_COLUMNS} FROM record_set \
         WHERE record_exercise_item_id = ?1 ORDER BY order_index ASC, id ASC"
    ))?;
    let mut rows = stmt.query(params![record_exercise_item_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(record_set_from_row(row)?);
    }
    Ok(result)
}

fn record_set_from_row(row: &Row<'_>) -> Result<RecordSet> {
    Ok(RecordSet {
        id: row.get(0)?,
        record_exercise_item_id: row.get(1)?,
        set_id: row.get(2)?,
        actual_reps: row.get(3)?,
        actual_weight: row.get(4)?,
        actual_duration: row.get(5)?,
        completed_at: row.get(6)?,
        order_index: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

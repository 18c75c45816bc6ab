use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::model::Exercise;

use super::now_utc_rfc3339;

const EXERCISE_COLUMNS: &str = "id, name, level, category, force, mechanic, equipment, \
     instructions, primary_muscles_json, secondary_muscles_json";

pub fn get_exercise(conn: &Connection, id: &str) -> Result<Option<Exercise>> {
    conn.query_row(
        &format!("SELECT {EXERCISE_COLUMNS} FROM exercise WHERE id = ?1"),
        params![id],
        exercise_from_row,
    )
    .optional()
}

pub fn exercise_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT id FROM exercise WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn list_exercises(conn: &Connection) -> Result<Vec<Exercise>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EXERCISE_COLUMNS} FROM exercise ORDER BY name ASC, id ASC"
    ))?;
    let mut rows = stmt.query([])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(exercise_from_row(row)?);
    }
    Ok(result)
}

pub fn get_fingerprint(conn: &Connection, id: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT fingerprint FROM exercise WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()
}

pub fn upsert_exercise(conn: &Connection, exercise: &Exercise, fingerprint: &str) -> Result<()> {
    let primary = serde_json::to_string(&exercise.primary_muscles)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
    let secondary = serde_json::to_string(&exercise.secondary_muscles)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))?;
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT INTO exercise (
    id, name, level, category, force, mechanic, equipment, instructions,
    primary_muscles_json, secondary_muscles_json, fingerprint, created_at, updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
ON CONFLICT(id) DO UPDATE SET
    name = excluded.name,
    level = excluded.level,
    category = excluded.category,
    force = excluded.force,
    mechanic = excluded.mechanic,
    equipment = excluded.equipment,
    instructions = excluded.instructions,
    primary_muscles_json = excluded.primary_muscles_json,
    secondary_muscles_json = excluded.secondary_muscles_json,
    fingerprint = excluded.fingerprint,
    updated_at = excluded.updated_at
"#,
        params![
            exercise.id,
            exercise.name,
            exercise.level,
            exercise.category,
            exercise.force,
            exercise.mechanic,
            exercise.equipment,
            exercise.instructions,
            primary,
            secondary,
            fingerprint,
            now
        ],
    )?;
    Ok(())
}

fn exercise_from_row(row: &Row<'_>) -> Result<Exercise> {
    Ok(Exercise {
        id: row.get(0)?,
        name: row.get(1)?,
        level: row.get(2)?,
        category: row.get(3)?,
        force: row.get(4)?,
        mechanic: row.get(5)?,
        equipment: row.get(6)?,
        instructions: row.get(7)?,
        primary_muscles: muscles_from_json(row, 8)?,
        secondary_muscles: muscles_from_json(row, 9)?,
    })
}

fn muscles_from_json(row: &Row<'_>, index: usize) -> Result<Vec<String>> {
    let raw: String = row.get(index)?;
    serde_json::from_str(&raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
    })
}

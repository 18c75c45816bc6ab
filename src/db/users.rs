use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::model::{Measurement, UserProfile};

use super::{now_utc_rfc3339, DEFAULT_USER_ID};

pub const DEFAULT_USER_NAME: &str = "User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Height,
    Weight,
}

impl MeasurementKind {
    fn table(self) -> &'static str {
        match self {
            MeasurementKind::Height => "height_measurement",
            MeasurementKind::Weight => "weight_measurement",
        }
    }

    fn column(self) -> &'static str {
        match self {
            MeasurementKind::Height => "height",
            MeasurementKind::Weight => "weight",
        }
    }
}

pub fn ensure_default_user(conn: &Connection) -> Result<()> {
    let now = now_utc_rfc3339();
    conn.execute(
        r#"
INSERT OR IGNORE INTO user_profile (id, name, is_female, created_at, updated_at)
VALUES (?1, ?2, 0, ?3, ?3)
"#,
        params![DEFAULT_USER_ID, DEFAULT_USER_NAME, now],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: i64) -> Result<Option<UserProfile>> {
    conn.query_row(
        r#"
SELECT id, name, is_female, height, weight, birth_date, created_at, updated_at
FROM user_profile
WHERE id = ?1
"#,
        params![id],
        |row| {
            Ok(UserProfile {
                id: row.get(0)?,
                name: row.get(1)?,
                is_female: row.get(2)?,
                height: row.get(3)?,
                weight: row.get(4)?,
                birth_date: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        },
    )
    .optional()
}

pub fn update_profile(conn: &Connection, profile: &UserProfile) -> Result<usize> {
    conn.execute(
        r#"
UPDATE user_profile
SET name = ?1, is_female = ?2, height = ?3, weight = ?4, birth_date = ?5, updated_at = ?6
WHERE id = ?7
"#,
        params![
            profile.name,
            profile.is_female,
            profile.height,
            profile.weight,
            profile.birth_date,
            now_utc_rfc3339(),
            profile.id
        ],
    )
}

/// Most recent recorded value, if any.
pub fn last_measurement(
    conn: &Connection,
    kind: MeasurementKind,
    user_id: i64,
) -> Result<Option<f64>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
        kind.column(),
        kind.table()
    );
    conn.query_row(&sql, params![user_id], |row| row.get(0))
        .optional()
}

pub fn insert_measurement(
    conn: &Connection,
    kind: MeasurementKind,
    user_id: i64,
    value: f64,
) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {} (user_id, {}, created_at) VALUES (?1, ?2, ?3)",
        kind.table(),
        kind.column()
    );
    conn.execute(&sql, params![user_id, value, now_utc_rfc3339()])?;
    Ok(conn.last_insert_rowid())
}

/// Oldest first.
pub fn list_measurements(
    conn: &Connection,
    kind: MeasurementKind,
    user_id: i64,
) -> Result<Vec<Measurement>> {
    let sql = format!(
        "SELECT id, {}, created_at FROM {} WHERE user_id = ?1 ORDER BY id ASC",
        kind.column(),
        kind.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![user_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(Measurement {
            id: row.get(0)?,
            value: row.get(1)?,
            created_at: row.get(2)?,
        });
    }
    Ok(result)
}

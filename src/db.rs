use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Result};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub mod exercises;
pub mod records;
pub mod routines;
pub mod users;

pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// The profile every session and measurement belongs to.
pub const DEFAULT_USER_ID: i64 = 1;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        name: "baseline_fitness_schema_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS exercise (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    level TEXT NOT NULL,
    category TEXT NOT NULL,
    force TEXT,
    mechanic TEXT,
    equipment TEXT,
    instructions TEXT,
    primary_muscles_json TEXT NOT NULL DEFAULT '[]',
    secondary_muscles_json TEXT NOT NULL DEFAULT '[]',
    fingerprint TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS routine (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS routine_day (
    routine_id INTEGER NOT NULL REFERENCES routine(id) ON DELETE CASCADE,
    day TEXT NOT NULL,
    PRIMARY KEY (routine_id, day)
);

CREATE TABLE IF NOT EXISTS routine_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    routine_id INTEGER NOT NULL REFERENCES routine(id) ON DELETE CASCADE,
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS exercise_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    routine_item_id INTEGER NOT NULL REFERENCES routine_item(id) ON DELETE CASCADE,
    exercise_id TEXT NOT NULL,
    rest_time INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS workout_set (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise_item_id INTEGER NOT NULL REFERENCES exercise_item(id) ON DELETE CASCADE,
    reps INTEGER,
    weight REAL,
    duration INTEGER,
    order_index INTEGER NOT NULL CHECK (order_index >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS record_routine (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    routine_id INTEGER NOT NULL,
    duration INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS record_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_routine_id INTEGER NOT NULL REFERENCES record_routine(id) ON DELETE CASCADE,
    routine_item_id INTEGER NOT NULL,
    duration INTEGER,
    actual_rest_time INTEGER,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS record_exercise_item (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_item_id INTEGER NOT NULL REFERENCES record_item(id) ON DELETE CASCADE,
    exercise_item_id INTEGER NOT NULL,
    exercise_id TEXT NOT NULL,
    rest_time INTEGER NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    actual_rest_time INTEGER,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS record_set (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_exercise_item_id INTEGER NOT NULL
        REFERENCES record_exercise_item(id) ON DELETE CASCADE,
    set_id INTEGER NOT NULL,
    actual_reps INTEGER,
    actual_weight REAL,
    actual_duration INTEGER,
    completed_at TEXT,
    order_index INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_routine_item_parent ON routine_item(routine_id, order_index);
CREATE INDEX IF NOT EXISTS idx_exercise_item_parent
    ON exercise_item(routine_item_id, order_index);
CREATE INDEX IF NOT EXISTS idx_workout_set_parent ON workout_set(exercise_item_id, order_index);
CREATE INDEX IF NOT EXISTS idx_record_item_parent ON record_item(record_routine_id);
CREATE INDEX IF NOT EXISTS idx_record_exercise_item_parent
    ON record_exercise_item(record_item_id);
CREATE INDEX IF NOT EXISTS idx_record_set_parent ON record_set(record_exercise_item_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_record_routine_one_open
    ON record_routine(user_id) WHERE duration IS NULL;
"#,
    },
    Migration {
        version: 2,
        name: "user_profile_v1",
        sql: r#"
CREATE TABLE IF NOT EXISTS user_profile (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    is_female INTEGER NOT NULL DEFAULT 0,
    height REAL,
    weight REAL,
    birth_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS height_measurement (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES user_profile(id) ON DELETE CASCADE,
    height REAL NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS weight_measurement (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES user_profile(id) ON DELETE CASCADE,
    weight REAL NOT NULL,
    created_at TEXT NOT NULL
);
"#,
    },
];

pub fn open_connection(path: &str) -> Result<Connection> {
    let mut conn = Connection::open(path)?;
    configure_for_speed(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

fn configure_for_speed(conn: &Connection) -> Result<()> {
    conn.pragma_update(None::<DatabaseName>, "journal_mode", "WAL")?;
    conn.pragma_update(None::<DatabaseName>, "synchronous", "NORMAL")?;
    conn.pragma_update(None::<DatabaseName>, "foreign_keys", "ON")?;
    conn.pragma_update(None::<DatabaseName>, "temp_store", "MEMORY")?;
    conn.pragma_update(None::<DatabaseName>, "busy_timeout", 5000i64)?;
    conn.busy_timeout(Duration::from_millis(5000))?;
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL
);
"#,
    )?;

    for migration in MIGRATIONS {
        let already_applied: Option<i64> = tx
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()?;

        if already_applied.is_some() {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
            params![migration.version, migration.name, now_utc_rfc3339()],
        )?;
    }

    tx.execute(
        r#"
INSERT INTO meta (key, value)
VALUES ('schema_version', ?1)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    users::ensure_default_user(&tx)?;

    tx.commit()
}

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

pub fn ping(conn: &Connection) -> Result<()> {
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

pub fn get_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_meta(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r#"
INSERT INTO meta (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#,
        params![key, value],
    )?;
    Ok(())
}

/// Sibling collections that carry an `order_index` under a parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingKind {
    RoutineItem,
    ExerciseItem,
    Set,
}

impl SiblingKind {
    fn table(self) -> &'static str {
        match self {
            SiblingKind::RoutineItem => "routine_item",
            SiblingKind::ExerciseItem => "exercise_item",
            SiblingKind::Set => "workout_set",
        }
    }

    fn parent_column(self) -> &'static str {
        match self {
            SiblingKind::RoutineItem => "routine_id",
            SiblingKind::ExerciseItem => "routine_item_id",
            SiblingKind::Set => "exercise_item_id",
        }
    }
}

/// `(id, order_index)` of the live siblings under `parent_id`, ascending.
pub fn list_sibling_positions(
    conn: &Connection,
    kind: SiblingKind,
    parent_id: i64,
) -> Result<Vec<(i64, i64)>> {
    let sql = format!(
        "SELECT id, order_index FROM {} WHERE {} = ?1 AND deleted_at IS NULL \
         ORDER BY order_index ASC, id ASC",
        kind.table(),
        kind.parent_column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![parent_id])?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push((row.get(0)?, row.get(1)?));
    }
    Ok(result)
}

pub fn update_order_index(
    conn: &Connection,
    kind: SiblingKind,
    id: i64,
    order_index: i64,
) -> Result<()> {
    let sql = format!(
        "UPDATE {} SET order_index = ?1, updated_at = ?2 WHERE id = ?3",
        kind.table()
    );
    conn.execute(&sql, params![order_index, now_utc_rfc3339(), id])?;
    Ok(())
}

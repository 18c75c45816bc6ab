use std::error::Error;
use std::fmt;

use rusqlite::{Connection, ErrorCode};

use crate::catalog::{CatalogSync, SqliteCatalog};
use crate::config::ConfigError;
use crate::db::{self, DEFAULT_USER_ID};
use crate::domain::session::InvalidSessionTransition;
use crate::domain::validation::ValidationError;
use crate::ordering::OrderingError;
use crate::profile::ProfileService;
use crate::routines::RoutineService;
use crate::workouts::WorkoutService;

pub struct App {
    conn: Connection,
    image_base_url: String,
    catalog_sync: CatalogSync,
}

impl App {
    pub fn open(db_path: &str, image_base_url: &str) -> Result<Self, AppError> {
        ensure_parent_dir(db_path)?;
        let conn = db::open_connection(db_path)?;
        let catalog_sync = CatalogSync::restore(&conn)?;
        Ok(Self {
            conn,
            image_base_url: image_base_url.to_string(),
            catalog_sync,
        })
    }

    pub fn catalog(&self) -> SqliteCatalog<'_> {
        SqliteCatalog::new(&self.conn, &self.image_base_url)
    }

    pub fn catalog_sync(&self) -> &CatalogSync {
        &self.catalog_sync
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn routines(&self) -> RoutineService<'_, SqliteCatalog<'_>> {
        RoutineService::new(&self.conn, self.catalog())
    }

    pub fn workouts(&self) -> WorkoutService<'_> {
        WorkoutService::new(&self.conn, DEFAULT_USER_ID)
    }

    pub fn profile(&self) -> ProfileService<'_> {
        ProfileService::new(&self.conn, DEFAULT_USER_ID)
    }

    pub fn ping(&self) -> Result<(), AppError> {
        db::ping(&self.conn)?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &str) -> Result<(), AppError> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Exercise,
    Routine,
    RoutineItem,
    ExerciseItem,
    Set,
    Session,
    RecordItem,
    RecordExerciseItem,
    RecordSet,
    Profile,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Exercise => "exercise",
            EntityKind::Routine => "routine",
            EntityKind::RoutineItem => "routine item",
            EntityKind::ExerciseItem => "exercise item",
            EntityKind::Set => "set",
            EntityKind::Session => "session",
            EntityKind::RecordItem => "record item",
            EntityKind::RecordExerciseItem => "record exercise item",
            EntityKind::RecordSet => "record set",
            EntityKind::Profile => "profile",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    NotFound { entity: EntityKind, id: String },
    Conflict(String),
    Ordering(OrderingError),
    Storage(rusqlite::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(ConfigError),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Storage errors raised by a uniqueness constraint become `Conflict`;
    /// other constraint failures stay `Storage`.
    pub fn from_storage_conflict(err: rusqlite::Error, message: &str) -> Self {
        let unique = matches!(
            &err,
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation
                    && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        );
        if unique {
            AppError::Conflict(message.to_string())
        } else {
            AppError::Storage(err)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::NotFound { entity, id } => {
                write!(f, "{} '{}' not found", entity.as_str(), id)
            }
            AppError::Conflict(message) => write!(f, "conflict: {}", message),
            AppError::Ordering(err) => write!(f, "{}", err),
            AppError::Storage(err) => write!(f, "database error: {}", err),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::Json(err) => write!(f, "JSON error: {}", err),
            AppError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Validation(err) => Some(err),
            AppError::Ordering(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Config(err) => Some(err),
            AppError::NotFound { .. } | AppError::Conflict(_) => None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value)
    }
}

impl From<OrderingError> for AppError {
    fn from(value: OrderingError) -> Self {
        AppError::Ordering(value)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        AppError::Storage(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Json(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<InvalidSessionTransition> for AppError {
    fn from(value: InvalidSessionTransition) -> Self {
        AppError::Conflict(value.to_string())
    }
}

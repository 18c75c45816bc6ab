//! Read-mostly exercise library keyed by a stable string id.

mod source;
mod sync;

use rusqlite::Connection;
use serde::Serialize;

use crate::app::AppError;
use crate::db::exercises;
use crate::domain::model::Exercise;

pub use sync::CatalogSync;

/// What the routine aggregate needs from the exercise library.
pub trait ExerciseCatalog {
    fn get_by_id(&self, id: &str) -> Result<Option<Exercise>, AppError>;

    fn list_all(&self) -> Result<Vec<Exercise>, AppError>;

    fn contains(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.get_by_id(id)?.is_some())
    }
}

/// An exercise with its image URLs resolved, for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExerciseView {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub images: Vec<String>,
}

pub struct SqliteCatalog<'a> {
    conn: &'a Connection,
    image_base_url: &'a str,
}

impl<'a> SqliteCatalog<'a> {
    pub fn new(conn: &'a Connection, image_base_url: &'a str) -> Self {
        Self {
            conn,
            image_base_url,
        }
    }

    pub fn view(&self, exercise: Exercise) -> ExerciseView {
        let images = exercise.image_urls(self.image_base_url);
        ExerciseView { exercise, images }
    }
}

impl ExerciseCatalog for SqliteCatalog<'_> {
    fn get_by_id(&self, id: &str) -> Result<Option<Exercise>, AppError> {
        Ok(exercises::get_exercise(self.conn, id)?)
    }

    fn list_all(&self) -> Result<Vec<Exercise>, AppError> {
        Ok(exercises::list_exercises(self.conn)?)
    }

    fn contains(&self, id: &str) -> Result<bool, AppError> {
        Ok(exercises::exercise_exists(self.conn, id)?)
    }
}

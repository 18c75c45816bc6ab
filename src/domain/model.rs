use serde::Serialize;

use super::session::SessionState;

/// Reference exercise owned by the catalog; the aggregates only read it by id.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub level: String,
    pub category: String,
    pub force: Option<String>,
    pub mechanic: Option<String>,
    pub equipment: Option<String>,
    pub instructions: Option<String>,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
}

pub const EXERCISE_IMAGE_COUNT: usize = 2;

impl Exercise {
    /// Relative image paths in the upstream catalog layout.
    pub fn image_paths(&self) -> Vec<String> {
        (0..EXERCISE_IMAGE_COUNT)
            .map(|index| format!("exercises/{}/{}.jpg", self.id, index))
            .collect()
    }

    pub fn image_urls(&self, base_url: &str) -> Vec<String> {
        let base = base_url.trim_end_matches('/');
        self.image_paths()
            .into_iter()
            .map(|path| format!("{base}/{path}"))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub days: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<RoutineItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoutineSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub days: Vec<String>,
    pub item_count: usize,
    pub updated_at: String,
}

/// One slot in a routine; more than one exercise item makes it a superset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutineItem {
    pub id: i64,
    pub routine_id: i64,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
    pub exercise_items: Vec<ExerciseItem>,
}

impl RoutineItem {
    pub fn is_superset(&self) -> bool {
        self.exercise_items.len() > 1
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExerciseItem {
    pub id: i64,
    pub routine_item_id: i64,
    pub exercise_id: String,
    pub rest_time: i64,
    pub notes: String,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
    pub sets: Vec<PlannedSet>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlannedSet {
    pub id: i64,
    pub exercise_item_id: i64,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub duration: Option<i64>,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl PlannedSet {
    pub fn values(&self) -> SetValues {
        SetValues {
            reps: self.reps,
            weight: self.weight,
            duration: self.duration,
        }
    }

    /// Duration-only sets are rendered as timed exercises.
    pub fn is_timed(&self) -> bool {
        self.duration.is_some() && self.reps.is_none() && self.weight.is_none()
    }
}

/// Reps, weight and duration as one unit, planned or measured.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct SetValues {
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordRoutine {
    pub id: i64,
    pub routine_id: i64,
    pub duration: Option<i64>,
    pub state: SessionState,
    pub created_at: String,
    pub updated_at: String,
    pub items: Vec<RecordItem>,
}

impl RecordRoutine {
    pub fn set_count(&self) -> usize {
        self.items
            .iter()
            .flat_map(|item| &item.exercise_items)
            .map(|exercise| exercise.sets.len())
            .sum()
    }

    pub fn completed_set_count(&self) -> usize {
        self.items
            .iter()
            .flat_map(|item| &item.exercise_items)
            .flat_map(|exercise| &exercise.sets)
            .filter(|set| set.completed_at.is_some())
            .count()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: i64,
    pub routine_id: i64,
    pub routine_name: Option<String>,
    pub duration: Option<i64>,
    pub state: SessionState,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordItem {
    pub id: i64,
    pub record_routine_id: i64,
    pub routine_item_id: i64,
    pub duration: Option<i64>,
    pub actual_rest_time: Option<i64>,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
    pub exercise_items: Vec<RecordExerciseItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordExerciseItem {
    pub id: i64,
    pub record_item_id: i64,
    pub exercise_item_id: i64,
    pub exercise_id: String,
    pub rest_time: i64,
    pub notes: String,
    pub actual_rest_time: Option<i64>,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
    pub sets: Vec<RecordSet>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordSet {
    pub id: i64,
    pub record_exercise_item_id: i64,
    pub set_id: i64,
    pub actual_reps: Option<i64>,
    pub actual_weight: Option<f64>,
    pub actual_duration: Option<i64>,
    pub completed_at: Option<String>,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl RecordSet {
    pub fn actual_values(&self) -> SetValues {
        SetValues {
            reps: self.actual_reps,
            weight: self.actual_weight,
            duration: self.actual_duration,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub is_female: bool,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub birth_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Measurement {
    pub id: i64,
    pub value: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeasurementHistory {
    pub heights: Vec<Measurement>,
    pub weights: Vec<Measurement>,
}

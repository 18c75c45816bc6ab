use rusqlite::Connection;

use crate::app::{AppError, EntityKind};
use crate::catalog::ExerciseCatalog;
use crate::db::{self, now_utc_rfc3339, routines, SiblingKind};
use crate::domain::model::{ExerciseItem, PlannedSet, Routine, RoutineSummary, SetValues};
use crate::domain::{validation, weekday};
use crate::ordering::{self, Direction, Sibling, SiblingStore, SwapPlan};

/// Ordering store over one sibling table.
pub struct SqliteSiblings<'a> {
    conn: &'a Connection,
    kind: SiblingKind,
}

impl<'a> SqliteSiblings<'a> {
    pub fn new(conn: &'a Connection, kind: SiblingKind) -> Self {
        Self { conn, kind }
    }
}

impl SiblingStore for SqliteSiblings<'_> {
    type Error = AppError;

    fn siblings(&self, parent_id: i64) -> Result<Vec<Sibling>, AppError> {
        Ok(db::list_sibling_positions(self.conn, self.kind, parent_id)?
            .into_iter()
            .map(|(id, order_index)| Sibling { id, order_index })
            .collect())
    }

    fn set_order_index(&self, id: i64, order_index: i64) -> Result<(), AppError> {
        db::update_order_index(self.conn, self.kind, id, order_index)?;
        Ok(())
    }
}

pub struct RoutineService<'a, C: ExerciseCatalog> {
    conn: &'a Connection,
    catalog: C,
}

impl<'a, C: ExerciseCatalog> RoutineService<'a, C> {
    pub fn new(conn: &'a Connection, catalog: C) -> Self {
        Self { conn, catalog }
    }

    pub fn create_routine(&self, name: &str, description: &str) -> Result<Routine, AppError> {
        let name = validation::routine_name(name)?;
        let id = routines::insert_routine(self.conn, &name, description.trim())?;
        tracing::info!(routine_id = id, name = %name, "routine created");
        self.get_routine(id)
    }

    pub fn update_routine(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Routine, AppError> {
        self.require_routine(id)?;
        let name = validation::routine_name(name)?;
        routines::update_routine(self.conn, id, &name, description.trim())?;
        self.get_routine(id)
    }

    pub fn delete_routine(&self, id: i64) -> Result<(), AppError> {
        if id == 0 {
            return Err(validation::ValidationError::new("id", "routine id is required").into());
        }
        let tx = self.conn.unchecked_transaction()?;
        let affected = routines::soft_delete_routine(&tx, id, &now_utc_rfc3339())?;
        if affected == 0 {
            return Err(AppError::not_found(EntityKind::Routine, id));
        }
        tx.commit()?;
        tracing::info!(routine_id = id, "routine deleted");
        Ok(())
    }

    pub fn set_routine_days(&self, id: i64, days: &[String]) -> Result<Routine, AppError> {
        let days = weekday::normalize(days)?;
        self.require_routine(id)?;
        let names: Vec<&str> = days.iter().map(|day| weekday::as_str(*day)).collect();
        let tx = self.conn.unchecked_transaction()?;
        routines::replace_routine_days(&tx, id, &names)?;
        tx.commit()?;
        self.get_routine(id)
    }

    pub fn get_routine(&self, id: i64) -> Result<Routine, AppError> {
        routines::load_routine_tree(self.conn, id)?
            .ok_or_else(|| AppError::not_found(EntityKind::Routine, id))
    }

    pub fn list_routines(&self) -> Result<Vec<RoutineSummary>, AppError> {
        Ok(routines::list_routines(self.conn)?)
    }

    /// Appends an empty slot; returns its id.
    pub fn add_routine_item(&self, routine_id: i64) -> Result<i64, AppError> {
        self.require_routine(routine_id)?;
        let store = SqliteSiblings::new(self.conn, SiblingKind::RoutineItem);
        let tx = self.conn.unchecked_transaction()?;
        let index = ordering::next_index(&store.siblings(routine_id)?);
        let id = routines::insert_routine_item(&tx, routine_id, index)?;
        tx.commit()?;
        tracing::debug!(routine_id, routine_item_id = id, order_index = index, "slot added");
        Ok(id)
    }

    pub fn move_routine_item(&self, item_id: i64, toward_top: bool) -> Result<SwapPlan, AppError> {
        let item = routines::get_routine_item(self.conn, item_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::RoutineItem, item_id))?;
        self.swap(
            SiblingKind::RoutineItem,
            item.routine_id,
            Sibling {
                id: item.id,
                order_index: item.order_index,
            },
            toward_top,
        )
    }

    /// Returns the owning routine id.
    pub fn delete_routine_item(&self, item_id: i64) -> Result<i64, AppError> {
        let item = routines::get_routine_item(self.conn, item_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::RoutineItem, item_id))?;
        let tx = self.conn.unchecked_transaction()?;
        routines::soft_delete_routine_item(&tx, item_id, &now_utc_rfc3339())?;
        tx.commit()?;
        tracing::info!(routine_id = item.routine_id, routine_item_id = item_id, "slot deleted");
        Ok(item.routine_id)
    }

    /// Creates the exercise item with one empty set so it always has a row to edit.
    pub fn add_exercise_to_item(
        &self,
        routine_item_id: i64,
        exercise_id: &str,
    ) -> Result<ExerciseItem, AppError> {
        routines::get_routine_item(self.conn, routine_item_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::RoutineItem, routine_item_id))?;
        if !self.catalog.contains(exercise_id)? {
            return Err(AppError::not_found(EntityKind::Exercise, exercise_id));
        }

        let store = SqliteSiblings::new(self.conn, SiblingKind::ExerciseItem);
        let tx = self.conn.unchecked_transaction()?;
        let index = ordering::next_index(&store.siblings(routine_item_id)?);
        let id = routines::insert_exercise_item(&tx, routine_item_id, exercise_id, index)?;
        routines::insert_set(&tx, id, &SetValues::default(), 0)?;
        tx.commit()?;

        tracing::info!(
            routine_item_id,
            exercise_item_id = id,
            exercise_id = %exercise_id,
            "exercise added"
        );
        self.get_exercise_item(id)
    }

    pub fn get_exercise_item(&self, item_id: i64) -> Result<ExerciseItem, AppError> {
        routines::get_exercise_item(self.conn, item_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::ExerciseItem, item_id))
    }

    pub fn update_exercise_item(
        &self,
        item_id: i64,
        rest_time_seconds: i64,
        notes: &str,
    ) -> Result<ExerciseItem, AppError> {
        validation::rest_time("rest_time", rest_time_seconds)?;
        self.get_exercise_item(item_id)?;
        routines::update_exercise_item(self.conn, item_id, rest_time_seconds, notes.trim())?;
        self.get_exercise_item(item_id)
    }

    pub fn move_exercise_item(
        &self,
        item_id: i64,
        toward_top: bool,
    ) -> Result<SwapPlan, AppError> {
        let item = self.get_exercise_item(item_id)?;
        self.swap(
            SiblingKind::ExerciseItem,
            item.routine_item_id,
            Sibling {
                id: item.id,
                order_index: item.order_index,
            },
            toward_top,
        )
    }

    /// Deletes the item and its sets, then the slot if it is left empty.
    /// Returns the owning routine id.
    pub fn delete_exercise_item(&self, item_id: i64) -> Result<i64, AppError> {
        let item = self.get_exercise_item(item_id)?;
        let routine_id = self.routine_of_exercise_item(item_id)?;

        let tx = self.conn.unchecked_transaction()?;
        let deleted_at = now_utc_rfc3339();
        routines::soft_delete_exercise_item(&tx, item_id, &deleted_at)?;
        let slot_emptied = routines::count_exercise_items(&tx, item.routine_item_id)? == 0;
        if slot_emptied {
            routines::soft_delete_routine_item(&tx, item.routine_item_id, &deleted_at)?;
        }
        tx.commit()?;

        tracing::info!(
            routine_id,
            exercise_item_id = item_id,
            slot_removed = slot_emptied,
            "exercise item deleted"
        );
        Ok(routine_id)
    }

    /// Appends a set that repeats the last set's values.
    pub fn add_set(&self, exercise_item_id: i64) -> Result<PlannedSet, AppError> {
        let item = self.get_exercise_item(exercise_item_id)?;
        let values = item
            .sets
            .last()
            .map(PlannedSet::values)
            .unwrap_or_default();
        let siblings: Vec<Sibling> = item
            .sets
            .iter()
            .map(|set| Sibling {
                id: set.id,
                order_index: set.order_index,
            })
            .collect();
        let index = ordering::next_index(&siblings);
        let id = routines::insert_set(self.conn, exercise_item_id, &values, index)?;
        tracing::debug!(exercise_item_id, set_id = id, order_index = index, "set added");
        self.get_set(id)
    }

    /// Overwrites all three planned values; `None` clears a field.
    pub fn update_set(&self, set_id: i64, values: SetValues) -> Result<PlannedSet, AppError> {
        validation::set_values(&values)?;
        self.get_set(set_id)?;
        routines::update_set_values(self.conn, set_id, &values)?;
        self.get_set(set_id)
    }

    pub fn move_set(&self, set_id: i64, toward_top: bool) -> Result<SwapPlan, AppError> {
        let set = self.get_set(set_id)?;
        self.swap(
            SiblingKind::Set,
            set.exercise_item_id,
            Sibling {
                id: set.id,
                order_index: set.order_index,
            },
            toward_top,
        )
    }

    /// Never removes the parent exercise item, even when this was its last set.
    /// Returns the owning routine id.
    pub fn delete_set(&self, set_id: i64) -> Result<i64, AppError> {
        let set = self.get_set(set_id)?;
        let routine_id = self.routine_of_exercise_item(set.exercise_item_id)?;
        routines::soft_delete_set(self.conn, set_id, &now_utc_rfc3339())?;
        tracing::debug!(routine_id, set_id, "set deleted");
        Ok(routine_id)
    }

    fn get_set(&self, set_id: i64) -> Result<PlannedSet, AppError> {
        routines::get_set(self.conn, set_id)?.ok_or_else(|| AppError::not_found(EntityKind::Set, set_id))
    }

    fn require_routine(&self, id: i64) -> Result<(), AppError> {
        if routines::routine_exists(self.conn, id)? {
            Ok(())
        } else {
            Err(AppError::not_found(EntityKind::Routine, id))
        }
    }

    fn routine_of_exercise_item(&self, item_id: i64) -> Result<i64, AppError> {
        routines::routine_id_for_exercise_item(self.conn, item_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::ExerciseItem, item_id))
    }

    fn swap(
        &self,
        kind: SiblingKind,
        parent_id: i64,
        item: Sibling,
        toward_top: bool,
    ) -> Result<SwapPlan, AppError> {
        let direction = Direction::from_toward_top(toward_top);
        let store = SqliteSiblings::new(self.conn, kind);
        let tx = self.conn.unchecked_transaction()?;
        let plan = ordering::swap_adjacent(&store, parent_id, item, direction)?;
        tx.commit()?;
        tracing::debug!(
            id = item.id,
            parent_id,
            direction = direction.as_str(),
            neighbor = plan.neighbor.id,
            "sibling moved"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::app::{AppError, EntityKind};
use crate::db::{now_utc_rfc3339, records, routines};
use crate::domain::model::{RecordRoutine, RecordSet, SessionSummary, SetValues};
use crate::domain::session::SessionState;
use crate::domain::validation;

/// Session aggregate for one user. At most one session is open at a time;
/// the storage layer backs that with a partial unique index.
pub struct WorkoutService<'a> {
    conn: &'a Connection,
    user_id: i64,
}

impl<'a> WorkoutService<'a> {
    pub fn new(conn: &'a Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    pub fn state(&self) -> Result<SessionState, AppError> {
        Ok(SessionState::of_user(records::active_session_id(
            self.conn,
            self.user_id,
        )?))
    }

    /// Snapshots the routine's current tree into a new open session.
    pub fn start_session(&self, routine_id: i64) -> Result<RecordRoutine, AppError> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let active = records::active_session_id(&tx, self.user_id)?;
        if SessionState::of_user(active)
            .validate_transition(SessionState::InProgress)
            .is_err()
        {
            let open_id = active.unwrap_or_default();
            return Err(AppError::Conflict(format!(
                "session {} is already in progress",
                open_id
            )));
        }

        let routine = routines::load_routine_tree(&tx, routine_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::Routine, routine_id))?;
        let session_id = records::insert_snapshot(&tx, self.user_id, &routine)
            .map_err(|err| AppError::from_storage_conflict(err, "a session is already in progress"))?;
        tx.commit()?;

        tracing::info!(
            session_id,
            routine_id,
            items = routine.items.len(),
            "session started"
        );
        self.get_session(session_id)
    }

    /// Stores measured values for one set. `completed_at` defaults to now.
    pub fn record_set_completion(
        &self,
        record_set_id: i64,
        actual: SetValues,
        completed_at: Option<&str>,
    ) -> Result<RecordSet, AppError> {
        validation::set_values(&actual)?;
        let completed_at = match completed_at {
            Some(raw) => validation::timestamp("completed_at", raw)?,
            None => now_utc_rfc3339(),
        };
        let updated = records::update_record_set(self.conn, record_set_id, &actual, &completed_at)?;
        if updated == 0 {
            return Err(AppError::not_found(EntityKind::RecordSet, record_set_id));
        }
        records::get_record_set(self.conn, record_set_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::RecordSet, record_set_id))
    }

    /// Writes whichever of duration and rest is given.
    pub fn record_item_timing(
        &self,
        record_item_id: i64,
        duration: Option<i64>,
        actual_rest_time: Option<i64>,
    ) -> Result<(), AppError> {
        if let Some(duration) = duration {
            validation::non_negative_seconds("duration", duration)?;
        }
        if let Some(rest) = actual_rest_time {
            validation::rest_time("actual_rest_time", rest)?;
        }
        let updated =
            records::update_record_item_timing(self.conn, record_item_id, duration, actual_rest_time)?;
        if updated == 0 {
            return Err(AppError::not_found(EntityKind::RecordItem, record_item_id));
        }
        Ok(())
    }

    pub fn record_exercise_rest(
        &self,
        record_exercise_item_id: i64,
        actual_rest_time: Option<i64>,
    ) -> Result<(), AppError> {
        if let Some(rest) = actual_rest_time {
            validation::rest_time("actual_rest_time", rest)?;
        }
        let updated =
            records::update_record_exercise_rest(self.conn, record_exercise_item_id, actual_rest_time)?;
        if updated == 0 {
            return Err(AppError::not_found(
                EntityKind::RecordExerciseItem,
                record_exercise_item_id,
            ));
        }
        Ok(())
    }

    /// Sets the total duration. A completed session may be ended again; the
    /// new duration replaces the old one.
    pub fn end_session(
        &self,
        record_routine_id: i64,
        total_duration_seconds: i64,
    ) -> Result<RecordRoutine, AppError> {
        validation::non_negative_seconds("duration", total_duration_seconds)?;
        let current = records::session_duration(self.conn, record_routine_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::Session, record_routine_id))?;
        let state = SessionState::of_session(current);
        state.validate_transition(SessionState::Completed)?;
        if state.is_terminal() {
            tracing::warn!(
                session_id = record_routine_id,
                previous = ?current,
                duration = total_duration_seconds,
                "session already completed; overwriting duration"
            );
        }

        records::set_session_duration(self.conn, record_routine_id, total_duration_seconds)?;
        tracing::info!(
            session_id = record_routine_id,
            duration = total_duration_seconds,
            "session ended"
        );
        self.get_session(record_routine_id)
    }

    /// Hard-deletes the session tree in any state.
    pub fn discard_session(&self, record_routine_id: i64) -> Result<(), AppError> {
        let deleted = records::delete_session(self.conn, record_routine_id)?;
        if deleted == 0 {
            return Err(AppError::not_found(EntityKind::Session, record_routine_id));
        }
        tracing::info!(session_id = record_routine_id, "session discarded");
        Ok(())
    }

    pub fn get_active_session(&self) -> Result<Option<RecordRoutine>, AppError> {
        match records::active_session_id(self.conn, self.user_id)? {
            Some(id) => Ok(records::load_record_tree(self.conn, id)?),
            None => Ok(None),
        }
    }

    pub fn get_session(&self, record_routine_id: i64) -> Result<RecordRoutine, AppError> {
        records::load_record_tree(self.conn, record_routine_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::Session, record_routine_id))
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>, AppError> {
        Ok(records::list_sessions(self.conn, self.user_id)?)
    }
}

#[cfg(test)]
mod tests;

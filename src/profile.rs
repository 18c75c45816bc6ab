use rusqlite::Connection;
use time::OffsetDateTime;

use crate::app::{AppError, EntityKind};
use crate::db::users::{self, MeasurementKind};
use crate::domain::model::{MeasurementHistory, UserProfile};
use crate::domain::validation;

/// Full replacement of the editable profile fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub is_female: bool,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub birth_date: Option<String>,
}

pub struct ProfileService<'a> {
    conn: &'a Connection,
    user_id: i64,
}

impl<'a> ProfileService<'a> {
    pub fn new(conn: &'a Connection, user_id: i64) -> Self {
        Self { conn, user_id }
    }

    pub fn get_profile(&self) -> Result<UserProfile, AppError> {
        users::get_profile(self.conn, self.user_id)?
            .ok_or_else(|| AppError::not_found(EntityKind::Profile, self.user_id))
    }

    /// Overwrites the profile. Height and weight are appended to their
    /// history only when they differ from the last stored reading.
    pub fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AppError> {
        let name = validation::profile_name(&update.name)?;
        validation::body_height(update.height)?;
        validation::body_weight(update.weight)?;
        let birth_date = match update.birth_date.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => {
                let today = OffsetDateTime::now_utc().date();
                validation::birth_date(raw, today)?;
                Some(raw.to_string())
            }
        };

        let mut profile = self.get_profile()?;
        profile.name = name;
        profile.is_female = update.is_female;
        profile.height = update.height;
        profile.weight = update.weight;
        profile.birth_date = birth_date;

        let tx = self.conn.unchecked_transaction()?;
        users::update_profile(&tx, &profile)?;
        self.append_if_changed(&tx, MeasurementKind::Height, update.height)?;
        self.append_if_changed(&tx, MeasurementKind::Weight, update.weight)?;
        tx.commit()?;

        tracing::debug!(user_id = self.user_id, "profile updated");
        self.get_profile()
    }

    pub fn measurement_history(&self) -> Result<MeasurementHistory, AppError> {
        Ok(MeasurementHistory {
            heights: users::list_measurements(self.conn, MeasurementKind::Height, self.user_id)?,
            weights: users::list_measurements(self.conn, MeasurementKind::Weight, self.user_id)?,
        })
    }

    fn append_if_changed(
        &self,
        conn: &Connection,
        kind: MeasurementKind,
        value: Option<f64>,
    ) -> Result<(), AppError> {
        let Some(value) = value else {
            return Ok(());
        };
        if users::last_measurement(conn, kind, self.user_id)? != Some(value) {
            users::insert_measurement(conn, kind, self.user_id, value)?;
        }
        Ok(())
    }
}

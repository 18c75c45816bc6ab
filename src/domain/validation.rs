use std::error::Error;
use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::model::SetValues;

pub const MAX_ROUTINE_NAME_CHARS: usize = 100;
pub const MAX_REST_TIME_SECONDS: i64 = 3600;
pub const MIN_REPS: i64 = 1;
pub const MAX_REPS: i64 = 99;
pub const MAX_WEIGHT: f64 = 300.0;
pub const MIN_SET_DURATION_SECONDS: i64 = 1;
pub const MAX_SET_DURATION_SECONDS: i64 = 7200;
pub const MAX_PROFILE_NAME_CHARS: usize = 50;
pub const MAX_BODY_HEIGHT: f64 = 250.0;
pub const MAX_BODY_WEIGHT: f64 = 200.0;
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// A caller-supplied value that breaks a domain rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.constraint)
    }
}

impl Error for ValidationError {}

/// Returns the trimmed name to store.
pub fn routine_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    if name.chars().count() > MAX_ROUTINE_NAME_CHARS {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {MAX_ROUTINE_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

pub fn rest_time(field: &'static str, seconds: i64) -> Result<(), ValidationError> {
    if !(0..=MAX_REST_TIME_SECONDS).contains(&seconds) {
        return Err(ValidationError::new(
            field,
            format!("must be between 0 and {MAX_REST_TIME_SECONDS} seconds"),
        ));
    }
    Ok(())
}

pub fn non_negative_seconds(field: &'static str, seconds: i64) -> Result<(), ValidationError> {
    if seconds < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

/// Every present value is checked before anything is written.
pub fn set_values(values: &SetValues) -> Result<(), ValidationError> {
    if let Some(reps) = values.reps {
        if !(MIN_REPS..=MAX_REPS).contains(&reps) {
            return Err(ValidationError::new(
                "reps",
                format!("must be between {MIN_REPS} and {MAX_REPS}"),
            ));
        }
    }
    if let Some(weight) = values.weight {
        if !(weight > 0.0 && weight <= MAX_WEIGHT) {
            return Err(ValidationError::new(
                "weight",
                format!("must be greater than 0 and at most {MAX_WEIGHT}"),
            ));
        }
    }
    if let Some(duration) = values.duration {
        if !(MIN_SET_DURATION_SECONDS..=MAX_SET_DURATION_SECONDS).contains(&duration) {
            return Err(ValidationError::new(
                "duration",
                format!(
                    "must be between {MIN_SET_DURATION_SECONDS} and \
                     {MAX_SET_DURATION_SECONDS} seconds"
                ),
            ));
        }
    }
    Ok(())
}

pub fn profile_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_PROFILE_NAME_CHARS {
        return Err(ValidationError::new(
            "name",
            format!("must be 1 to {MAX_PROFILE_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_string())
}

pub fn body_height(height: Option<f64>) -> Result<(), ValidationError> {
    body_measure("height", height, MAX_BODY_HEIGHT)
}

pub fn body_weight(weight: Option<f64>) -> Result<(), ValidationError> {
    body_measure("weight", weight, MAX_BODY_WEIGHT)
}

fn body_measure(field: &'static str, value: Option<f64>, max: f64) -> Result<(), ValidationError> {
    match value {
        Some(value) if !(0.0..=max).contains(&value) => Err(ValidationError::new(
            field,
            format!("must be between 0 and {max}"),
        )),
        _ => Ok(()),
    }
}

const BIRTH_DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parses `YYYY-MM-DD`, rejecting future dates and years before 1900.
pub fn birth_date(raw: &str, today: Date) -> Result<Date, ValidationError> {
    let date = Date::parse(raw.trim(), BIRTH_DATE_FORMAT)
        .map_err(|_| ValidationError::new("birth_date", "must be formatted as YYYY-MM-DD"))?;
    if date > today {
        return Err(ValidationError::new("birth_date", "must not be in the future"));
    }
    if date.year() < MIN_BIRTH_YEAR {
        return Err(ValidationError::new(
            "birth_date",
            format!("year must be {MIN_BIRTH_YEAR} or later"),
        ));
    }
    Ok(date)
}

/// Normalizes an RFC3339 timestamp to UTC.
pub fn timestamp(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let parsed = OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| ValidationError::new(field, "must be an RFC3339 timestamp"))?;
    parsed
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| ValidationError::new(field, err.to_string()))
}

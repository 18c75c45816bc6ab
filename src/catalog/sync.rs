use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::app::AppError;
use crate::db::{self, exercises, now_utc_rfc3339};
use crate::domain::model::Exercise;

use super::source::{normalize, SourceExercise};

const LAST_SYNC_META_KEY: &str = "catalog_last_sync";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoadSummary {
    pub source: String,
    pub processed_count: u64,
    pub created_count: u64,
    pub updated_count: u64,
    pub unchanged_count: u64,
    pub skipped_count: u64,
    pub last_error: Option<String>,
    pub loaded_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Updated,
    Unchanged,
}

/// Owns the time of the last successful catalog load.
#[derive(Debug, Default)]
pub struct CatalogSync {
    last_sync: Mutex<Option<String>>,
}

impl CatalogSync {
    /// Picks up the persisted load time so it survives restarts.
    pub fn restore(conn: &Connection) -> Result<Self, AppError> {
        let persisted = db::get_meta(conn, LAST_SYNC_META_KEY)?;
        Ok(Self {
            last_sync: Mutex::new(persisted),
        })
    }

    pub fn last_sync(&self) -> Option<String> {
        match self.last_sync.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Upserts every usable record of a free-exercise-db JSON array.
    /// Records that fail to decode or normalize are counted and skipped.
    pub fn load_file(&self, conn: &Connection, path: &Path) -> Result<LoadSummary, AppError> {
        let raw = fs::read_to_string(path)?;
        let records: Vec<Value> = serde_json::from_str(&raw)?;

        let mut summary = LoadSummary {
            source: path.display().to_string(),
            ..LoadSummary::default()
        };

        let tx = conn.unchecked_transaction()?;
        for (index, record) in records.into_iter().enumerate() {
            summary.processed_count += 1;
            let exercise = match serde_json::from_value::<SourceExercise>(record)
                .map_err(|err| err.to_string())
                .and_then(normalize)
            {
                Ok(exercise) => exercise,
                Err(message) => {
                    tracing::warn!(record = index, reason = %message, "skipping catalog record");
                    summary.skipped_count += 1;
                    summary.last_error = Some(format!("record {}: {}", index, message));
                    continue;
                }
            };

            match upsert_if_changed(&tx, &exercise)? {
                Outcome::Created => summary.created_count += 1,
                Outcome::Updated => summary.updated_count += 1,
                Outcome::Unchanged => summary.unchanged_count += 1,
            }
        }

        let loaded_at = now_utc_rfc3339();
        db::set_meta(&tx, LAST_SYNC_META_KEY, &loaded_at)?;
        tx.commit()?;

        self.record_sync(&loaded_at);
        summary.loaded_at = loaded_at;
        tracing::info!(
            source = %summary.source,
            processed = summary.processed_count,
            created = summary.created_count,
            updated = summary.updated_count,
            unchanged = summary.unchanged_count,
            skipped = summary.skipped_count,
            "catalog load finished"
        );
        Ok(summary)
    }

    fn record_sync(&self, loaded_at: &str) {
        let mut guard = match self.last_sync.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(loaded_at.to_string());
    }
}

fn upsert_if_changed(conn: &Connection, exercise: &Exercise) -> Result<Outcome, AppError> {
    let token = fingerprint(exercise)?;
    let outcome = match exercises::get_fingerprint(conn, &exercise.id)? {
        Some(existing) if existing == token => return Ok(Outcome::Unchanged),
        Some(_) => Outcome::Updated,
        None => Outcome::Created,
    };
    exercises::upsert_exercise(conn, exercise, &token)?;
    Ok(outcome)
}

pub(crate) fn fingerprint(exercise: &Exercise) -> Result<String, AppError> {
    let canonical = serde_json::to_vec(exercise)?;
    let digest = Sha256::digest(&canonical);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(out, "{:02x}", byte);
    }
    Ok(out)
}

// --------------------------------------------------
// Shared state for the HTTP layer.
//
// The planner sits behind one async mutex; mutations run on a copy
// which replaces the live planner only after db.json is written.
// -------------------------------------------------

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, FixedOffset, NaiveDate};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{AppError, PlannerError};
use crate::planner::Planner;
use crate::store;

#[derive(Clone)]
pub struct AppState {
    planner: Arc<Mutex<Planner>>,
    db_path: PathBuf,
}

impl AppState {
    pub fn new(planner: Planner, db_path: PathBuf) -> Self {
        AppState {
            planner: Arc::new(Mutex::new(planner)),
            db_path,
        }
    }

    pub async fn read(&self) -> MutexGuard<'_, Planner> {
        self.planner.lock().await
    }

    /// Apply `f` and persist; the live planner is untouched if either fails.
    pub async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Planner) -> Result<T, PlannerError>,
    ) -> Result<T, AppError> {
        let mut live = self.planner.lock().await;
        let mut next = live.clone();
        let out = f(&mut next)?;

        store::save_db(&self.db_path, next.snapshot())?;
        *live = next;
        Ok(out)
    }
}

// Local -> FixedOffset (current system offset)
pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    let local = chrono::Local::now();
    local.fixed_offset()
}

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("invalid id".to_string()))
}

// "YYYY-MM-DD", or today when absent
pub fn parse_day(raw: Option<&str>, now: DateTime<FixedOffset>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AppError::BadRequest("invalid date".to_string())),
        None => Ok(now.date_naive()),
    }
}

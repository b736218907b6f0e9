// --------------------------------------------------
// Suggestions, dashboard summary and data management endpoints.
// -------------------------------------------------

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::DateTime;
use serde::Deserialize;

use crate::dashboard::DaySummary;
use crate::error::AppError;
use crate::planner::{ImportData, ImportSummary, PlannerExport};
use crate::state::{now_fixed_offset, parse_day, AppState};

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    pub now: Option<String>, // RFC3339; overrides the clock
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>, // "YYYY-MM-DD"
}

// -----------------------------
// GET /api/suggestions
// -----------------------------
pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(q): Query<SuggestionsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let now = match q.now.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|_| AppError::BadRequest("invalid now".to_string()))?,
        None => now_fixed_offset(),
    };

    let planner = state.read().await;
    // suggestions borrow from the planner; serialize before the lock drops
    let body = serde_json::to_value(planner.suggestions(now))?;
    Ok(Json(body))
}

// -----------------------------
// GET /api/dashboard
// -----------------------------
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> Result<Json<DaySummary>, AppError> {
    let now = now_fixed_offset();
    let day = parse_day(q.date.as_deref(), now)?;
    let planner = state.read().await;
    Ok(Json(DaySummary::for_day(planner.snapshot(), day, now)))
}

// -----------------------------
// GET /api/data/export
// -----------------------------
pub async fn export_data(State(state): State<AppState>) -> Json<PlannerExport> {
    let now = now_fixed_offset();
    Json(state.read().await.export(now))
}

// -----------------------------
// POST /api/data/import
// -----------------------------
pub async fn import_data(
    State(state): State<AppState>,
    Json(data): Json<ImportData>,
) -> Result<Json<ImportSummary>, AppError> {
    let now = now_fixed_offset();
    let summary = state.mutate(|p| Ok(p.import(data, now))).await?;
    Ok(Json(summary))
}

// -----------------------------
// DELETE /api/data
// -----------------------------
pub async fn clear_data(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state
        .mutate(|p| {
            p.clear();
            Ok(())
        })
        .await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// --------------------------------------------------
// Handles API endpoints related to habits.
//
// Responsibilities:
// - Create / read / update / delete habits
// - Record a completion and report the new streak
// - Habit statistics
// -------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::dashboard::{self, HabitStats};
use crate::error::AppError;
use crate::models::{Habit, HabitDay};
use crate::planner::{HabitPatch, NewHabit};
use crate::state::{now_fixed_offset, parse_day, parse_id, AppState};

#[derive(Debug, Deserialize)]
pub struct HabitsQuery {
    pub date: Option<String>, // "YYYY-MM-DD"
}

// Untagged so both shapes come back as plain JSON arrays
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum HabitsResponse {
    Ranked(Vec<Habit>),
    ForDay(Vec<HabitDay>),
}

#[derive(Debug, Deserialize)]
pub struct CompleteQuery {
    pub date: Option<String>, // defaults to today
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub habit: Habit,
    pub new_record: bool,
    pub message: String,
}

// -----------------------------
// GET /api/habits
// Ranked by current streak, or annotated for ?date=
// -----------------------------
pub async fn get_habits(
    State(state): State<AppState>,
    Query(q): Query<HabitsQuery>,
) -> Result<Json<HabitsResponse>, AppError> {
    let now = now_fixed_offset();
    let planner = state.read().await;

    let resp = match q.date.as_deref() {
        Some(raw) => {
            let day = parse_day(Some(raw), now)?;
            HabitsResponse::ForDay(planner.habits_for_date(day, now))
        }
        None => HabitsResponse::Ranked(dashboard::rank_habits(planner.fresh_habits(now))),
    };
    Ok(Json(resp))
}

// -----------------------------
// GET /api/habits/stats
// -----------------------------
pub async fn get_habit_stats(State(state): State<AppState>) -> Json<HabitStats> {
    let now = now_fixed_offset();
    let planner = state.read().await;
    Json(HabitStats::from_habits(&planner.fresh_habits(now)))
}

// -----------------------------
// POST /api/habits
// -----------------------------
pub async fn create_habit(
    State(state): State<AppState>,
    Json(input): Json<NewHabit>,
) -> Result<Json<Habit>, AppError> {
    let now = now_fixed_offset();
    let habit = state.mutate(|p| p.add_habit(input, now)).await?;
    Ok(Json(habit))
}

// -----------------------------
// PUT /api/habits/:id
// -----------------------------
pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<HabitPatch>,
) -> Result<Json<Habit>, AppError> {
    let id = parse_id(&id)?;
    let habit = state.mutate(|p| p.update_habit(id, patch)).await?;
    Ok(Json(habit))
}

// -----------------------------
// DELETE /api/habits/:id
// -----------------------------
pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    state.mutate(|p| p.delete_habit(id)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/habits/:id/complete
// Marks ?date= (or today) done
// -----------------------------
pub async fn complete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<CompleteQuery>,
) -> Result<Json<CompleteResponse>, AppError> {
    let id = parse_id(&id)?;
    let now = now_fixed_offset();
    let day = parse_day(q.date.as_deref(), now)?;

    let outcome = state.mutate(|p| p.complete_habit(id, day, now)).await?;
    Ok(Json(CompleteResponse {
        message: outcome.message(),
        new_record: outcome.new_record,
        habit: outcome.habit,
    }))
}

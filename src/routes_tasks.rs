// --------------------------------------------------
// Handles API endpoints related to task CRUD operations.
//
// Responsibilities:
// - Create / read / update / delete tasks
// - Move tasks between kanban columns
// - Mark tasks completed
// -------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{Task, TaskStatus};
use crate::planner::{NewTask, TaskPatch};
use crate::state::{now_fixed_offset, parse_day, parse_id, AppState};

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub date: Option<String>, // "YYYY-MM-DD"
}

#[derive(Debug, Serialize)]
pub struct TasksResponse {
    pub date: Option<String>,
    pub now: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
pub struct MoveTaskInput {
    pub status: TaskStatus,
}

// -----------------------------
// GET /api/tasks
// All tasks, or only those due on ?date=
// -----------------------------
pub async fn get_tasks(
    State(state): State<AppState>,
    Query(q): Query<TasksQuery>,
) -> Result<Json<TasksResponse>, AppError> {
    let now = now_fixed_offset();
    let planner = state.read().await;

    let tasks: Vec<Task> = match q.date.as_deref() {
        Some(raw) => {
            let day = parse_day(Some(raw), now)?;
            planner
                .tasks_for_date(day, now.offset())
                .into_iter()
                .cloned()
                .collect()
        }
        None => planner.tasks().to_vec(),
    };

    Ok(Json(TasksResponse {
        date: q.date,
        now: now.to_rfc3339(),
        tasks,
    }))
}

// -----------------------------
// POST /api/tasks
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<Json<Task>, AppError> {
    let now = now_fixed_offset();
    let task = state.mutate(|p| p.add_task(input, now)).await?;
    Ok(Json(task))
}

// -----------------------------
// PUT /api/tasks/:id
// Partial update
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let now = now_fixed_offset();
    let task = state.mutate(|p| p.update_task(id, patch, now)).await?;
    Ok(Json(task))
}

// -----------------------------
// DELETE /api/tasks/:id
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id)?;
    state.mutate(|p| p.delete_task(id)).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// -----------------------------
// POST /api/tasks/:id/move
// -----------------------------
pub async fn move_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MoveTaskInput>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let now = now_fixed_offset();
    let task = state.mutate(|p| p.move_task(id, input.status, now)).await?;
    Ok(Json(task))
}

// -----------------------------
// POST /api/tasks/:id/complete
// -----------------------------
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let id = parse_id(&id)?;
    let now = now_fixed_offset();
    let task = state.mutate(|p| p.complete_task(id, now)).await?;
    Ok(Json(task))
}

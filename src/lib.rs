//! Planora: local-first task and habit planner.
//!
//! Streak calculation and suggestion ranking are pure functions over a
//! snapshot with an injected "now"; the planner, store and routes wrap
//! them in a small Axum service.

pub mod config; // Command-line / environment settings
pub mod dashboard; // Day summary and habit statistics
pub mod error; // Error types and HTTP mapping
pub mod models; // Data structures (Task, Habit, Db, etc.)
pub mod planner; // State container for tasks and habits
pub mod state; // Shared HTTP state
pub mod store; // Persistent storage (load/save db.json)
pub mod streak; // Habit streak calculation
pub mod suggest; // Rule-based suggestion engine

pub mod routes_habits; // HTTP handlers for habit APIs
pub mod routes_insights; // HTTP handlers for suggestions, dashboard, import/export
pub mod routes_tasks; // HTTP handlers for task APIs

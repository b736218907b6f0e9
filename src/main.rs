// Import axum routing utilities and Router
use axum::{
    routing::{get, post, put},
    Router,
};
use clap::Parser;
use tower_http::services::ServeDir; // Used to serve static files (HTML/CSS/JS)

use planora::config::Config;
use planora::planner::Planner;
use planora::state::AppState;
use planora::{routes_habits, routes_insights, routes_tasks, store};

fn router(state: AppState, static_dir: &std::path::Path) -> Router {
    let api = Router::new()
        // tasks
        .route("/tasks", get(routes_tasks::get_tasks).post(routes_tasks::create_task))
        .route("/tasks/:id", put(routes_tasks::update_task).delete(routes_tasks::delete_task))
        .route("/tasks/:id/move", post(routes_tasks::move_task))
        .route("/tasks/:id/complete", post(routes_tasks::complete_task))
        // habits
        .route("/habits", get(routes_habits::get_habits).post(routes_habits::create_habit))
        .route("/habits/stats", get(routes_habits::get_habit_stats))
        .route("/habits/:id", put(routes_habits::update_habit).delete(routes_habits::delete_habit))
        .route("/habits/:id/complete", post(routes_habits::complete_habit))
        // insights
        .route("/suggestions", get(routes_insights::get_suggestions))
        .route("/dashboard", get(routes_insights::get_dashboard))
        // data management
        .route("/data", axum::routing::delete(routes_insights::clear_data))
        .route("/data/export", get(routes_insights::export_data))
        .route("/data/import", post(routes_insights::import_data))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir))
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();

    let db = match store::load_db(&config.db_path) {
        Ok(db) => db,
        Err(e) => {
            log::error!("failed to load {}: {e}", config.db_path.display());
            std::process::exit(1);
        }
    };
    log::info!(
        "loaded {} task(s) and {} habit(s) from {}",
        db.tasks.len(),
        db.habits.len(),
        config.db_path.display()
    );

    let state = AppState::new(Planner::new(db), config.db_path.clone());
    let app = router(state, &config.static_dir);

    log::info!("Server running at http://{}", config.addr);
    log::info!("Static files: {}", config.static_dir.display());
    log::info!("API base:     http://{}/api", config.addr);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("bind {} failed: {e}", config.addr);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("server error: {e}");
        std::process::exit(1);
    }
}

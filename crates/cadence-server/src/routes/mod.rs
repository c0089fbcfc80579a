//! Route table for the REST gateway.

pub mod goals;
pub mod habits;
pub mod rewards;
pub mod schedule;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full router over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Habits
        .route("/habits", get(habits::list).post(habits::create))
        .route("/habits/:id/complete", post(habits::complete))
        .route("/habits/:id/streak", get(habits::streak_report))
        .route("/habits/update/:id", put(habits::update))
        .route("/habits/delete/:id", delete(habits::delete))
        // Goals and milestone sub-resources
        .route("/goals", get(goals::list).post(goals::create))
        .route("/goals/update/:id", put(goals::update))
        .route("/goals/delete/:id", delete(goals::delete))
        .route("/goals/:id/milestones", post(goals::add_milestone))
        .route(
            "/goals/:id/milestones/:milestone_id",
            put(goals::update_milestone).delete(goals::delete_milestone),
        )
        // Daily schedule
        .route("/daily-schedule", get(schedule::get_schedule))
        .route("/daily-schedule/time-block", post(schedule::create_block))
        .route(
            "/daily-schedule/time-block/:id",
            put(schedule::update_block).delete(schedule::delete_block),
        )
        .route(
            "/daily-schedule/time-block/:id/start-timer",
            post(schedule::start_timer),
        )
        .route(
            "/daily-schedule/time-block/:id/stop-timer",
            post(schedule::stop_timer),
        )
        .route("/daily-schedule/time-block/:id/tasks", post(schedule::add_task))
        .route(
            "/daily-schedule/time-block/:id/tasks/:task_id",
            put(schedule::update_task).delete(schedule::delete_task),
        )
        .route("/daily-schedule/weekly-metrics", get(schedule::metrics))
        // Rewards and checkout
        .route("/rewards", get(rewards::list).post(rewards::create))
        .route("/rewards/:id/redeem", post(rewards::redeem))
        .route("/rewards/delete/:id", delete(rewards::delete))
        .route(
            "/stripe/create-checkout-session",
            post(rewards::create_checkout_session),
        )
        // Health check
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

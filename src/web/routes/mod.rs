//! Contains all the routes that this application can handle.

mod api;
mod home;

// re-export errors
pub use api::subscribe::{SubscribeError, SUBSCRIBED_MSG};

use crate::AppState;
use home::home;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .with_state(app_state.clone())
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/subscribe", post(api::subscribe))
        .with_state(app_state)
}

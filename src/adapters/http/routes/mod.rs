pub mod subscription;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .nest("/subscription", subscription::router(app_state))
}

/// Liveness check, unauthenticated.
async fn ping() -> &'static str {
    "system is working"
}

pub mod models;
pub mod pos;
pub mod review;
pub mod user;

// Re-exports
pub use models::*;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let total_reviews = state.reviews.count().await;
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews,
    })
}

/// Full application router with request tracing.
pub fn router(state: AppState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(review::routes())
        .merge(pos::routes())
        .merge(user::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

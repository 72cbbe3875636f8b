use crate::api::models::AppState;
use crate::api::review::handlers::*;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", get(list_reviews).post(create_review))
        .route("/api/reviews/filter", get(filter_reviews))
        .route(
            "/api/reviews/{id}",
            get(get_review).put(put_review).delete(delete_review),
        )
}

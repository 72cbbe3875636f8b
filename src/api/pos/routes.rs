use crate::api::models::AppState;
use crate::api::pos::handlers::*;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/pos", get(list_pos).post(create_pos))
        .route(
            "/api/pos/{id}",
            get(get_pos).put(update_pos).delete(delete_pos),
        )
}

use crate::api::models::*;
use crate::service::CrudService;
use axum::{
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    Json,
};
use tracing::info;

pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let reviews = state.reviews.get_all().await;
    let details = state.reviews.details_all(reviews).await?;
    Ok(Json(details.into_iter().map(ReviewDto::from).collect()))
}

pub async fn get_review(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<ReviewDto>, AppError> {
    let Path(id) = path?;
    let review = state.reviews.get_by_id(id).await?;
    Ok(Json(state.reviews.details(review).await?.into()))
}

pub async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewDto>), AppError> {
    let Json(request) = payload?;

    let created = state.reviews.upsert(request.into_domain(None)).await?;
    info!(id = created.id, pos_id = created.pos_id, "Review created");

    Ok((StatusCode::CREATED, Json(state.reviews.details(created).await?.into())))
}

/// `PUT /api/reviews/{id}`: approves when `user_id` is given, otherwise
/// updates the review from the JSON body.
pub async fn put_review(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    query: Result<Query<ReviewPutQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ReviewDto>, AppError> {
    let Path(id) = path?;
    let Query(query) = query?;

    let review = match query.user_id {
        Some(user_id) => state.reviews.approve(id, user_id).await?,
        None => {
            let request: ReviewRequest = serde_json::from_slice(&body)
                .map_err(|e| AppError::BadRequest(format!("Invalid review body: {}", e)))?;
            state.reviews.upsert(request.into_domain(Some(id))).await?
        }
    };

    Ok(Json(state.reviews.details(review).await?.into()))
}

pub async fn delete_review(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    state.reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn filter_reviews(
    State(state): State<AppState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let Query(query) = query?;
    let reviews = state.reviews.filter(query.pos_id, query.approved).await?;
    info!(
        pos_id = query.pos_id,
        approved = query.approved,
        found = reviews.len(),
        "Filter complete"
    );
    let details = state.reviews.details_all(reviews).await?;
    Ok(Json(details.into_iter().map(ReviewDto::from).collect()))
}

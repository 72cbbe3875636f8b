use crate::api::models::*;
use crate::service::CrudService;
use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    Json,
};

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<UserDto>> {
    let users = state.users.get_all().await;
    Json(users.into_iter().map(UserDto::from).collect())
}

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.users.get_by_id(id).await?.into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), AppError> {
    let Json(request) = payload?;
    let created = state.users.upsert(request.into_domain(None)).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let updated = state.users.upsert(request.into_domain(Some(id))).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

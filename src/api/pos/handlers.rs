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

pub async fn list_pos(State(state): State<AppState>) -> Json<Vec<PosDto>> {
    let pos = state.pos.get_all().await;
    Json(pos.into_iter().map(PosDto::from).collect())
}

pub async fn get_pos(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<PosDto>, AppError> {
    let Path(id) = path?;
    Ok(Json(state.pos.get_by_id(id).await?.into()))
}

pub async fn create_pos(
    State(state): State<AppState>,
    payload: Result<Json<PosRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PosDto>), AppError> {
    let Json(request) = payload?;
    let created = state.pos.upsert(request.into_domain(None)).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn update_pos(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<PosRequest>, JsonRejection>,
) -> Result<Json<PosDto>, AppError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let updated = state.pos.upsert(request.into_domain(Some(id))).await?;
    Ok(Json(updated.into()))
}

pub async fn delete_pos(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    state.pos.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

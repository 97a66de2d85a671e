use crate::error::{AppError, Result};
use crate::model::{CreateLinkResponse, DeleteLinkResponse, LinkResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use waypoint_shortener::{CreateLinkRequest, DeleteLinkRequest, ShortenerError};

pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<CreateLinkResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let created = state.links().create_link(request).await?;
    Ok(Json(created.into()))
}

pub async fn get_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>> {
    let record = state.links().resolve_link(&token).await?;
    Ok(Json(record.into()))
}

pub async fn delete_link_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteLinkResponse>> {
    state
        .links()
        .delete_link(DeleteLinkRequest { token: Some(token) })
        .await?;
    Ok(Json(DeleteLinkResponse {}))
}

/// `DELETE /v1/links` with no token in the path.
pub async fn missing_token_handler() -> AppError {
    ShortenerError::missing_token().into()
}

use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::debug;
use waypoint_core::{ObjectAcl, Token};

/// Serves `GET /{token}` from the mirror bucket.
///
/// Mirrors static website hosting: a public object answers with a permanent
/// redirect, a private one with 403, a missing one with 404.
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let key = Token::new(token.as_str()).map_err(|_| AppError::NotFound(not_found(&token)))?;

    let object = state
        .mirror()
        .head(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(not_found(&token)))?;

    if object.acl != ObjectAcl::PublicRead {
        debug!(key = %key, "redirect object is not public");
        return Err(AppError::Forbidden("Access denied.".to_string()));
    }

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, object.location)],
    )
        .into_response())
}

fn not_found(token: &str) -> String {
    format!("short link not found: {token}")
}

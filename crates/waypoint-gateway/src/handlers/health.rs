use crate::model::HealthResponse;
use axum::Json;

/// Liveness only; backing stores are not checked.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

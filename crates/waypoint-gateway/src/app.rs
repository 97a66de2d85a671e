use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_link_handler, delete_link_handler, get_link_handler, health_handler,
    missing_token_handler, redirect_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .nest(
                "/v1/links",
                Router::new()
                    .route("/", post(create_link_handler).delete(missing_token_handler))
                    .route(
                        "/{token}",
                        get(get_link_handler).delete(delete_link_handler),
                    ),
            )
            .route("/{token}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

use axum::Router;
use axum::routing::get;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{files_handler, get_chat, health_handler, index_handler, post_chat};
use super::server::AppState;
use super::ws::ws_handler;

pub(crate) fn build_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/chat", get(get_chat).post(post_chat))
        .route("/ws", get(ws_handler))
        .route("/files", get(files_handler))
        .route("/health", get(health_handler))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

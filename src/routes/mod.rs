// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::sampler::Sampler;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) sampler: Arc<Sampler>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
    pub(crate) config: AppConfig,
}

pub fn app(sampler: Arc<Sampler>, ws_connections: Arc<AtomicUsize>, config: AppConfig) -> Router {
    let state = AppState {
        sampler,
        ws_connections,
        config,
    };
    Router::new()
        .route("/", get(|| async { "glancer metrics daemon" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/ws/metrics", get(ws::ws_metrics)) // WS /ws/metrics
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

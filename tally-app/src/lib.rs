//! Tally server library: shared state, routes, and the mention pipeline.
//!
//! The binary in `main.rs` wires real collaborators from configuration;
//! tests build the same router around fakes.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod pipeline;

use pipeline::MentionPipeline;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MentionPipeline>,
}

impl AppState {
    pub fn new(pipeline: MentionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

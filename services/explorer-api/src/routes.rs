//! Router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the service router over shared state.
pub fn build_router(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        // Collections
        .route("/api/collections", get(handlers::collections_handler))
        .route(
            "/api/collections/:id/render-options",
            get(handlers::render_options_handler),
        )
        // Layers
        .route(
            "/api/layers",
            get(handlers::list_layers_handler).post(handlers::create_layer_handler),
        )
        .route(
            "/api/layers/:id",
            axum::routing::delete(handlers::delete_layer_handler),
        )
        .route("/api/layers/:id/picker", put(handlers::picker_handler))
        .route("/api/layers/:id/slider", put(handlers::slider_handler))
        .route(
            "/api/layers/:id/visibility",
            put(handlers::visibility_handler),
        )
        .route(
            "/api/layers/:id/tile-source",
            get(handlers::tile_source_handler),
        )
        // Map
        .route("/api/map/sources", get(handlers::map_sources_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

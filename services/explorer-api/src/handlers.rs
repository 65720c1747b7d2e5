//! HTTP request handlers.
//!
//! Sections:
//! - health and Prometheus metrics
//! - collection discovery and render option selection
//! - layer list and time selection
//! - tile sources for single layers and the whole map

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use explorer_common::{
    parse_instant, ExplorerError, LayerConfig, LayerId, TimeseriesType,
};
use layer_pipeline::{
    visible_tile_sources, ForecastDateForm, LayerForm, LayerListStore, LayerStatus,
    RenderOptionSelection, RenderOptionView,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tile_protocol::TileSource;
use tracing::{info, instrument, warn};

use crate::state::AppState;

// ============================================================================
// Errors
// ============================================================================

/// JSON error response carrying the explorer error code.
#[derive(Debug)]
pub struct ApiError(pub ExplorerError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl From<ExplorerError> for ApiError {
    fn from(err: ExplorerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            code: self.0.code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Health Checks and Metrics
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

// ============================================================================
// Collections
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeseries_type: Option<TimeseriesType>,
    pub render_options: Vec<String>,
}

/// GET /api/collections - Loaded collections, sorted by id
pub async fn collections_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<CollectionSummary>> {
    let catalog = state.catalog();
    let summaries = catalog
        .ids()
        .into_iter()
        .filter_map(|id| catalog.get(id))
        .map(|collection| CollectionSummary {
            id: collection.id.clone(),
            display_name: collection.display_name.clone(),
            timeseries_type: collection.timeseries_type,
            render_options: collection
                .render_options()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();
    Json(summaries)
}

/// GET /api/collections/:id/render-options - Option list or unsupported notice
pub async fn render_options_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
) -> ApiResult<Json<RenderOptionView>> {
    let collection = state
        .catalog()
        .get(&collection_id)
        .ok_or(ExplorerError::CollectionNotFound(collection_id))?;
    Ok(Json(RenderOptionSelection::new(&collection).view()))
}

// ============================================================================
// Layers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateLayerRequest {
    pub collection: String,
    #[serde(default)]
    pub render_option: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PickerRequest {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SliderRequest {
    #[serde(default)]
    pub datetime: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// GET /api/layers - The layer list in order
pub async fn list_layers_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<LayerConfig>> {
    Json(state.layers.layers().await)
}

/// POST /api/layers - Submit the render option form
#[instrument(skip(state, request), fields(collection = %request.collection))]
pub async fn create_layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateLayerRequest>,
) -> ApiResult<(StatusCode, Json<LayerConfig>)> {
    let collection = state
        .catalog()
        .get(&request.collection)
        .ok_or_else(|| ExplorerError::CollectionNotFound(request.collection.clone()))?;

    let layer = RenderOptionSelection::new(&collection)
        .submit(&state.layers, request.render_option.as_deref(), Utc::now())
        .await?;
    state.mounted(&layer.id).await;

    Ok((StatusCode::CREATED, Json(layer)))
}

/// PUT /api/layers/:id/picker - Select the forecast run date
#[instrument(skip(state, request))]
pub async fn picker_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
    Json(request): Json<PickerRequest>,
) -> ApiResult<Json<LayerConfig>> {
    let mut form = forecast_form(&state, &LayerId::new(layer_id)).await?;
    let picked = request.date.as_deref().and_then(parse_picker_date);
    Ok(Json(form.on_picker_change(&state.layers, picked).await?))
}

/// PUT /api/layers/:id/slider - Select the valid time
#[instrument(skip(state, request))]
pub async fn slider_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
    Json(request): Json<SliderRequest>,
) -> ApiResult<Json<LayerConfig>> {
    let mut form = forecast_form(&state, &LayerId::new(layer_id)).await?;
    let valid = request
        .datetime
        .as_deref()
        .and_then(|s| parse_instant(s).ok());
    Ok(Json(form.on_slider_change(&state.layers, valid).await?))
}

/// PUT /api/layers/:id/visibility - Show or hide a layer
pub async fn visibility_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
    Json(request): Json<VisibilityRequest>,
) -> ApiResult<Json<LayerConfig>> {
    let id = LayerId::new(layer_id);
    let layer = find_layer(&state, &id).await?.with_visibility(request.visible);
    state.layers.update_layer(layer.clone()).await?;

    if let Some(mounted) = state.mounted_if_any(&id).await {
        mounted.set_visible(request.visible).await;
    }
    Ok(Json(layer))
}

/// DELETE /api/layers/:id - Remove a layer and drop its pipeline
pub async fn delete_layer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = LayerId::new(layer_id);
    state
        .layers
        .remove(&id)
        .await
        .ok_or_else(|| ExplorerError::LayerNotFound(id.to_string()))?;
    state.unmount(&id).await;
    info!(layer_id = %id, "Layer removed");
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Tile Sources
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TileSourceResponse {
    /// Phase with the hidden overlay applied
    pub state: &'static str,
    pub status: LayerStatus,
}

/// GET /api/layers/:id/tile-source - Drive the layer pipeline
#[instrument(skip(state))]
pub async fn tile_source_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_id): Path<String>,
) -> ApiResult<Json<TileSourceResponse>> {
    let id = LayerId::new(layer_id);
    let layer = find_layer(&state, &id).await?;
    let status = state.mounted(&id).await.render(&layer).await;

    Ok(Json(TileSourceResponse {
        state: status.display_state(),
        status,
    }))
}

/// GET /api/map/sources - Tile sources of visible, ready layers
pub async fn map_sources_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<TileSource>> {
    let mut statuses = Vec::new();
    for layer in state.layers.layers().await {
        statuses.push(state.mounted(&layer.id).await.render(&layer).await);
    }
    Json(visible_tile_sources(&statuses))
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_layer(state: &AppState, id: &LayerId) -> Result<LayerConfig, ExplorerError> {
    state
        .layers
        .get(id)
        .await
        .ok_or_else(|| ExplorerError::LayerNotFound(id.to_string()))
}

async fn forecast_form(state: &AppState, id: &LayerId) -> Result<ForecastDateForm, ExplorerError> {
    let layer = find_layer(state, id).await?;
    let collection_id = layer.render_config.collection.clone();

    match LayerForm::for_layer(state.collections.as_ref(), layer, Utc::now()).await? {
        LayerForm::Forecast(form) => Ok(form),
        LayerForm::NotFound | LayerForm::Loading => {
            Err(ExplorerError::CollectionNotFound(collection_id))
        }
        LayerForm::None => {
            warn!(layer_id = %id, collection = %collection_id, "Time selection on a non-forecast layer");
            Err(ExplorerError::CollectionUnsupported(collection_id))
        }
    }
}

/// Picker values keep their offset so the picked calendar date survives.
fn parse_picker_date(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| parse_instant(s).ok().map(|dt| dt.fixed_offset()))
}

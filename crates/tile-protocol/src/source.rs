//! Raster tile sources handed to the map.

use explorer_common::{LayerId, RenderSpec, ZoomRange};
use serde::{Deserialize, Serialize};

use crate::params::encode_render_params;

/// Tile edge length in pixels requested from the tiler.
pub const TILE_SIZE: u32 = 256;

/// `{tiler}?{params}` for a resolved asset. `minmax_zoom` is display-only and not sent.
pub fn compose_tile_url(tiler: &str, spec: &RenderSpec, resolved_url: &str) -> String {
    let (_, params) = spec.split_zoom();
    format!("{}?{}", tiler, encode_render_params(&params, resolved_url))
}

/// A raster source the map can display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    pub id: LayerId,
    pub tiles: Vec<String>,
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
}

impl TileSource {
    /// Build the source for a layer from its render spec and resolved asset URL.
    pub fn new(id: LayerId, tiler: &str, spec: &RenderSpec, resolved_url: &str) -> Self {
        let ZoomRange { min, max } = spec.zoom_range();
        Self {
            id,
            tiles: vec![compose_tile_url(tiler, spec, resolved_url)],
            tile_size: TILE_SIZE,
            min_zoom: min,
            max_zoom: max,
            before_id: None,
        }
    }

    /// Draw this source beneath the layer `before_id`.
    pub fn before(mut self, before_id: impl Into<String>) -> Self {
        self.before_id = Some(before_id.into());
        self
    }
}

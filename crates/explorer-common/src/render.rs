//! Render specifications declared by collections.
//!
//! Field declaration order is significant: the tile URL encoder emits
//! parameters in the order the collection declares them, so a spec is kept
//! as its ordered field map with typed accessors on top.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default zoom bounds when a render spec declares none.
pub const DEFAULT_MIN_ZOOM: u8 = 0;
pub const DEFAULT_MAX_ZOOM: u8 = 22;

/// Display-only field, never sent to the tiler.
pub const MINMAX_ZOOM_FIELD: &str = "minmax_zoom";

/// A named visualization preset (STAC render extension object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderSpec {
    fields: Map<String, Value>,
}

impl RenderSpec {
    /// Declared fields in declaration order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Asset keys; non-string entries are ignored.
    pub fn assets(&self) -> Vec<&str> {
        match self.get("assets") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Zoom bounds for display, defaulting to [0, 22].
    pub fn zoom_range(&self) -> ZoomRange {
        match self.get(MINMAX_ZOOM_FIELD) {
            Some(Value::Array(items)) => {
                let zooms: Vec<u8> = items
                    .iter()
                    .map_while(|v| v.as_u64().and_then(|z| u8::try_from(z).ok()))
                    .collect();
                ZoomRange::from_minmax(Some(&zooms))
            }
            _ => ZoomRange::default(),
        }
    }

    /// Split off the display zoom; the remainder is what gets sent to the tiler.
    pub fn split_zoom(&self) -> (ZoomRange, RenderSpec) {
        // Filtered copy rather than Map::remove, which may reorder the map
        let fields = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != MINMAX_ZOOM_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        (self.zoom_range(), RenderSpec { fields })
    }
}

/// Inclusive zoom range a raster layer is displayed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
        }
    }
}

impl ZoomRange {
    /// Read `minmax_zoom`; missing entries fall back to the defaults.
    pub fn from_minmax(minmax: Option<&[u8]>) -> Self {
        match minmax {
            Some(values) => Self {
                min: values.first().copied().unwrap_or(DEFAULT_MIN_ZOOM),
                max: values.get(1).copied().unwrap_or(DEFAULT_MAX_ZOOM),
            },
            None => Self::default(),
        }
    }
}

//! Per-layer display state.
//!
//! Phases advance `AwaitingCollection -> AwaitingTimeSelection -> Resolving -> Ready`.
//! Visibility and failure are overlays: a hidden layer keeps its phase, and
//! an error replaces the phase until the next selection change.

use explorer_common::{ExplorerError, LayerId};
use serde::Serialize;
use tile_protocol::TileSource;

/// Where a layer is in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LayerState {
    /// Collection lookup has not returned yet
    AwaitingCollection,
    /// Lookup returned nothing for the layer's collection id
    CollectionNotFound { collection: String },
    /// Reference or valid time missing
    AwaitingTimeSelection,
    /// Asset lookup in flight
    Resolving,
    /// Tile source composed
    Ready { source: TileSource },
    /// Resolution or configuration failed; nothing is drawn
    Error { code: String, reason: String },
}

impl LayerState {
    pub fn error(error: &ExplorerError) -> Self {
        LayerState::Error {
            code: error.code().to_string(),
            reason: error.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayerState::AwaitingCollection => "awaiting_collection",
            LayerState::CollectionNotFound { .. } => "collection_not_found",
            LayerState::AwaitingTimeSelection => "awaiting_time_selection",
            LayerState::Resolving => "resolving",
            LayerState::Ready { .. } => "ready",
            LayerState::Error { .. } => "error",
        }
    }
}

/// State of one mounted layer as the map sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStatus {
    pub layer_id: LayerId,
    pub visible: bool,
    #[serde(flatten)]
    pub state: LayerState,
}

impl LayerStatus {
    pub fn new(layer_id: LayerId, visible: bool, state: LayerState) -> Self {
        Self {
            layer_id,
            visible,
            state,
        }
    }

    /// Source to draw, if any. Hidden layers never draw.
    pub fn tile_source(&self) -> Option<&TileSource> {
        match &self.state {
            LayerState::Ready { source } if self.visible => Some(source),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, LayerState::Ready { .. })
    }

    /// State label with the hidden overlay applied.
    pub fn display_state(&self) -> &'static str {
        if self.visible {
            self.state.name()
        } else {
            "hidden"
        }
    }
}

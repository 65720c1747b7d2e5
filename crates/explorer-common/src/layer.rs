//! User-created layer definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::TimeseriesType;
use crate::error::ExplorerResult;
use crate::time::{parse_instant, to_iso_string};

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly added layer.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a layer displays: collection, render option and time selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub collection: String,
    pub variable: String,
    #[serde(default)]
    pub render_option: Option<String>,
    /// Valid time, ISO-8601 UTC
    #[serde(default, alias = "datetimeStr")]
    pub datetime_str: Option<String>,
    /// Forecast reference (model run) time, ISO-8601 UTC
    #[serde(default, alias = "referenceDtStr")]
    pub reference_dt_str: Option<String>,
}

impl RenderConfig {
    /// The render option to draw; older configs only carry `variable`.
    pub fn effective_render_option(&self) -> &str {
        self.render_option.as_deref().unwrap_or(&self.variable)
    }

    /// Both time strings when the selection is complete.
    pub fn time_selection(&self) -> Option<(&str, &str)> {
        match (&self.reference_dt_str, &self.datetime_str) {
            (Some(reference), Some(valid)) => Some((reference.as_str(), valid.as_str())),
            _ => None,
        }
    }

    pub fn valid_time(&self) -> ExplorerResult<Option<DateTime<Utc>>> {
        self.datetime_str.as_deref().map(parse_instant).transpose()
    }

    pub fn reference_time(&self) -> ExplorerResult<Option<DateTime<Utc>>> {
        self.reference_dt_str.as_deref().map(parse_instant).transpose()
    }
}

/// A layer in the layer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub id: LayerId,
    pub name: String,
    #[serde(alias = "isVisible")]
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeseries_type: Option<TimeseriesType>,
    #[serde(alias = "renderConfig")]
    pub render_config: RenderConfig,
}

impl LayerConfig {
    /// Same layer with a new valid time.
    pub fn with_valid_time(&self, valid: &DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.render_config.datetime_str = Some(to_iso_string(valid));
        next
    }

    /// Same layer with both reference and valid time moved to `reference`.
    pub fn with_reference_time(&self, reference: &DateTime<Utc>) -> Self {
        let mut next = self.clone();
        let iso = to_iso_string(reference);
        next.render_config.reference_dt_str = Some(iso.clone());
        next.render_config.datetime_str = Some(iso);
        next
    }

    pub fn with_visibility(&self, visible: bool) -> Self {
        let mut next = self.clone();
        next.is_visible = visible;
        next
    }
}

//! Collection definitions and the catalog they are loaded into.
//!
//! Collections are read from YAML files in `<config_dir>/collections/` and
//! are immutable afterwards. Layers share them by reference.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ExplorerError, ExplorerResult};
use crate::render::RenderSpec;
use crate::time::{most_recent_cycle_utc, resolve_max_date};

/// Whether a collection is a forecast (reference + valid time) or a plain time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeseriesType {
    Forecast,
    Historical,
}

/// STAC spatial/temporal extent; only the temporal part is used here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    #[serde(default)]
    pub temporal: TemporalExtent,
}

/// Temporal extent intervals. Either bound may be open (`null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalExtent {
    #[serde(default)]
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

impl TemporalExtent {
    pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
        self.interval.first().and_then(|i| i[0])
    }

    pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
        self.interval.first().and_then(|i| i[1])
    }
}

/// Naming convention for deterministic asset paths.
///
/// Placeholders: `{date}` (YYYYMMDD), `{cycle:02}`, `{forecast:02}`,
/// `{forecast:03}` and `{product}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingTemplate {
    pub base_url: String,
    pub path_template: String,
    pub product: String,
    pub band: u32,
}

impl Default for NamingTemplate {
    fn default() -> Self {
        // HRRR CONUS surface fields on the Azure open data mirror
        Self {
            base_url: "https://noaahrrr.blob.core.windows.net/hrrr".to_string(),
            path_template: "hrrr.{date}/conus/hrrr.t{cycle:02}z.wrf{product}f{forecast:02}.grib2"
                .to_string(),
            product: "sfc".to_string(),
            band: 9,
        }
    }
}

fn default_asset_key() -> String {
    "grib".to_string()
}

/// Asset resolution strategy selected per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Query the collection's STAC search endpoint.
    Search {
        /// Asset key holding the GRIB file
        #[serde(default = "default_asset_key")]
        asset_key: String,
        /// Synonym pairs replacing the default statistical-method table
        #[serde(default)]
        synonyms: Option<Vec<[String; 2]>>,
    },
    /// Build the file path from a naming template, no network call.
    Naming(NamingTemplate),
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Search {
            asset_key: default_asset_key(),
            synonyms: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// A dataset the explorer can display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default, alias = "displayName")]
    pub display_name: String,
    /// Tile endpoint, e.g. `https://tiler.example.com/cog/tiles/{z}/{x}/{y}`
    pub tiler: String,
    #[serde(default, alias = "stacSearchUrl")]
    pub stac_search_url: String,
    #[serde(default, alias = "collectionStacUrl")]
    pub collection_stac_url: Option<String>,
    #[serde(default)]
    pub extent: Extent,
    #[serde(default, alias = "timeseriesType")]
    pub timeseries_type: Option<TimeseriesType>,
    /// Upper bound hint for collections without a declared extent end
    #[serde(default, alias = "lastAvailableDatetime")]
    pub last_available_datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renders: BTreeMap<String, RenderSpec>,
    #[serde(default, rename = "cube:dimensions", skip_serializing_if = "Option::is_none")]
    pub cube_dimensions: Option<Value>,
    #[serde(default, rename = "cube:variables", skip_serializing_if = "Option::is_none")]
    pub cube_variables: Option<Value>,
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Refuse reference times later than the valid time
    #[serde(default)]
    pub reject_negative_offsets: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Collection {
    /// Parse a collection from YAML.
    pub fn from_yaml(yaml: &str) -> ExplorerResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Render option names in a stable order.
    pub fn render_options(&self) -> Vec<&str> {
        self.renders.keys().map(String::as_str).collect()
    }

    /// Whether this collection declares anything the tiler can render.
    pub fn supports_rendering(&self) -> bool {
        !self.renders.is_empty()
    }

    pub fn render_spec(&self, option: &str) -> ExplorerResult<&RenderSpec> {
        self.renders
            .get(option)
            .ok_or_else(|| ExplorerError::RenderOptionNotFound {
                collection: self.id.clone(),
                option: option.to_string(),
            })
    }

    pub fn is_forecast(&self) -> bool {
        self.timeseries_type == Some(TimeseriesType::Forecast)
    }

    /// Earliest selectable instant; epoch when the extent is open.
    pub fn min_date(&self) -> DateTime<Utc> {
        self.extent.temporal.lower_bound().unwrap_or_default()
    }

    /// Latest selectable instant: declared extent, then hint, then latest cycle.
    pub fn max_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        resolve_max_date(
            self.extent.temporal.upper_bound(),
            self.last_available_datetime,
            || most_recent_cycle_utc(now),
        )
    }
}

/// Read-only set of loaded collections, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CollectionCatalog {
    collections: HashMap<String, Arc<Collection>>,
}

impl CollectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every enabled collection from `<config_dir>/collections/*.yaml`.
    ///
    /// Files that fail to parse are logged and skipped.
    pub fn load_from_dir(config_dir: &Path) -> ExplorerResult<Self> {
        let collections_dir = config_dir.join("collections");
        let mut catalog = Self::new();

        if !collections_dir.exists() {
            warn!(path = %collections_dir.display(), "Collections config directory not found");
            return Ok(catalog);
        }

        for entry in std::fs::read_dir(&collections_dir)? {
            let path = entry?.path();
            if !path
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
            {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(ExplorerError::from)
                .and_then(|content| Collection::from_yaml(&content));

            match parsed {
                Ok(collection) if collection.enabled => {
                    info!(
                        collection = %collection.id,
                        renders = collection.renders.len(),
                        "Loaded collection"
                    );
                    catalog.insert(collection);
                }
                Ok(collection) => {
                    debug!(collection = %collection.id, "Skipping disabled collection");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load collection config");
                }
            }
        }

        info!(count = catalog.len(), "Loaded collections");
        Ok(catalog)
    }

    pub fn insert(&mut self, collection: Collection) {
        self.collections
            .insert(collection.id.clone(), Arc::new(collection));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Collection>> {
        self.collections.get(id).cloned()
    }

    /// Collection ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.collections.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

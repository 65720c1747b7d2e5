//! STAC item search resolution.
//!
//! Sends a CQL-JSON equality filter on `forecast:reference_time` and
//! `datetime` to the collection's search endpoint, then reads the GRIB asset
//! of the first returned item:
//!
//! ```text
//! features[0].assets.grib.href
//! features[0].assets.grib["grib:layers"][option].grib_message
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use explorer_common::{ExplorerError, ExplorerResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tile_protocol::VirtualDataset;
use tracing::{debug, instrument, warn};

use crate::request::ResolutionRequest;
use crate::resolver::AssetResolver;
use crate::synonyms::SynonymTable;

/// Body of a STAC `POST /search` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub collections: Vec<String>,
    pub filter: Value,
    #[serde(rename = "filter-lang")]
    pub filter_lang: String,
}

impl SearchRequest {
    /// Items of one collection matching a reference time and valid time exactly.
    pub fn forecast_item(collection_id: &str, reference_dt_str: &str, datetime_str: &str) -> Self {
        Self {
            collections: vec![collection_id.to_string()],
            filter: json!({
                "and": [
                    { "=": [ { "property": "properties.forecast:reference_time" }, reference_dt_str ] },
                    { "=": [ { "property": "properties.datetime" }, datetime_str ] }
                ]
            }),
            filter_lang: "cql-json".to_string(),
        }
    }
}

/// Search response: a GeoJSON feature collection of STAC items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemCollection {
    #[serde(default)]
    pub features: Vec<Item>,
}

/// The parts of a STAC item the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<String>,
    /// Kept untyped: only the GRIB asset needs to match our shape
    #[serde(default)]
    pub assets: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct GribAsset {
    href: String,
    /// Entries are only checked when looked up
    #[serde(rename = "grib:layers", default)]
    layers: HashMap<String, Value>,
}

/// Band of a `grib:layers` entry: its `grib_message`, as number or string.
fn grib_message(layer: &Value) -> Option<String> {
    match layer.get("grib_message")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

impl ItemCollection {
    /// Locate the band for `render_option` in the first item's GRIB asset.
    ///
    /// Falls back to the synonym-substituted option name when the exact name
    /// is not among the asset's layers.
    pub fn band_reference(
        &self,
        asset_key: &str,
        render_option: &str,
        synonyms: &SynonymTable,
    ) -> ExplorerResult<VirtualDataset> {
        let item = self
            .features
            .first()
            .ok_or_else(|| ExplorerError::AssetNotFound("search returned no features".into()))?;

        let raw = item.assets.get(asset_key).ok_or_else(|| {
            ExplorerError::AssetNotFound(format!("item has no '{}' asset", asset_key))
        })?;

        let asset: GribAsset = serde_json::from_value(raw.clone()).map_err(|e| {
            ExplorerError::AssetNotFound(format!("malformed '{}' asset: {}", asset_key, e))
        })?;

        let layer = match asset.layers.get(render_option) {
            Some(layer) => layer,
            None => {
                let alternate = synonyms.alternate(render_option);
                debug!(
                    render_option = %render_option,
                    alternate = ?alternate,
                    "Render option not in grib:layers, trying synonym"
                );
                alternate
                    .as_deref()
                    .and_then(|key| asset.layers.get(key))
                    .ok_or_else(|| {
                        ExplorerError::AssetNotFound(format!(
                            "no grib layer for '{}'",
                            render_option
                        ))
                    })?
            }
        };

        let band = grib_message(layer).ok_or_else(|| {
            ExplorerError::AssetNotFound(format!("grib layer '{}' has no message", render_option))
        })?;

        Ok(VirtualDataset::new(asset.href, band))
    }
}

/// Resolves assets through the collection's STAC search endpoint.
pub struct SearchResolver {
    client: Client,
    asset_key: String,
    synonyms: SynonymTable,
}

impl SearchResolver {
    pub fn new(client: Client, asset_key: impl Into<String>, synonyms: SynonymTable) -> Self {
        Self {
            client,
            asset_key: asset_key.into(),
            synonyms,
        }
    }

    /// POST the search and decode the response.
    #[instrument(skip(self, search), fields(url = %search_url))]
    pub async fn search(
        &self,
        search_url: &str,
        search: &SearchRequest,
    ) -> ExplorerResult<ItemCollection> {
        if search_url.is_empty() {
            return Err(ExplorerError::AssetLookup(
                "collection declares no search endpoint".into(),
            ));
        }

        let response = self
            .client
            .post(search_url)
            .json(search)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Search request failed");
                ExplorerError::AssetLookup(format!("Failed to fetch data: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Search endpoint returned error status");
            return Err(ExplorerError::AssetLookup(format!(
                "HTTP error! Status: {}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ExplorerError::AssetLookup(format!("Failed to read response: {}", e)))?;

        serde_json::from_slice(&body).map_err(|e| {
            ExplorerError::AssetNotFound(format!("malformed search response: {}", e))
        })
    }
}

#[async_trait]
impl AssetResolver for SearchResolver {
    async fn resolve(&self, request: &ResolutionRequest<'_>) -> ExplorerResult<VirtualDataset> {
        let search = SearchRequest::forecast_item(
            request.collection_id,
            request.reference_dt_str,
            request.datetime_str,
        );

        let items = self
            .search(&request.collection.stac_search_url, &search)
            .await?;

        let dataset = items.band_reference(&self.asset_key, request.render_option, &self.synonyms)?;

        debug!(
            collection = %request.collection_id,
            render_option = %request.render_option,
            href = %dataset.href,
            band = %dataset.band,
            "Resolved asset by search"
        );

        Ok(dataset)
    }

    fn strategy(&self) -> &'static str {
        "search"
    }
}

//! Common test fixtures for explorer tests.
//!
//! Collections mirror the HRRR forecast product in its two resolver
//! flavours; times are a fixed 06z run with a +3h valid time.

use explorer_common::Collection;
use serde_json::{json, Map, Value};

/// Common time values for testing.
pub mod time {
    /// 06z model run on 2024-06-19
    pub const REFERENCE: &str = "2024-06-19T06:00:00Z";

    /// Three hours into the 06z run
    pub const VALID: &str = "2024-06-19T09:00:00Z";

    /// Four hours into the 06z run
    pub const VALID_LATER: &str = "2024-06-19T10:00:00Z";

    /// HRRR file for the 06z run at forecast hour 3
    pub const HRRR_F03_HREF: &str =
        "https://noaahrrr.blob.core.windows.net/hrrr/hrrr.20240619/conus/hrrr.t06z.wrfsfcf03.grib2";
}

/// Common render option names.
pub mod options {
    pub const TEMPERATURE: &str = "temperature_2m";
    pub const ANALYSIS: &str = "analysis";
    pub const POINT_IN_TIME: &str = "point_in_time";
    pub const GUST_INSTANT: &str = "GUST__surface__instantaneous";
    pub const GUST_MAX: &str = "GUST__surface__periodic_max";
}

/// HRRR resolved through a STAC search endpoint.
///
/// `{search_url}` is substituted by [`hrrr_search_collection`].
pub const HRRR_SEARCH_YAML: &str = r#"
id: noaa-hrrr
display_name: "HRRR (search)"
tiler: "https://tiler.example.com/cog/tiles/WebMercatorQuad/{z}/{x}/{y}"
stac_search_url: "{search_url}"
timeseries_type: forecast
extent:
  temporal:
    interval: [["2024-01-01T00:00:00Z", null]]
last_available_datetime: "2024-06-19T06:00:00Z"
renders:
  temperature_2m:
    title: "2 m temperature"
    assets: ["grib"]
    colormap_name: viridis
    rescale: [[230, 320]]
    minmax_zoom: [2, 12]
  analysis:
    assets: ["grib"]
    colormap_name: plasma
  GUST__surface__instantaneous:
    assets: ["grib"]
    colormap_name: turbo
    rescale: [[0, 40]]
resolver:
  strategy: search
"#;

/// HRRR resolved by naming convention, no network access.
pub const HRRR_NAMING_YAML: &str = r#"
id: noaa-hrrr-naming
display_name: "HRRR (naming)"
tiler: "https://tiler.example.com/cog/tiles/WebMercatorQuad/{z}/{x}/{y}"
timeseries_type: forecast
extent:
  temporal:
    interval: [["2024-01-01T00:00:00Z", "2024-06-19T06:00:00Z"]]
renders:
  temperature_2m:
    colormap_name: viridis
    rescale: [[230, 320]]
resolver:
  strategy: naming
  base_url: "https://noaahrrr.blob.core.windows.net/hrrr"
  path_template: "hrrr.{date}/conus/hrrr.t{cycle:02}z.wrf{product}f{forecast:02}.grib2"
  product: sfc
  band: 9
"#;

/// A collection the tiler cannot draw.
pub const NO_RENDERS_YAML: &str = r#"
id: landsat-c2
display_name: "Landsat Collection 2"
tiler: "https://tiler.example.com/cog/tiles/WebMercatorQuad/{z}/{x}/{y}"
timeseries_type: historical
"#;

/// HRRR search collection pointed at `search_url`.
pub fn hrrr_search_collection(search_url: &str) -> Collection {
    Collection::from_yaml(&HRRR_SEARCH_YAML.replace("{search_url}", search_url))
        .expect("HRRR search fixture should parse")
}

/// HRRR naming collection.
pub fn hrrr_naming_collection() -> Collection {
    Collection::from_yaml(HRRR_NAMING_YAML).expect("HRRR naming fixture should parse")
}

/// Collection with no render options.
pub fn no_renders_collection() -> Collection {
    Collection::from_yaml(NO_RENDERS_YAML).expect("no-renders fixture should parse")
}

/// A search response with one item whose `grib` asset carries `layers`.
///
/// Each layer is `(name, grib message number)`.
pub fn search_response(href: &str, layers: &[(&str, u32)]) -> Value {
    let grib_layers: Map<String, Value> = layers
        .iter()
        .map(|(name, message)| (name.to_string(), json!({ "grib_message": message })))
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "id": "hrrr-2024061906-f03",
            "assets": {
                "grib": {
                    "href": href,
                    "type": "application/wmo-GRIB2",
                    "grib:layers": grib_layers
                }
            }
        }]
    })
}

/// A search response with no matching items.
pub fn empty_search_response() -> Value {
    json!({ "type": "FeatureCollection", "features": [] })
}

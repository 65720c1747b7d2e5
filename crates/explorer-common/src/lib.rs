//! Common types and utilities shared across the STAC explorer crates.

pub mod collection;
pub mod duration;
pub mod error;
pub mod layer;
pub mod render;
pub mod slider;
pub mod time;

pub use collection::{
    Collection, CollectionCatalog, NamingTemplate, ResolverConfig, TemporalExtent,
    TimeseriesType,
};
pub use duration::parse_duration_ms;
pub use error::{ExplorerError, ExplorerResult};
pub use layer::{LayerConfig, LayerId, RenderConfig};
pub use render::{RenderSpec, ZoomRange};
pub use slider::SliderWindow;
pub use time::{
    display_date, most_recent_cycle_utc, normalize_local_picker_input_to_utc_midnight,
    parse_instant, picker_display_instant, resolve_max_date, to_iso_string, ModelCycle,
};

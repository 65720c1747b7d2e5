//! Tile server request construction.
//!
//! Turns a collection's render specification plus a resolved asset into the
//! query string a dynamic tiler understands.
//!
//! Supports:
//! - Render parameter encoding (colormap, rescale, bands, ...)
//! - GDAL virtual dataset descriptors for streaming single GRIB bands
//! - Raster tile source assembly with zoom bounds

pub mod params;
pub mod source;
pub mod vrt;

pub use params::encode_render_params;
pub use source::{compose_tile_url, TileSource, TILE_SIZE};
pub use vrt::VirtualDataset;

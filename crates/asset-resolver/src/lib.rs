//! Asset resolution for time-indexed forecast collections.
//!
//! Given a collection, a render option and a (reference time, valid time)
//! pair, resolves the GRIB file and band to hand the tiler as a virtual
//! dataset descriptor.
//!
//! Two strategies are available, selected per collection:
//! - [`NamingResolver`]: builds the file path from a naming template, no I/O
//! - [`SearchResolver`]: queries the collection's STAC search endpoint
//!
//! Each displayed layer owns a [`LayerResolver`], which memoizes results in a
//! bounded [`ResolutionCache`] and drops resolutions that settle after the
//! layer's selection has moved on.

pub mod cache;
pub mod factory;
pub mod naming;
pub mod request;
pub mod resolver;
pub mod search;
pub mod session;
pub mod synonyms;

pub use cache::{CacheStats, ResolutionCache, ResolutionKey, KEY_SEPARATOR};
pub use factory::ResolverFactory;
pub use naming::NamingResolver;
pub use request::ResolutionRequest;
pub use resolver::{resolve_asset, AssetResolver};
pub use search::{ItemCollection, SearchRequest, SearchResolver};
pub use session::{LayerResolver, Resolution};
pub use synonyms::SynonymTable;
pub use tile_protocol::VirtualDataset;

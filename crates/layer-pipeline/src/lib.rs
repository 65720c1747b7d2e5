//! Layer rendering pipeline for the STAC explorer.
//!
//! A [`MountedLayer`] turns a [`LayerConfig`](explorer_common::LayerConfig)
//! into a [`LayerStatus`]: it waits for the collection, waits for a complete
//! time selection, resolves the asset (through its own resolution cache) and
//! composes the tile source the map displays.
//!
//! The collection provider and the layer list are external collaborators,
//! reached through the [`CollectionProvider`] and [`LayerListStore`] traits.
//! The forms in [`forms`] drive layer creation and time-selection updates.

pub mod contracts;
pub mod forms;
pub mod map;
pub mod pipeline;
pub mod state;

pub use contracts::{
    CollectionLookup, CollectionProvider, InMemoryLayerStore, LayerListStore,
    StaticCollectionProvider,
};
pub use forms::{
    ForecastDateForm, LayerForm, RenderOptionSelection, RenderOptionView, INVALID_DATE_MESSAGE,
    SELECT_OPTION_MESSAGE, UNSUPPORTED_NOTICE,
};
pub use map::visible_tile_sources;
pub use pipeline::{LayerPipeline, MountedLayer};
pub use state::{LayerState, LayerStatus};

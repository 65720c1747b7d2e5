//! Application state and shared resources.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use asset_resolver::ResolverFactory;
use explorer_common::{CollectionCatalog, LayerId};
use layer_pipeline::{InMemoryLayerStore, LayerPipeline, MountedLayer, StaticCollectionProvider};
use tokio::sync::RwLock;
use tracing::info;

/// Runtime settings taken from the command line.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding `collections/*.yaml`
    pub config_dir: PathBuf,
    /// Resolution cache entries per mounted layer
    pub cache_capacity: usize,
    /// Timeout for STAC search requests
    pub search_timeout: Duration,
}

/// Shared application state.
pub struct AppState {
    pub collections: Arc<StaticCollectionProvider>,
    pub layers: InMemoryLayerStore,
    pub pipeline: LayerPipeline,
    mounted: RwLock<HashMap<LayerId, Arc<MountedLayer>>>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let catalog = CollectionCatalog::load_from_dir(&config.config_dir).with_context(|| {
            format!("Failed to load collections from {}", config.config_dir.display())
        })?;
        info!(
            collections = catalog.len(),
            config_dir = %config.config_dir.display(),
            "Loaded collection catalog"
        );
        Self::with_catalog(catalog, config)
    }

    pub fn with_catalog(catalog: CollectionCatalog, config: &ServiceConfig) -> Result<Self> {
        let collections = Arc::new(StaticCollectionProvider::new(catalog));
        let resolvers = Arc::new(
            ResolverFactory::new(config.search_timeout).context("Failed to create resolver factory")?,
        );
        let pipeline = LayerPipeline::new(collections.clone(), resolvers, config.cache_capacity);

        Ok(Self {
            collections,
            layers: InMemoryLayerStore::new(),
            pipeline,
            mounted: RwLock::new(HashMap::new()),
        })
    }

    pub fn catalog(&self) -> &CollectionCatalog {
        self.collections.catalog()
    }

    /// The mounted pipeline for a layer, mounting it on first use.
    pub async fn mounted(&self, id: &LayerId) -> Arc<MountedLayer> {
        if let Some(layer) = self.mounted.read().await.get(id) {
            return layer.clone();
        }
        self.mounted
            .write()
            .await
            .entry(id.clone())
            .or_insert_with(|| Arc::new(self.pipeline.mount(id.clone())))
            .clone()
    }

    /// Mounted pipeline if the layer has been rendered before.
    pub async fn mounted_if_any(&self, id: &LayerId) -> Option<Arc<MountedLayer>> {
        self.mounted.read().await.get(id).cloned()
    }

    /// Drop a layer's pipeline and its resolution cache.
    pub async fn unmount(&self, id: &LayerId) -> bool {
        self.mounted.write().await.remove(id).is_some()
    }
}

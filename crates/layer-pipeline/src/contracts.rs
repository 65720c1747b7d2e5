//! Contracts with the collection provider and the layer list store.

use std::sync::Arc;

use async_trait::async_trait;
use explorer_common::{Collection, CollectionCatalog, ExplorerError, ExplorerResult, LayerConfig, LayerId};
use tokio::sync::RwLock;
use tracing::debug;

/// Answer of a collection lookup.
///
/// No collection while not loading means the id is unknown.
#[derive(Debug, Clone, Default)]
pub struct CollectionLookup {
    pub collection: Option<Arc<Collection>>,
    pub is_loading: bool,
}

impl CollectionLookup {
    pub fn loading() -> Self {
        Self {
            collection: None,
            is_loading: true,
        }
    }

    pub fn found(collection: Arc<Collection>) -> Self {
        Self {
            collection: Some(collection),
            is_loading: false,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

/// Source of collection metadata, keyed by collection id.
#[async_trait]
pub trait CollectionProvider: Send + Sync {
    async fn lookup(&self, collection_id: &str) -> CollectionLookup;
}

/// Provider over an already loaded catalog; never reports loading.
pub struct StaticCollectionProvider {
    catalog: CollectionCatalog,
}

impl StaticCollectionProvider {
    pub fn new(catalog: CollectionCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CollectionCatalog {
        &self.catalog
    }
}

#[async_trait]
impl CollectionProvider for StaticCollectionProvider {
    async fn lookup(&self, collection_id: &str) -> CollectionLookup {
        match self.catalog.get(collection_id) {
            Some(collection) => CollectionLookup::found(collection),
            None => CollectionLookup::missing(),
        }
    }
}

/// The layer list. Owns ordering and persistence of layer configs.
#[async_trait]
pub trait LayerListStore: Send + Sync {
    async fn add_layer(&self, config: LayerConfig) -> ExplorerResult<()>;

    /// Replace the layer with the same id.
    async fn update_layer(&self, config: LayerConfig) -> ExplorerResult<()>;

    async fn get(&self, id: &LayerId) -> Option<LayerConfig>;

    /// All layers in list order.
    async fn layers(&self) -> Vec<LayerConfig>;

    async fn remove(&self, id: &LayerId) -> Option<LayerConfig>;
}

/// Process-local layer list in insertion order.
#[derive(Default)]
pub struct InMemoryLayerStore {
    layers: RwLock<Vec<LayerConfig>>,
}

impl InMemoryLayerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayerListStore for InMemoryLayerStore {
    async fn add_layer(&self, config: LayerConfig) -> ExplorerResult<()> {
        let mut layers = self.layers.write().await;
        if layers.iter().any(|layer| layer.id == config.id) {
            return Err(ExplorerError::Config(format!(
                "layer {} already exists",
                config.id
            )));
        }
        debug!(layer_id = %config.id, collection = %config.render_config.collection, "Layer added");
        layers.push(config);
        Ok(())
    }

    async fn update_layer(&self, config: LayerConfig) -> ExplorerResult<()> {
        let mut layers = self.layers.write().await;
        let slot = layers
            .iter_mut()
            .find(|layer| layer.id == config.id)
            .ok_or_else(|| ExplorerError::LayerNotFound(config.id.to_string()))?;
        *slot = config;
        Ok(())
    }

    async fn get(&self, id: &LayerId) -> Option<LayerConfig> {
        self.layers
            .read()
            .await
            .iter()
            .find(|layer| &layer.id == id)
            .cloned()
    }

    async fn layers(&self) -> Vec<LayerConfig> {
        self.layers.read().await.clone()
    }

    async fn remove(&self, id: &LayerId) -> Option<LayerConfig> {
        let mut layers = self.layers.write().await;
        let index = layers.iter().position(|layer| &layer.id == id)?;
        Some(layers.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_common::RenderConfig;

    fn layer(id: &str) -> LayerConfig {
        LayerConfig {
            id: LayerId::new(id),
            name: "noaa-hrrr".to_string(),
            is_visible: true,
            timeseries_type: None,
            render_config: RenderConfig {
                collection: "noaa-hrrr".to_string(),
                variable: "temperature_2m".to_string(),
                render_option: None,
                datetime_str: None,
                reference_dt_str: None,
            },
        }
    }

    #[tokio::test]
    async fn test_store_keeps_order_and_updates_in_place() {
        let store = InMemoryLayerStore::new();
        store.add_layer(layer("a")).await.unwrap();
        store.add_layer(layer("b")).await.unwrap();

        let hidden = layer("a").with_visibility(false);
        store.update_layer(hidden).await.unwrap();

        let layers = store.layers().await;
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].id, LayerId::new("a"));
        assert!(!layers[0].is_visible);
    }

    #[tokio::test]
    async fn test_update_unknown_layer() {
        let store = InMemoryLayerStore::new();
        let result = store.update_layer(layer("ghost")).await;
        assert!(matches!(result, Err(ExplorerError::LayerNotFound(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = InMemoryLayerStore::new();
        store.add_layer(layer("a")).await.unwrap();
        assert!(store.remove(&LayerId::new("a")).await.is_some());
        assert!(store.get(&LayerId::new("a")).await.is_none());
    }

    #[tokio::test]
    async fn test_static_provider() {
        let mut catalog = CollectionCatalog::new();
        catalog.insert(Collection::from_yaml("id: hrrr\ntiler: https://tiler/t\n").unwrap());
        let provider = StaticCollectionProvider::new(catalog);

        let found = provider.lookup("hrrr").await;
        assert!(found.collection.is_some() && !found.is_loading);

        let missing = provider.lookup("gfs").await;
        assert!(missing.collection.is_none() && !missing.is_loading);
    }
}

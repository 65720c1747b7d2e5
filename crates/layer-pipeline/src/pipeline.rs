//! Mounted layers: collection -> time selection -> resolution -> tile source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use asset_resolver::{CacheStats, LayerResolver, Resolution, ResolutionRequest, ResolverFactory};
use explorer_common::{Collection, LayerConfig, LayerId};
use tile_protocol::TileSource;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::contracts::CollectionProvider;
use crate::state::{LayerState, LayerStatus};

/// Shared collaborators for every mounted layer.
#[derive(Clone)]
pub struct LayerPipeline {
    collections: Arc<dyn CollectionProvider>,
    resolvers: Arc<ResolverFactory>,
    cache_capacity: usize,
}

impl LayerPipeline {
    pub fn new(
        collections: Arc<dyn CollectionProvider>,
        resolvers: Arc<ResolverFactory>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            collections,
            resolvers,
            cache_capacity,
        }
    }

    pub fn collections(&self) -> &Arc<dyn CollectionProvider> {
        &self.collections
    }

    /// Mount a layer with an empty resolution cache.
    pub fn mount(&self, id: LayerId) -> MountedLayer {
        debug!(layer_id = %id, "Mounting layer");
        MountedLayer {
            status: RwLock::new(LayerStatus::new(
                id.clone(),
                true,
                LayerState::AwaitingCollection,
            )),
            id,
            pipeline: self.clone(),
            resolver: LayerResolver::new(self.cache_capacity),
            generation: AtomicU64::new(0),
        }
    }
}

/// One displayed layer. Owns its resolution cache; dropping it clears the cache.
pub struct MountedLayer {
    id: LayerId,
    pipeline: LayerPipeline,
    resolver: LayerResolver,
    status: RwLock<LayerStatus>,
    generation: AtomicU64,
}

impl MountedLayer {
    pub fn id(&self) -> &LayerId {
        &self.id
    }

    /// Last published status.
    pub async fn status(&self) -> LayerStatus {
        self.status.read().await.clone()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.resolver.cache_stats().await
    }

    /// Drive the pipeline for `config` and publish the resulting status.
    ///
    /// If a later call starts before this one settles, this call's outcome is
    /// dropped and the later call's status is returned instead.
    pub async fn render(&self, config: &LayerConfig) -> LayerStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let visible = config.is_visible;

        let lookup = self
            .pipeline
            .collections
            .lookup(&config.render_config.collection)
            .await;

        let state = match (lookup.collection, lookup.is_loading) {
            (_, true) => Some(LayerState::AwaitingCollection),
            (None, false) => Some(LayerState::CollectionNotFound {
                collection: config.render_config.collection.clone(),
            }),
            (Some(collection), false) => {
                self.render_collection(&collection, config, generation).await
            }
        };

        match state {
            Some(state) => self.publish(generation, visible, state).await,
            None => self.status().await,
        }
    }

    /// `None` when the resolution was superseded by a newer selection.
    async fn render_collection(
        &self,
        collection: &Collection,
        config: &LayerConfig,
        generation: u64,
    ) -> Option<LayerState> {
        let Some((reference_dt_str, datetime_str)) = config.render_config.time_selection() else {
            return Some(LayerState::AwaitingTimeSelection);
        };

        let render_option = config.render_config.effective_render_option();
        let spec = match collection.render_spec(render_option) {
            Ok(spec) => spec,
            Err(e) => return Some(self.fail(&e, None)),
        };

        let resolver = match self.pipeline.resolvers.resolver_for(collection).await {
            Ok(resolver) => resolver,
            Err(e) => return Some(self.fail(&e, None)),
        };

        let request =
            ResolutionRequest::new(collection, reference_dt_str, datetime_str, render_option);

        // A cache hit goes straight to Ready without showing Resolving
        if !self.resolver.cache().contains(&request.key()).await {
            self.publish(generation, config.is_visible, LayerState::Resolving)
                .await;
        }

        match self.resolver.resolve(resolver.as_ref(), &request).await {
            Resolution::Resolved { dataset, .. } => {
                let source = TileSource::new(
                    self.id.clone(),
                    &collection.tiler,
                    spec,
                    &dataset.descriptor(),
                );
                Some(LayerState::Ready { source })
            }
            Resolution::Superseded { .. } => None,
            Resolution::Failed { key, error } => Some(self.fail(&error, Some(&key.to_string()))),
        }
    }

    fn fail(&self, error: &explorer_common::ExplorerError, key: Option<&str>) -> LayerState {
        warn!(
            layer_id = %self.id,
            key = key.unwrap_or(""),
            error = %error,
            "Layer renders nothing"
        );
        LayerState::error(error)
    }

    /// Store `state` unless a newer render has started since `generation`.
    async fn publish(&self, generation: u64, visible: bool, state: LayerState) -> LayerStatus {
        let mut status = self.status.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            *status = LayerStatus::new(self.id.clone(), visible, state);
        }
        status.clone()
    }

    /// Apply a visibility change without re-resolving.
    pub async fn set_visible(&self, visible: bool) -> LayerStatus {
        let mut status = self.status.write().await;
        status.visible = visible;
        status.clone()
    }
}

impl Drop for MountedLayer {
    fn drop(&mut self) {
        debug!(layer_id = %self.id, "Unmounting layer");
    }
}

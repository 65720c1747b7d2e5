//! Per-layer resolution: cache lookup, resolver call, stale-result filtering.
//!
//! While a lookup is suspended on the network the user may move the slider
//! again. A lookup that settles after its key stopped being the layer's
//! current selection is discarded: it neither fills the cache nor reaches
//! the display.

use std::sync::atomic::{AtomicU64, Ordering};

use explorer_common::ExplorerError;
use metrics::counter;
use tile_protocol::VirtualDataset;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CacheStats, ResolutionCache, ResolutionKey};
use crate::request::ResolutionRequest;
use crate::resolver::AssetResolver;

/// Outcome of a resolution attempt for a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Asset is known for the requested key
    Resolved {
        key: ResolutionKey,
        dataset: VirtualDataset,
        cached: bool,
    },
    /// The layer selected a different key before this lookup settled
    Superseded { key: ResolutionKey },
    /// Lookup failed for the current key
    Failed {
        key: ResolutionKey,
        error: ExplorerError,
    },
}

/// Ticket tying an in-flight lookup to the selection it was started for.
#[derive(Debug, Clone)]
struct Ticket {
    key: ResolutionKey,
    generation: u64,
}

/// Resolution state owned by one displayed layer.
pub struct LayerResolver {
    cache: ResolutionCache,
    current: RwLock<Option<ResolutionKey>>,
    generation: AtomicU64,
}

impl LayerResolver {
    pub fn new(cache_capacity: usize) -> Self {
        Self {
            cache: ResolutionCache::new(cache_capacity),
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Make `key` the current selection and hand out a ticket for it.
    async fn select(&self, key: ResolutionKey) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.write().await = Some(key.clone());
        Ticket { key, generation }
    }

    async fn is_current(&self, ticket: &Ticket) -> bool {
        self.current.read().await.as_ref() == Some(&ticket.key)
    }

    /// Key of the most recent selection.
    pub async fn current_key(&self) -> Option<ResolutionKey> {
        self.current.read().await.clone()
    }

    /// Resolve a request, consulting the cache first.
    ///
    /// A cache hit returns without calling the resolver. On a miss the result
    /// is cached before being returned, unless the selection moved on.
    pub async fn resolve(
        &self,
        resolver: &dyn AssetResolver,
        request: &ResolutionRequest<'_>,
    ) -> Resolution {
        let ticket = self.select(request.key()).await;

        if let Some(dataset) = self.cache.get(&ticket.key).await {
            return Resolution::Resolved {
                key: ticket.key,
                dataset,
                cached: true,
            };
        }

        let result = match request.check_time_order() {
            Ok(()) => resolver.resolve(request).await,
            Err(e) => Err(e),
        };

        if !self.is_current(&ticket).await {
            counter!("stale_resolutions_discarded_total").increment(1);
            debug!(
                key = %ticket.key,
                generation = ticket.generation,
                "Discarding resolution for superseded selection"
            );
            return Resolution::Superseded { key: ticket.key };
        }

        match result {
            Ok(dataset) => {
                counter!("asset_resolutions_total", "strategy" => resolver.strategy())
                    .increment(1);
                self.cache.put(ticket.key.clone(), dataset.clone()).await;
                Resolution::Resolved {
                    key: ticket.key,
                    dataset,
                    cached: false,
                }
            }
            Err(error) => {
                counter!("asset_resolution_failures_total", "kind" => error.code())
                    .increment(1);
                warn!(
                    key = %ticket.key,
                    strategy = resolver.strategy(),
                    error = %error,
                    "Asset resolution failed"
                );
                Resolution::Failed {
                    key: ticket.key,
                    error,
                }
            }
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

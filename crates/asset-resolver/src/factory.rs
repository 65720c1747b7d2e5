//! Builds and shares resolvers per collection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use explorer_common::{Collection, ExplorerError, ExplorerResult, ResolverConfig};
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::info;

use crate::naming::NamingResolver;
use crate::resolver::AssetResolver;
use crate::search::SearchResolver;
use crate::synonyms::SynonymTable;

/// Hands out one resolver per collection, all sharing a single HTTP client.
pub struct ResolverFactory {
    client: Client,
    resolvers: RwLock<HashMap<String, Arc<dyn AssetResolver>>>,
}

impl ResolverFactory {
    /// Create a factory whose search requests give up after `timeout`.
    pub fn new(timeout: Duration) -> ExplorerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .build()
            .map_err(|e| ExplorerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            resolvers: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver configured for `collection`, built on first use.
    pub async fn resolver_for(
        &self,
        collection: &Collection,
    ) -> ExplorerResult<Arc<dyn AssetResolver>> {
        if let Some(resolver) = self.resolvers.read().await.get(&collection.id) {
            return Ok(resolver.clone());
        }

        let resolver = self.build(collection)?;

        let mut resolvers = self.resolvers.write().await;
        let resolver = resolvers
            .entry(collection.id.clone())
            .or_insert(resolver)
            .clone();

        info!(
            collection = %collection.id,
            strategy = resolver.strategy(),
            "Created asset resolver"
        );
        Ok(resolver)
    }

    fn build(&self, collection: &Collection) -> ExplorerResult<Arc<dyn AssetResolver>> {
        let resolver: Arc<dyn AssetResolver> = match &collection.resolver {
            ResolverConfig::Naming(template) => Arc::new(NamingResolver::new(template.clone())),
            ResolverConfig::Search {
                asset_key,
                synonyms,
            } => {
                let synonyms = match synonyms {
                    Some(pairs) => SynonymTable::from_pairs(pairs)?,
                    None => SynonymTable::default(),
                };
                Arc::new(SearchResolver::new(
                    self.client.clone(),
                    asset_key.clone(),
                    synonyms,
                ))
            }
        };
        Ok(resolver)
    }
}

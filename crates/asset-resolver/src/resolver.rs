//! Asset resolver trait.

use async_trait::async_trait;
use explorer_common::{Collection, ExplorerResult};
use tile_protocol::VirtualDataset;

use crate::request::ResolutionRequest;

/// Locates the band of a gridded file that holds a render option at a given time.
///
/// Implementations may suspend on network I/O. Failures are reported as
/// `AssetLookup` (transport/HTTP) or `AssetNotFound` (no matching band).
#[async_trait]
pub trait AssetResolver: Send + Sync {
    /// Resolve the request to a virtual dataset.
    async fn resolve(&self, request: &ResolutionRequest<'_>) -> ExplorerResult<VirtualDataset>;

    /// Short strategy name for logs and metrics.
    fn strategy(&self) -> &'static str;
}

/// Resolve straight to the descriptor string handed to the tiler.
pub async fn resolve_asset(
    resolver: &dyn AssetResolver,
    collection: &Collection,
    collection_id: &str,
    reference_dt_str: &str,
    datetime_str: &str,
    render_option: &str,
) -> ExplorerResult<String> {
    let request = ResolutionRequest {
        collection,
        collection_id,
        reference_dt_str,
        datetime_str,
        render_option,
    };
    request.check_time_order()?;
    Ok(resolver.resolve(&request).await?.descriptor())
}

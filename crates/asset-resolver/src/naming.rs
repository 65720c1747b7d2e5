//! Deterministic asset paths from a naming template.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use explorer_common::{ExplorerResult, NamingTemplate};
use tile_protocol::VirtualDataset;
use tracing::debug;

use crate::request::ResolutionRequest;
use crate::resolver::AssetResolver;

/// Builds the file URL from the reference time and forecast hour. No network call.
#[derive(Debug, Clone, Default)]
pub struct NamingResolver {
    template: NamingTemplate,
}

impl NamingResolver {
    pub fn new(template: NamingTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &NamingTemplate {
        &self.template
    }

    /// Whole hours between the two instants, ignoring sign.
    pub fn forecast_hour(reference: &DateTime<Utc>, valid: &DateTime<Utc>) -> i64 {
        (*valid - *reference).num_hours().abs()
    }

    /// Remote file URL for a model run and forecast hour.
    pub fn file_url(&self, reference: &DateTime<Utc>, forecast_hour: i64) -> String {
        let path = self
            .template
            .path_template
            .replace("{date}", &reference.format("%Y%m%d").to_string())
            .replace("{cycle:02}", &reference.format("%H").to_string())
            .replace("{forecast:02}", &format!("{:02}", forecast_hour))
            .replace("{forecast:03}", &format!("{:03}", forecast_hour))
            .replace("{product}", &self.template.product);

        format!("{}/{}", self.template.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AssetResolver for NamingResolver {
    async fn resolve(&self, request: &ResolutionRequest<'_>) -> ExplorerResult<VirtualDataset> {
        let (reference, valid) = request.instants()?;
        let forecast_hour = Self::forecast_hour(&reference, &valid);
        let href = self.file_url(&reference, forecast_hour);

        debug!(
            collection = %request.collection_id,
            forecast_hour = forecast_hour,
            href = %href,
            "Resolved asset by naming template"
        );

        Ok(VirtualDataset::new(href, self.template.band))
    }

    fn strategy(&self) -> &'static str {
        "naming"
    }
}

//! A single asset resolution request.

use chrono::{DateTime, Utc};
use explorer_common::{parse_instant, Collection, ExplorerError, ExplorerResult};
use tracing::warn;

use crate::cache::ResolutionKey;

/// Everything a resolver needs to locate one band of one file.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    pub collection: &'a Collection,
    pub collection_id: &'a str,
    /// Forecast reference time, ISO-8601 UTC
    pub reference_dt_str: &'a str,
    /// Valid time, ISO-8601 UTC
    pub datetime_str: &'a str,
    pub render_option: &'a str,
}

impl<'a> ResolutionRequest<'a> {
    pub fn new(
        collection: &'a Collection,
        reference_dt_str: &'a str,
        datetime_str: &'a str,
        render_option: &'a str,
    ) -> Self {
        Self {
            collection,
            collection_id: &collection.id,
            reference_dt_str,
            datetime_str,
            render_option,
        }
    }

    /// Cache key for this request.
    pub fn key(&self) -> ResolutionKey {
        ResolutionKey::new(self.datetime_str, self.reference_dt_str, self.render_option)
    }

    /// Parsed (reference, valid) instants.
    pub fn instants(&self) -> ExplorerResult<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((
            parse_instant(self.reference_dt_str)?,
            parse_instant(self.datetime_str)?,
        ))
    }

    /// Check the reference time does not come after the valid time.
    ///
    /// A negative offset is only an error for collections that opt in with
    /// `reject_negative_offsets`; otherwise it is logged and resolved as asked.
    pub fn check_time_order(&self) -> ExplorerResult<()> {
        let (reference, valid) = self.instants()?;
        if reference <= valid {
            return Ok(());
        }

        if self.collection.reject_negative_offsets {
            return Err(ExplorerError::InvalidTimeOrder {
                reference: self.reference_dt_str.to_string(),
                valid: self.datetime_str.to_string(),
            });
        }

        warn!(
            collection = %self.collection_id,
            reference = %self.reference_dt_str,
            valid = %self.datetime_str,
            "Reference time is after valid time, resolving anyway"
        );
        Ok(())
    }
}

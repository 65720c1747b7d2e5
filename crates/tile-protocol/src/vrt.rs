//! GDAL virtual dataset descriptors.
//!
//! `vrt:///vsicurl/{remote-file-url}?bands={band}` tells the tiler's raster
//! engine to stream one band of a remote file over HTTP range requests.

use std::fmt;

use serde::{Deserialize, Serialize};

const VRT_PREFIX: &str = "vrt:///vsicurl/";

/// One band of a remote gridded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualDataset {
    pub href: String,
    /// GRIB message number (1-based band index)
    pub band: String,
}

impl VirtualDataset {
    pub fn new(href: impl Into<String>, band: impl ToString) -> Self {
        Self {
            href: href.into(),
            band: band.to_string(),
        }
    }

    /// Descriptor string passed to the tiler as `url`.
    pub fn descriptor(&self) -> String {
        self.to_string()
    }

    /// Parse a descriptor produced by [`VirtualDataset::descriptor`].
    pub fn parse(descriptor: &str) -> Option<Self> {
        let rest = descriptor.strip_prefix(VRT_PREFIX)?;
        let (href, band) = rest.rsplit_once("?bands=")?;
        if href.is_empty() || band.is_empty() {
            return None;
        }
        Some(Self::new(href, band))
    }
}

impl fmt::Display for VirtualDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}?bands={}", VRT_PREFIX, self.href, self.band)
    }
}

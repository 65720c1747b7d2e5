//! Error types for the STAC explorer crates.
//!
//! No variant is fatal to the layer pipeline: every failure degrades the
//! affected layer to "render nothing" until corrected input arrives.

use thiserror::Error;

/// Result type alias using ExplorerError.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Primary error type for explorer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    // === Input Errors ===
    #[error("Malformed duration: {0}")]
    MalformedDuration(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    MissingSelection(String),

    #[error("Reference time {reference} is after valid time {valid}")]
    InvalidTimeOrder { reference: String, valid: String },

    // === Asset Errors ===
    #[error("Asset lookup failed: {0}")]
    AssetLookup(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // === Collection Errors ===
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection '{0}' cannot be visualized")]
    CollectionUnsupported(String),

    #[error("Render option '{option}' not declared by collection '{collection}'")]
    RenderOptionNotFound { collection: String, option: String },

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExplorerError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ExplorerError::MalformedDuration(_) => "MalformedDuration",
            ExplorerError::InvalidDate(_) => "InvalidDate",
            ExplorerError::MissingSelection(_) => "MissingSelection",
            ExplorerError::InvalidTimeOrder { .. } => "InvalidTimeOrder",
            ExplorerError::AssetLookup(_) => "AssetLookup",
            ExplorerError::AssetNotFound(_) => "AssetNotFound",
            ExplorerError::CollectionNotFound(_) => "CollectionNotFound",
            ExplorerError::CollectionUnsupported(_) => "CollectionUnsupported",
            ExplorerError::RenderOptionNotFound { .. } => "RenderOptionNotFound",
            ExplorerError::LayerNotFound(_) => "LayerNotFound",
            ExplorerError::Config(_) => "Config",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ExplorerError::MalformedDuration(_)
            | ExplorerError::InvalidDate(_)
            | ExplorerError::MissingSelection(_)
            | ExplorerError::InvalidTimeOrder { .. } => 400,

            ExplorerError::AssetNotFound(_)
            | ExplorerError::CollectionNotFound(_)
            | ExplorerError::RenderOptionNotFound { .. }
            | ExplorerError::LayerNotFound(_) => 404,

            ExplorerError::CollectionUnsupported(_) => 422,

            ExplorerError::AssetLookup(_) => 502,

            ExplorerError::Config(_) => 500,
        }
    }

    /// Whether this failure came from the asset resolution step.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            ExplorerError::AssetLookup(_) | ExplorerError::AssetNotFound(_)
        )
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        ExplorerError::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ExplorerError {
    fn from(err: serde_yaml::Error) -> Self {
        ExplorerError::Config(format!("YAML error: {}", err))
    }
}

impl From<std::io::Error> for ExplorerError {
    fn from(err: std::io::Error) -> Self {
        ExplorerError::Config(err.to_string())
    }
}

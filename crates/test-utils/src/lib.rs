//! Shared test utilities for the stac-explorer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Workspace and config path helpers
//! - Collection and search-response fixtures
//! - An in-process mock STAC search endpoint
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, MockSearchServer};
//! ```

pub mod fixtures;
pub mod mock_search;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use mock_search::*;
pub use paths::*;

/// Assert that an `ExplorerResult` failed with the given error variant.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_explorer_err;
///
/// assert_explorer_err!(parse_duration_ms("P"), MalformedDuration);
/// ```
#[macro_export]
macro_rules! assert_explorer_err {
    ($result:expr, $variant:ident) => {{
        match $result {
            Err($crate::ExplorerError::$variant { .. }) => {}
            other => panic!(
                "assertion failed: expected Err({}), got {:?}",
                stringify!($variant),
                other
            ),
        }
    }};
}

#[doc(hidden)]
pub use explorer_common::ExplorerError;

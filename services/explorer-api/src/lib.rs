//! STAC explorer API service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::{AppState, ServiceConfig};

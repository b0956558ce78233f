//! Infrastructure layer: concrete implementations of domain contracts.
//!
//! - [`persistence`] - PostgreSQL repositories
//! - [`resolution`] - Backing-store adapter for the resolution cache

pub mod persistence;
pub mod resolution;

pub use resolution::LinkResolutionStore;

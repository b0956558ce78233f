//! Backing-store contract consumed by the resolution cache.
//!
//! The coordinator is the only caller of this trait: once for each cache
//! miss ([`ResolutionStore::resolve`]) and once per dirty entry on each
//! write-back pass ([`ResolutionStore::apply_visit_delta`]).

use async_trait::async_trait;
use thiserror::Error;

/// A link record as resolved from the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// The store's native numeric key for the link.
    pub link_id: i64,
    /// The redirect destination. The cache treats it as immutable; edits to
    /// a link do not propagate into already-cached entries.
    pub target_url: String,
}

/// Failure to resolve a key on a cache miss.
///
/// All variants surface to the redirect caller as "not found"; the
/// distinction exists for logs and tests.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The key decodes to nothing, or no such link exists.
    #[error("link not found")]
    NotFound,
    /// The store could not be reached or rejected the query.
    #[error("backing store error: {0}")]
    Backend(String),
    /// The cache has been shut down; no further lookups are served.
    #[error("resolver cache is closed")]
    Closed,
}

/// Failure to apply a visit delta during a write-back.
///
/// Never surfaces to lookup callers: a failed flush retains the pending
/// count for retry, except at eviction where the entry is discarded anyway.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Durable key -> record lookup plus atomic additive visit updates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResolutionStore: Send + Sync {
    /// Resolves a public short id to its link record.
    async fn resolve(&self, key: &str) -> Result<ResolvedLink, ResolveError>;

    /// Adds `delta` (always >= 1) to the link's durable visit counter.
    /// Must be additive, never a replacement.
    async fn apply_visit_delta(&self, link_id: i64, delta: u64) -> Result<(), StoreError>;
}

//! Cached link record plus its write-back bookkeeping.

use super::lru::Token;
use super::store::ResolvedLink;

/// One cached link and its accumulated unflushed visit count.
///
/// `link_id` and `target_url` are immutable after creation; only the
/// coordinator mutates `pending_visits`. Every entry has exactly one
/// matching node in the eviction list, addressed by `token`.
#[derive(Debug)]
pub(super) struct Entry {
    pub link_id: i64,
    pub target_url: String,
    pub pending_visits: u64,
    pub token: Token,
}

impl Entry {
    /// A freshly resolved entry. Starts with one pending visit: the miss
    /// that created it is itself a visit.
    pub fn new(resolved: ResolvedLink, token: Token) -> Self {
        Self {
            link_id: resolved.link_id,
            target_url: resolved.target_url,
            pending_visits: 1,
            token,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.pending_visits > 0
    }
}

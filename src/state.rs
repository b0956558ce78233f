//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::cache::ResolverCache;
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::utils::codec::Codec;

/// State shared by all request handlers.
///
/// `cache` is `None` when the resolution cache is disabled by config; the
/// redirect handler then falls back to per-request visit bumps.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<dyn LinkRepository>,
    pub users: Arc<dyn UserRepository>,
    pub cache: Option<ResolverCache>,
    pub codec: Arc<Codec>,
    pub base_url: String,
    pub home_redirect: Option<String>,
}

impl AppState {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        users: Arc<dyn UserRepository>,
        cache: Option<ResolverCache>,
        codec: Arc<Codec>,
        base_url: String,
        home_redirect: Option<String>,
    ) -> Self {
        Self {
            links,
            users,
            cache,
            codec,
            base_url,
            home_redirect,
        }
    }

    /// Renders the public short URL for a link id.
    pub fn short_url(&self, id: i64) -> String {
        format!("{}/{}", self.base_url, self.codec.encode(id))
    }
}

//! Adapter wiring the resolution cache to the codec and link repository.
//!
//! The cache works in public short ids; the database works in numeric link
//! ids. This adapter sits between: a miss decodes the id and fetches the
//! row, a flush forwards the coalesced delta to the additive update.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::store::{ResolutionStore, ResolveError, ResolvedLink, StoreError};
use crate::domain::repositories::LinkRepository;
use crate::utils::codec::Codec;

/// [`ResolutionStore`] backed by the link repository through the codec.
pub struct LinkResolutionStore {
    codec: Arc<Codec>,
    links: Arc<dyn LinkRepository>,
}

impl LinkResolutionStore {
    pub fn new(codec: Arc<Codec>, links: Arc<dyn LinkRepository>) -> Self {
        Self { codec, links }
    }
}

#[async_trait]
impl ResolutionStore for LinkResolutionStore {
    async fn resolve(&self, key: &str) -> Result<ResolvedLink, ResolveError> {
        let id = self.codec.decode(key).ok_or(ResolveError::NotFound)?;

        let link = self
            .links
            .retrieve(id)
            .await
            .map_err(|e| ResolveError::Backend(format!("{e:?}")))?
            .ok_or(ResolveError::NotFound)?;

        Ok(ResolvedLink {
            link_id: link.id,
            target_url: link.url,
        })
    }

    async fn apply_visit_delta(&self, link_id: i64, delta: u64) -> Result<(), StoreError> {
        self.links
            .add_visits(link_id, delta)
            .await
            .map_err(|e| StoreError(format!("{e:?}")))
    }
}

//! Single-writer cache coordinator and its caller-facing handle.
//!
//! The coordinator task owns the entry table and eviction list outright; it
//! is the only code that touches them and the only caller of the backing
//! store. Request handlers talk to it through [`ResolverCache`], a cloneable
//! handle that queues commands on an mpsc channel and waits on a private
//! oneshot reply. Serializing everything through one task gives the same
//! guarantee a mutex would - no interleaved mutation - without callers ever
//! contending on a lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::entry::Entry;
use super::lru::EvictionList;
use super::store::{ResolutionStore, ResolveError};

/// Commands queued by handles ahead of timer ticks.
const COMMAND_QUEUE_DEPTH: usize = 1024;

/// Sizing and timing knobs for the resolution cache.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Maximum number of cached links. The table never holds more once an
    /// insertion's eviction pass has completed.
    pub capacity: usize,
    /// Interval between periodic write-backs of pending visit counts.
    pub sync_interval: Duration,
}

/// Outcome of one write-back pass, returned from `flush` and `close`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries whose pending visits were applied and reset.
    pub flushed: usize,
    /// Entries whose store update failed; their counts are retained for the
    /// next cycle.
    pub failed: usize,
}

/// Point-in-time cache counters for health reporting and tests.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Entries in the table.
    pub entries: usize,
    /// Nodes in the eviction list. Always equals `entries`.
    pub lru_entries: usize,
    /// Entries with unflushed visits.
    pub dirty: usize,
    /// Total unflushed visit count across all entries.
    pub pending_visits: u64,
    pub capacity: usize,
}

enum Command {
    Lookup {
        key: String,
        reply: oneshot::Sender<Result<String, ResolveError>>,
    },
    Flush {
        reply: oneshot::Sender<FlushReport>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    Close {
        reply: oneshot::Sender<FlushReport>,
    },
}

/// Caller-facing handle to the resolution cache.
///
/// Cloneable and cheap; all clones feed the same coordinator task. Dropping
/// an in-flight `lookup` future abandons its reply slot without disturbing
/// coordinator state. After [`ResolverCache::close`] (or once every handle
/// is dropped) the coordinator flushes and stops, and every subsequent
/// operation fails with [`ResolveError::Closed`].
#[derive(Clone)]
pub struct ResolverCache {
    tx: mpsc::Sender<Command>,
}

impl ResolverCache {
    /// Spawns the coordinator task and returns a handle to it.
    pub fn spawn(store: Arc<dyn ResolutionStore>, settings: CacheSettings) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let coordinator = Coordinator {
            capacity: settings.capacity,
            entries: HashMap::new(),
            lru: EvictionList::new(),
            store,
        };
        tokio::spawn(coordinator.run(rx, settings.sync_interval));
        Self { tx }
    }

    /// Resolves a short id to its target URL, counting the visit.
    ///
    /// A hit is served from memory; a miss resolves through the backing
    /// store and caches the result. The returned future completes only
    /// after the entry is in the table, so an immediate second lookup of
    /// the same key is a hit.
    pub async fn lookup(&self, key: &str) -> Result<String, ResolveError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Lookup {
                key: key.to_owned(),
                reply,
            })
            .await
            .map_err(|_| ResolveError::Closed)?;
        rx.await.map_err(|_| ResolveError::Closed)?
    }

    /// Runs one write-back pass now.
    ///
    /// The sync timer drives this in production; tests and diagnostics call
    /// it to avoid waiting on wall-clock time.
    pub async fn flush(&self) -> Result<FlushReport, ResolveError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Flush { reply })
            .await
            .map_err(|_| ResolveError::Closed)?;
        rx.await.map_err(|_| ResolveError::Closed)
    }

    /// Snapshot of the cache counters.
    pub async fn stats(&self) -> Result<CacheStats, ResolveError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Stats { reply })
            .await
            .map_err(|_| ResolveError::Closed)?;
        rx.await.map_err(|_| ResolveError::Closed)
    }

    /// Flushes all pending visits and stops the coordinator.
    ///
    /// Blocks until the final write-back completes and returns its report.
    /// The server awaits this during shutdown, before the process exits;
    /// the cache itself does not outlive the call.
    pub async fn close(&self) -> Result<FlushReport, ResolveError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Close { reply })
            .await
            .map_err(|_| ResolveError::Closed)?;
        rx.await.map_err(|_| ResolveError::Closed)
    }
}

/// Exclusive owner of the entry table and eviction list.
struct Coordinator {
    capacity: usize,
    entries: HashMap<String, Entry>,
    lru: EvictionList,
    store: Arc<dyn ResolutionStore>,
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>, sync_interval: Duration) {
        // First tick one full interval out, not immediately.
        let mut ticker = time::interval_at(time::Instant::now() + sync_interval, sync_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = rx.recv() => match command {
                    Some(Command::Lookup { key, reply }) => {
                        let _ = reply.send(self.lookup(&key).await);
                    }
                    Some(Command::Flush { reply }) => {
                        let _ = reply.send(self.flush_dirty().await);
                    }
                    Some(Command::Stats { reply }) => {
                        let _ = reply.send(self.stats());
                    }
                    Some(Command::Close { reply }) => {
                        let report = self.flush_dirty().await;
                        let _ = reply.send(report);
                        break;
                    }
                    // Every handle dropped: flush what is left and stop.
                    None => {
                        self.flush_dirty().await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.flush_dirty().await;
                }
            }
        }

        debug!("resolver cache stopped");
    }

    /// Serves a hit from the table or resolves a miss through the store.
    ///
    /// A resolved miss is inserted with one pending visit before the reply
    /// is sent, then the capacity pass runs, so the table is never left
    /// over capacity. A failed resolve mutates nothing.
    async fn lookup(&mut self, key: &str) -> Result<String, ResolveError> {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.pending_visits += 1;
            let token = entry.token;
            let url = entry.target_url.clone();
            self.lru.move_to_front(token);
            counter!("cache_hits_total").increment(1);
            return Ok(url);
        }

        counter!("cache_misses_total").increment(1);
        let resolved = self.store.resolve(key).await?;
        let url = resolved.target_url.clone();

        let token = self.lru.push_front(key.to_owned());
        self.entries.insert(key.to_owned(), Entry::new(resolved, token));

        self.evict_over_capacity().await;

        Ok(url)
    }

    /// Applies every dirty entry's pending visits to the store.
    ///
    /// A count is reset only when the store reports success for exactly
    /// that count; on failure the entry keeps its full count and the next
    /// cycle resends it.
    async fn flush_dirty(&mut self) -> FlushReport {
        let mut report = FlushReport::default();

        for (key, entry) in self.entries.iter_mut() {
            if !entry.is_dirty() {
                continue;
            }

            match self
                .store
                .apply_visit_delta(entry.link_id, entry.pending_visits)
                .await
            {
                Ok(()) => {
                    entry.pending_visits = 0;
                    report.flushed += 1;
                }
                Err(err) => {
                    counter!("cache_flush_failures_total").increment(1);
                    warn!(
                        key = %key,
                        link_id = entry.link_id,
                        pending = entry.pending_visits,
                        error = %err,
                        "visit flush failed, retrying next cycle"
                    );
                    report.failed += 1;
                }
            }
        }

        if report.flushed > 0 || report.failed > 0 {
            debug!(flushed = report.flushed, failed = report.failed, "visit flush pass");
        }

        report
    }

    /// Removes least-recently-used entries until the table is within
    /// capacity, flushing each victim's pending visits first.
    ///
    /// The pre-eviction flush is best effort: the entry is discarded either
    /// way, so a store failure here drops the victim's pending visits. This
    /// is the only point where observed visits can be lost; it is logged
    /// distinguishably and counted.
    async fn evict_over_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(victim_key) = self.lru.back().map(str::to_owned) else {
                break;
            };
            let Some(entry) = self.entries.remove(&victim_key) else {
                break;
            };

            if entry.is_dirty()
                && let Err(err) = self
                    .store
                    .apply_visit_delta(entry.link_id, entry.pending_visits)
                    .await
            {
                counter!("cache_evicted_visits_lost_total").increment(entry.pending_visits);
                warn!(
                    key = %victim_key,
                    link_id = entry.link_id,
                    lost = entry.pending_visits,
                    error = %err,
                    "eviction flush failed, visits dropped with entry"
                );
            }

            self.lru.remove(entry.token);
            counter!("cache_evictions_total").increment(1);
            debug!(key = %victim_key, "evicted least recently used entry");
        }
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            lru_entries: self.lru.len(),
            dirty: self.entries.values().filter(|e| e.is_dirty()).count(),
            pending_visits: self.entries.values().map(|e| e.pending_visits).sum(),
            capacity: self.capacity,
        }
    }
}

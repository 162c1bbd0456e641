//! Request-id correlation table backed by a concurrent map and a per-entry
//! oneshot, with a background sweep for entries past their deadline.
//!
//! Each registered call gets a `DashMap` entry (for insert/remove atomicity)
//! holding a `oneshot` sender as its completion slot, and a monotonically
//! increasing id from an atomic counter. A background task wakes on an
//! interval and removes any entry whose own deadline has passed, failing it
//! with a timeout; the caller awaiting that same deadline through
//! `tokio::time::timeout` normally wins the race, so the sweep exists only
//! to clean up entries nobody is actively awaiting anymore.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::AcpError;
use crate::message::RequestId;

/// Tunables for the pending-call table.
#[derive(Debug, Clone)]
pub struct PendingConfig {
    /// Timeout used when a caller does not supply one explicitly.
    pub default_timeout: Duration,
    /// How often the background sweep checks for expired entries nobody
    /// is actively timing out on their own.
    pub cleanup_interval: Duration,
    /// Maximum number of pending requests (0 = unlimited).
    pub max_pending: usize,
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(5),
            max_pending: 0,
        }
    }
}

struct PendingEntry {
    sender: oneshot::Sender<Result<Value, AcpError>>,
    created_at: DateTime<Utc>,
    timeout: Duration,
}

impl PendingEntry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now.signed_duration_since(self.created_at);
        elapsed
            > chrono::TimeDelta::from_std(self.timeout).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Thread-safe monotonically increasing request id generator.
///
/// IDs are rendered as decimal strings formed from a monotonically
/// increasing counter.
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    counter: AtomicU64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> RequestId {
        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        RequestId::new_string(id.to_string())
    }
}

/// Owns every outstanding outbound request for a single [`Session`](crate::session::Session).
pub struct PendingTable {
    entries: Arc<DashMap<RequestId, PendingEntry>>,
    ids: RequestIdGenerator,
    config: PendingConfig,
    cleanup_task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl PendingTable {
    pub fn new(config: PendingConfig) -> Arc<Self> {
        let table = Arc::new(Self {
            entries: Arc::new(DashMap::new()),
            ids: RequestIdGenerator::new(),
            config,
            cleanup_task: tokio::sync::Mutex::new(None),
        });
        table.clone().spawn_cleanup();
        table
    }

    fn spawn_cleanup(self: Arc<Self>) {
        let entries = Arc::clone(&self.entries);
        let interval = self.config.cleanup_interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let now = Utc::now();
                let expired: Vec<RequestId> = entries
                    .iter()
                    .filter(|entry| entry.value().is_expired_at(now))
                    .map(|entry| entry.key().clone())
                    .collect();
                for id in expired {
                    if let Some((_, entry)) = entries.remove(&id) {
                        trace!("sweeping expired pending call {id}");
                        let _ = entry.sender.send(Err(AcpError::Timeout(id)));
                    }
                }
            }
        });
        // best-effort: if construction races a drop, this lock never blocks
        if let Ok(mut guard) = self.cleanup_task.try_lock() {
            *guard = Some(task);
        } else {
            task.abort();
        }
    }

    /// Register a new pending call, returning its id and the receiver side
    /// of its completion slot.
    pub fn register(
        &self,
        timeout: Option<Duration>,
    ) -> Result<(RequestId, oneshot::Receiver<Result<Value, AcpError>>), AcpError> {
        if self.config.max_pending > 0 && self.entries.len() >= self.config.max_pending {
            return Err(AcpError::Internal(
                "maximum pending requests exceeded".to_string(),
            ));
        }

        let (sender, receiver) = oneshot::channel();
        let id = self.ids.next_id();
        let timeout = timeout.unwrap_or(self.config.default_timeout);

        debug!("registering pending call {id} (timeout {timeout:?})");
        self.entries.insert(
            id.clone(),
            PendingEntry {
                sender,
                created_at: Utc::now(),
                timeout,
            },
        );

        Ok((id, receiver))
    }

    /// Complete a pending call with its correlated response. Returns `false`
    /// as a silent no-op if the id is unknown, which is how a reply that
    /// arrives after its call has already timed out gets discarded.
    pub fn complete(&self, id: &RequestId, result: Result<Value, AcpError>) -> bool {
        match self.entries.remove(id) {
            Some((_, entry)) => {
                debug!("correlating response for {id}");
                let _ = entry.sender.send(result);
                true
            }
            None => false,
        }
    }

    /// Fail every still-pending call with [`AcpError::Cancelled`], used when
    /// the owning session transitions to `CLOSING`.
    pub fn cancel_all(&self) {
        let ids: Vec<RequestId> = self.entries.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, entry)) = self.entries.remove(&id) {
                let _ = entry.sender.send(Err(AcpError::Cancelled));
            }
        }
    }

    /// Remove an entry without completing it, used when the caller's own
    /// deadline elapses before the background sweep gets to it.
    pub fn forget(&self, id: &RequestId) {
        self.entries.remove(id);
    }

    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    pub async fn shutdown(&self) {
        if let Some(task) = self.cleanup_task.lock().await.take() {
            task.abort();
        }
        self.cancel_all();
    }
}

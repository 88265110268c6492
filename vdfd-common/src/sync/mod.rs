//! Best-effort mirroring of local writes to a remote document store
//!
//! The local write has already committed by the time anything here runs.
//! A remote failure is logged, recorded as the record's sync state and
//! returned as [`RemoteOutcome::Failed`]; it is never an error to the caller
//! and is never retried unless the caller asks for [`Reconciler::resync_pending`].

mod http;

pub use http::HttpRemoteStore;

use crate::models::{Lead, Route};
use crate::store::{LocalStore, SyncState};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Remote document store: whole-record upserts and deletes keyed by id
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn upsert_lead(&self, lead: &Lead) -> Result<()>;
    async fn delete_lead(&self, id: &str) -> Result<()>;
    async fn upsert_route(&self, route: &Route) -> Result<()>;
    async fn delete_route(&self, id: &str) -> Result<()>;
}

/// What happened to the remote half of a write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteOutcome {
    Synced,
    /// No remote store configured
    Skipped,
    Failed(String),
}

impl RemoteOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, RemoteOutcome::Synced)
    }

    /// Sync state to record for an upsert with this outcome
    fn sync_state(&self) -> SyncState {
        match self {
            RemoteOutcome::Synced => SyncState::Synced,
            RemoteOutcome::Skipped => SyncState::Pending,
            RemoteOutcome::Failed(msg) => SyncState::Failed(msg.clone()),
        }
    }
}

/// Result of a committed write: the local record plus the remote outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome<T> {
    pub record: T,
    pub remote: RemoteOutcome,
}

/// Result of a committed delete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub id: String,
    pub remote: RemoteOutcome,
}

/// Counts from an explicit resync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResyncReport {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl ResyncReport {
    fn record(&mut self, outcome: &RemoteOutcome) {
        self.attempted += 1;
        match outcome {
            RemoteOutcome::Synced => self.synced += 1,
            RemoteOutcome::Failed(_) => self.failed += 1,
            RemoteOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// One-way push from the local store to an optional remote
#[derive(Clone, Default)]
pub struct Reconciler {
    remote: Option<Arc<dyn RemoteStore>>,
}

impl Reconciler {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { remote }
    }

    /// Reconciler that never contacts a remote
    pub fn local_only() -> Self {
        Self { remote: None }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Mirror a committed lead and record the resulting sync state
    pub async fn push_lead(&self, store: &dyn LocalStore, lead: &Lead) -> RemoteOutcome {
        let outcome = match &self.remote {
            None => RemoteOutcome::Skipped,
            Some(remote) => match remote.upsert_lead(lead).await {
                Ok(()) => RemoteOutcome::Synced,
                Err(e) => {
                    warn!("Remote sync of lead {} failed: {}", lead.id, e);
                    RemoteOutcome::Failed(e.to_string())
                }
            },
        };

        if let Err(e) = store.set_lead_sync_state(&lead.id, &outcome.sync_state()).await {
            // The record itself is committed; only the bookkeeping is lost
            warn!("Could not record sync state for lead {}: {}", lead.id, e);
        }
        debug!("Lead {} remote outcome: {:?}", lead.id, outcome);
        outcome
    }

    pub async fn push_route(&self, store: &dyn LocalStore, route: &Route) -> RemoteOutcome {
        let outcome = match &self.remote {
            None => RemoteOutcome::Skipped,
            Some(remote) => match remote.upsert_route(route).await {
                Ok(()) => RemoteOutcome::Synced,
                Err(e) => {
                    warn!("Remote sync of route {} failed: {}", route.id, e);
                    RemoteOutcome::Failed(e.to_string())
                }
            },
        };

        if let Err(e) = store.set_route_sync_state(&route.id, &outcome.sync_state()).await {
            warn!("Could not record sync state for route {}: {}", route.id, e);
        }
        debug!("Route {} remote outcome: {:?}", route.id, outcome);
        outcome
    }

    /// Mirror a committed lead delete
    pub async fn delete_lead(&self, id: &str) -> RemoteOutcome {
        match &self.remote {
            None => RemoteOutcome::Skipped,
            Some(remote) => match remote.delete_lead(id).await {
                Ok(()) => RemoteOutcome::Synced,
                Err(e) => {
                    warn!("Remote delete of lead {} failed: {}", id, e);
                    RemoteOutcome::Failed(e.to_string())
                }
            },
        }
    }

    pub async fn delete_route(&self, id: &str) -> RemoteOutcome {
        match &self.remote {
            None => RemoteOutcome::Skipped,
            Some(remote) => match remote.delete_route(id).await {
                Ok(()) => RemoteOutcome::Synced,
                Err(e) => {
                    warn!("Remote delete of route {} failed: {}", id, e);
                    RemoteOutcome::Failed(e.to_string())
                }
            },
        }
    }

    /// Push every record of `user_id` that is not yet synced
    ///
    /// Only runs when a caller asks for it. Deletes whose remote half failed
    /// are not replayed: no tombstones are kept locally.
    pub async fn resync_pending(&self, store: &dyn LocalStore, user_id: &str) -> Result<ResyncReport> {
        let mut report = ResyncReport::default();
        if self.remote.is_none() {
            debug!("Resync requested for {} with no remote configured", user_id);
            return Ok(report);
        }

        for lead in store.pending_leads(user_id).await? {
            let outcome = self.push_lead(store, &lead).await;
            report.record(&outcome);
        }
        for route in store.pending_routes(user_id).await? {
            let outcome = self.push_route(store, &route).await;
            report.record(&outcome);
        }

        info!(
            "Resync for {}: {} attempted, {} synced, {} failed",
            user_id, report.attempted, report.synced, report.failed
        );
        Ok(report)
    }
}

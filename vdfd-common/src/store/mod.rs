//! Local-first record store
//!
//! The on-device store is the source of truth for reads. Writes are
//! committed once the local store accepts them; remote mirroring happens
//! afterwards in [`crate::sync`].
//!
//! Components receive an explicit `Arc<dyn LocalStore>` handle. Production
//! uses [`SqliteStore`]; tests substitute [`MemoryStore`].

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{Lead, Route};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote mirror state of a locally committed record
///
/// `Failed` is never retried by the system itself; for the rest of the
/// application it behaves exactly like `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "error")]
pub enum SyncState {
    /// Committed locally, remote push not (yet) successful
    Pending,
    /// Latest local write is mirrored remotely
    Synced,
    /// Latest remote push failed with this message
    Failed(String),
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Pending => "pending",
            SyncState::Synced => "synced",
            SyncState::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SyncState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Rebuild from stored columns; unknown states read as pending
    pub fn from_parts(state: &str, error: Option<String>) -> Self {
        match state {
            "synced" => SyncState::Synced,
            "failed" => SyncState::Failed(error.unwrap_or_default()),
            _ => SyncState::Pending,
        }
    }
}

/// Durable keyed storage of leads and routes
///
/// `put_*` replaces the whole record and resets its sync state to
/// `Pending`. Listing is by owner, newest `created_at` first.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn put_lead(&self, lead: &Lead) -> Result<()>;
    async fn get_lead(&self, id: &str) -> Result<Option<Lead>>;
    async fn leads_for_user(&self, user_id: &str) -> Result<Vec<Lead>>;
    /// Returns whether a record existed
    async fn delete_lead(&self, id: &str) -> Result<bool>;
    async fn set_lead_sync_state(&self, id: &str, state: &SyncState) -> Result<()>;
    async fn lead_sync_state(&self, id: &str) -> Result<Option<SyncState>>;
    /// Owner's leads not in `Synced` state, oldest first
    async fn pending_leads(&self, user_id: &str) -> Result<Vec<Lead>>;

    async fn put_route(&self, route: &Route) -> Result<()>;
    async fn get_route(&self, id: &str) -> Result<Option<Route>>;
    async fn routes_for_user(&self, user_id: &str) -> Result<Vec<Route>>;
    async fn delete_route(&self, id: &str) -> Result<bool>;
    async fn set_route_sync_state(&self, id: &str, state: &SyncState) -> Result<()>;
    async fn route_sync_state(&self, id: &str) -> Result<Option<SyncState>>;
    async fn pending_routes(&self, user_id: &str) -> Result<Vec<Route>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_state_parts_roundtrip() {
        for state in [
            SyncState::Pending,
            SyncState::Synced,
            SyncState::Failed("timeout".to_string()),
        ] {
            let rebuilt = SyncState::from_parts(state.as_str(), state.error().map(str::to_string));
            assert_eq!(rebuilt, state);
        }
        assert_eq!(SyncState::from_parts("garbage", None), SyncState::Pending);
    }

    #[test]
    fn test_sync_state_json() {
        let json = serde_json::to_value(SyncState::Failed("offline".into())).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["error"], "offline");
        let json = serde_json::to_value(SyncState::Synced).unwrap();
        assert_eq!(json["state"], "synced");
    }
}

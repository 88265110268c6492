//! In-memory local store for tests and ephemeral sessions

use super::{LocalStore, SyncState};
use crate::models::{Lead, Route};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<T> {
    record: T,
    sync: SyncState,
}

/// Same contract as `SqliteStore`, nothing persisted
#[derive(Default)]
pub struct MemoryStore {
    leads: RwLock<HashMap<String, Entry<Lead>>>,
    routes: RwLock<HashMap<String, Entry<Route>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first, id as tie-break (matches the SQL ordering)
fn newest_first<T>(records: &mut [T], key: impl Fn(&T) -> (i64, &str)) {
    records.sort_by(|a, b| {
        let (a_created, a_id) = key(a);
        let (b_created, b_id) = key(b);
        b_created.cmp(&a_created).then_with(|| a_id.cmp(b_id))
    });
}

fn oldest_first<T>(records: &mut [T], key: impl Fn(&T) -> (i64, &str)) {
    records.sort_by(|a, b| key(a).cmp(&key(b)));
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn put_lead(&self, lead: &Lead) -> Result<()> {
        self.leads.write().await.insert(
            lead.id.clone(),
            Entry {
                record: lead.clone(),
                sync: SyncState::Pending,
            },
        );
        Ok(())
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>> {
        Ok(self.leads.read().await.get(id).map(|e| e.record.clone()))
    }

    async fn leads_for_user(&self, user_id: &str) -> Result<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .read()
            .await
            .values()
            .filter(|e| e.record.user_id == user_id)
            .map(|e| e.record.clone())
            .collect();
        newest_first(&mut leads, |l| (l.created_at, l.id.as_str()));
        Ok(leads)
    }

    async fn delete_lead(&self, id: &str) -> Result<bool> {
        Ok(self.leads.write().await.remove(id).is_some())
    }

    async fn set_lead_sync_state(&self, id: &str, state: &SyncState) -> Result<()> {
        if let Some(entry) = self.leads.write().await.get_mut(id) {
            entry.sync = state.clone();
        }
        Ok(())
    }

    async fn lead_sync_state(&self, id: &str) -> Result<Option<SyncState>> {
        Ok(self.leads.read().await.get(id).map(|e| e.sync.clone()))
    }

    async fn pending_leads(&self, user_id: &str) -> Result<Vec<Lead>> {
        let mut leads: Vec<Lead> = self
            .leads
            .read()
            .await
            .values()
            .filter(|e| e.record.user_id == user_id && e.sync != SyncState::Synced)
            .map(|e| e.record.clone())
            .collect();
        oldest_first(&mut leads, |l| (l.created_at, l.id.as_str()));
        Ok(leads)
    }

    async fn put_route(&self, route: &Route) -> Result<()> {
        self.routes.write().await.insert(
            route.id.clone(),
            Entry {
                record: route.clone(),
                sync: SyncState::Pending,
            },
        );
        Ok(())
    }

    async fn get_route(&self, id: &str) -> Result<Option<Route>> {
        Ok(self.routes.read().await.get(id).map(|e| e.record.clone()))
    }

    async fn routes_for_user(&self, user_id: &str) -> Result<Vec<Route>> {
        let mut routes: Vec<Route> = self
            .routes
            .read()
            .await
            .values()
            .filter(|e| e.record.user_id == user_id)
            .map(|e| e.record.clone())
            .collect();
        newest_first(&mut routes, |r| (r.created_at, r.id.as_str()));
        Ok(routes)
    }

    async fn delete_route(&self, id: &str) -> Result<bool> {
        Ok(self.routes.write().await.remove(id).is_some())
    }

    async fn set_route_sync_state(&self, id: &str, state: &SyncState) -> Result<()> {
        if let Some(entry) = self.routes.write().await.get_mut(id) {
            entry.sync = state.clone();
        }
        Ok(())
    }

    async fn route_sync_state(&self, id: &str) -> Result<Option<SyncState>> {
        Ok(self.routes.read().await.get(id).map(|e| e.sync.clone()))
    }

    async fn pending_routes(&self, user_id: &str) -> Result<Vec<Route>> {
        let mut routes: Vec<Route> = self
            .routes
            .read()
            .await
            .values()
            .filter(|e| e.record.user_id == user_id && e.sync != SyncState::Synced)
            .map(|e| e.record.clone())
            .collect();
        oldest_first(&mut routes, |r| (r.created_at, r.id.as_str()));
        Ok(routes)
    }
}

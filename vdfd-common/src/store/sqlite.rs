//! SQLite-backed local store

use super::{LocalStore, SyncState};
use crate::db::{self, SyncedTable};
use crate::models::{Lead, Route};
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;

/// On-device store over an sqlx SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap a pool whose schema is already created
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database file
    pub async fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(db::init_database(db_path).await?))
    }

    /// Throwaway in-memory database
    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(db::init_memory_database().await?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LocalStore for SqliteStore {
    async fn put_lead(&self, lead: &Lead) -> Result<()> {
        db::leads::upsert_lead(&self.pool, lead).await
    }

    async fn get_lead(&self, id: &str) -> Result<Option<Lead>> {
        db::leads::get_lead(&self.pool, id).await
    }

    async fn leads_for_user(&self, user_id: &str) -> Result<Vec<Lead>> {
        db::leads::list_leads_for_user(&self.pool, user_id).await
    }

    async fn delete_lead(&self, id: &str) -> Result<bool> {
        db::leads::delete_lead(&self.pool, id).await
    }

    async fn set_lead_sync_state(&self, id: &str, state: &SyncState) -> Result<()> {
        db::sync_state::set_sync_state(&self.pool, SyncedTable::Leads, id, state).await?;
        Ok(())
    }

    async fn lead_sync_state(&self, id: &str) -> Result<Option<SyncState>> {
        db::sync_state::get_sync_state(&self.pool, SyncedTable::Leads, id).await
    }

    async fn pending_leads(&self, user_id: &str) -> Result<Vec<Lead>> {
        db::leads::list_unsynced_leads(&self.pool, user_id).await
    }

    async fn put_route(&self, route: &Route) -> Result<()> {
        db::routes::upsert_route(&self.pool, route).await
    }

    async fn get_route(&self, id: &str) -> Result<Option<Route>> {
        db::routes::get_route(&self.pool, id).await
    }

    async fn routes_for_user(&self, user_id: &str) -> Result<Vec<Route>> {
        db::routes::list_routes_for_user(&self.pool, user_id).await
    }

    async fn delete_route(&self, id: &str) -> Result<bool> {
        db::routes::delete_route(&self.pool, id).await
    }

    async fn set_route_sync_state(&self, id: &str, state: &SyncState) -> Result<()> {
        db::sync_state::set_sync_state(&self.pool, SyncedTable::Routes, id, state).await?;
        Ok(())
    }

    async fn route_sync_state(&self, id: &str) -> Result<Option<SyncState>> {
        db::sync_state::get_sync_state(&self.pool, SyncedTable::Routes, id).await
    }

    async fn pending_routes(&self, user_id: &str) -> Result<Vec<Route>> {
        db::routes::list_unsynced_routes(&self.pool, user_id).await
    }
}

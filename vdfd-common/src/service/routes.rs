//! Route lifecycle: plan, edit, optimize, delete

use super::require_user;
use crate::geo::Coordinate;
use crate::models::{check_coordinate, Route, RouteInput, RouteUpdate};
use crate::store::LocalStore;
use crate::sync::{DeleteOutcome, Reconciler, WriteOutcome};
use crate::{time, uuid_utils, Error, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct RouteService {
    store: Arc<dyn LocalStore>,
    sync: Reconciler,
}

impl RouteService {
    pub fn new(store: Arc<dyn LocalStore>, sync: Reconciler) -> Self {
        Self { store, sync }
    }

    pub async fn create_route(&self, user_id: &str, input: RouteInput) -> Result<WriteOutcome<Route>> {
        require_user(user_id)?;
        let route = Route::new(
            uuid_utils::new_record_id(),
            user_id.to_string(),
            input,
            time::now_millis(),
        )?;
        self.commit(route).await
    }

    pub async fn get_route(&self, user_id: &str, id: &str) -> Result<Route> {
        require_user(user_id)?;
        match self.store.get_route(id).await? {
            Some(route) if route.user_id == user_id => Ok(route),
            _ => Err(Error::NotFound(format!("route {}", id))),
        }
    }

    pub async fn list_routes(&self, user_id: &str) -> Result<Vec<Route>> {
        require_user(user_id)?;
        self.store.routes_for_user(user_id).await
    }

    pub async fn update_route(
        &self,
        user_id: &str,
        id: &str,
        update: RouteUpdate,
    ) -> Result<WriteOutcome<Route>> {
        let current = self.get_route(user_id, id).await?;
        let route = current.merged(update, time::now_millis())?;
        self.commit(route).await
    }

    /// Reorder stops with the greedy nearest-neighbor heuristic
    pub async fn optimize_route(
        &self,
        user_id: &str,
        id: &str,
        start_point: Option<Coordinate>,
    ) -> Result<WriteOutcome<Route>> {
        if let Some(start) = start_point {
            check_coordinate(start.lat, start.lng)?;
        }
        let current = self.get_route(user_id, id).await?;
        let route = current.optimized(start_point, time::now_millis());
        info!(
            "Optimized route {}: {:.1} -> {:.1} miles",
            id, current.stats.total_distance, route.stats.total_distance
        );
        self.commit(route).await
    }

    pub async fn delete_route(&self, user_id: &str, id: &str) -> Result<DeleteOutcome> {
        self.get_route(user_id, id).await?;

        if !self.store.delete_route(id).await? {
            return Err(Error::NotFound(format!("route {}", id)));
        }
        info!("Deleted route {}", id);

        let remote = self.sync.delete_route(id).await;
        Ok(DeleteOutcome {
            id: id.to_string(),
            remote,
        })
    }

    async fn commit(&self, route: Route) -> Result<WriteOutcome<Route>> {
        self.store.put_route(&route).await?;
        info!("Saved route {} ({} stops)", route.id, route.waypoints.len());

        let remote = self.sync.push_route(self.store.as_ref(), &route).await;
        Ok(WriteOutcome {
            record: route,
            remote,
        })
    }
}

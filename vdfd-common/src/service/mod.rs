//! Lead and route operations
//!
//! Every write follows the same sequence: validate, commit to the local
//! store (failure is returned as an error and nothing is committed), then
//! push to the remote through the [`Reconciler`] (failure is reported in the
//! returned outcome only).

mod leads;
mod routes;

pub use leads::LeadService;
pub use routes::RouteService;

use crate::store::LocalStore;
use crate::sync::Reconciler;
use crate::{Error, Result};
use std::sync::Arc;

/// Build both services over one store and reconciler
pub fn services(store: Arc<dyn LocalStore>, sync: Reconciler) -> (LeadService, RouteService) {
    (
        LeadService::new(store.clone(), sync.clone()),
        RouteService::new(store, sync),
    )
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::InvalidInput("user id must not be empty".to_string()));
    }
    Ok(())
}

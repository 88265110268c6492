//! HTTP document store client
//!
//! Records live at `{base_url}/{collection}/{id}`; an upsert is a `PUT` of
//! the whole record as JSON, a delete is a `DELETE`. A missing document on
//! delete counts as success.

use super::RemoteStore;
use crate::config::RemoteConfig;
use crate::models::{Lead, Route};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;

const LEADS_COLLECTION: &str = "leads";
const ROUTES_COLLECTION: &str = "routes";

pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_token.clone())
    }

    /// Document URL for a record
    pub fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn put<T: Serialize + Sync>(&self, collection: &str, id: &str, record: &T) -> Result<()> {
        let request = self.client.put(self.document_url(collection, id)).json(record);
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote(format!(
                "PUT {}/{} returned {}",
                collection, id, status
            )));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let request = self.client.delete(self.document_url(collection, id));
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(Error::Remote(format!(
                "DELETE {}/{} returned {}",
                collection, id, status
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn upsert_lead(&self, lead: &Lead) -> Result<()> {
        self.put(LEADS_COLLECTION, &lead.id, lead).await
    }

    async fn delete_lead(&self, id: &str) -> Result<()> {
        self.delete(LEADS_COLLECTION, id).await
    }

    async fn upsert_route(&self, route: &Route) -> Result<()> {
        self.put(ROUTES_COLLECTION, &route.id, route).await
    }

    async fn delete_route(&self, id: &str) -> Result<()> {
        self.delete(ROUTES_COLLECTION, id).await
    }
}

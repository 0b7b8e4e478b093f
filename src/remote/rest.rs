//! PostgREST-style HTTP implementation of [`RemoteStore`].
//!
//! Talks to a Supabase-compatible REST endpoint: rows live under
//! `{base}/rest/v1/{table}` and are filtered with `id=eq.{id}` query
//! parameters. Authentication uses the service `apikey` header plus a
//! bearer token.

use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use crate::config::SyncConfig;

use super::{RemoteError, RemoteStore, Table};

/// Sentinel for "delete everything": PostgREST refuses an unfiltered
/// delete, so wipe requests filter on a nil UUID no row can match.
const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Debug, Clone)]
pub struct RestRemote {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestRemote {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Builds a remote from config, or `None` when sync is not configured.
    pub fn from_config(config: &SyncConfig) -> Option<Self> {
        let server_url = config.server_url.as_ref()?;
        let api_key = config.api_key.as_ref()?;
        Some(Self::new(server_url, api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(
        &self,
        table: Table,
        builder: RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(RemoteError::Status {
                table: table.name(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

impl RemoteStore for RestRemote {
    async fn select_all(&self, table: Table) -> Result<Vec<Value>, RemoteError> {
        let url = format!("{}?select=*", self.table_url(table));
        let response = self.send(table, self.request(Method::GET, &url)).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(table.name(), e.to_string()))
    }

    async fn select_by_id(&self, table: Table, id: &str) -> Result<Option<Value>, RemoteError> {
        let url = format!("{}?select=*&id=eq.{}", self.table_url(table), id);
        let response = self.send(table, self.request(Method::GET, &url)).await?;
        let mut rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(table.name(), e.to_string()))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<(), RemoteError> {
        let url = self.table_url(table);
        self.send(table, self.request(Method::POST, &url).json(&rows))
            .await?;
        Ok(())
    }

    async fn upsert(&self, table: Table, row: Value) -> Result<(), RemoteError> {
        let url = self.table_url(table);
        let builder = self
            .request(Method::POST, &url)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&vec![row]);
        self.send(table, builder).await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, changes: Value) -> Result<(), RemoteError> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        self.send(table, self.request(Method::PATCH, &url).json(&changes))
            .await?;
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}?id=eq.{}", self.table_url(table), id);
        self.send(table, self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> Result<(), RemoteError> {
        let url = format!("{}?id=neq.{}", self.table_url(table), NIL_UUID);
        self.send(table, self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}

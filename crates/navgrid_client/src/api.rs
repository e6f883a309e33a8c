//! HTTP client for the navgrid API.

use crate::error::ClientError;
use navgrid_core::models::{Link, NavigationDocument, Settings};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Standard `{success, data?, message?}` response envelope.
///
/// Missing `data`/`message` fields deserialize as `None` without a
/// `Default` bound on `T`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// Thin typed wrapper over the HTTP API.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    /// A client for the API at `base_url`, optionally carrying an admin
    /// credential for mutating endpoints.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token,
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            // Exact value, no scheme prefix.
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let envelope: Envelope<T> = response.json().await?;
        if !status.is_success() || !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| "no error message".to_string());
            return Err(ClientError::Rejected(format!("{status}: {message}")));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Rejected(format!("{status}: response carried no data")))
    }

    /// Probe `/api/health`; any transport or status failure reads as down.
    pub async fn health(&self) -> bool {
        match self.http.get(self.url("/api/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!("health probe failed: {err}");
                false
            }
        }
    }

    /// Fetch the remote navigation document.
    pub async fn fetch_navigation(&self) -> Result<NavigationDocument, ClientError> {
        let response = self.http.get(self.url("/api/navigation")).send().await?;
        Self::decode(response).await
    }

    /// Fetch the remote settings.
    pub async fn fetch_settings(&self) -> Result<Settings, ClientError> {
        let response = self.http.get(self.url("/api/settings")).send().await?;
        Self::decode(response).await
    }

    /// Replace the remote links sequence (auth required).
    pub async fn push_navigation(&self, links: &[Link]) -> Result<(), ClientError> {
        let response = self
            .with_auth(self.http.post(self.url("/api/navigation")))
            .json(&json!({ "links": links }))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Rejected(status.to_string()))
        }
    }

    /// Merge `settings` into the remote settings (auth required).
    pub async fn push_settings(&self, settings: &Settings) -> Result<Settings, ClientError> {
        let response = self
            .with_auth(self.http.post(self.url("/api/settings")))
            .json(settings)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Append a link remotely. The server generates its own id; callers
    /// that care about id agreement must follow with a full-sequence push.
    pub async fn add_link(&self, link: &Link) -> Result<Link, ClientError> {
        let response = self
            .http
            .post(self.url("/api/links"))
            .json(link)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Delete a link remotely.
    ///
    /// # Returns
    /// `Ok(true)` when deleted, `Ok(false)` when the id was already gone
    /// (a tolerated outcome for sync), an error otherwise.
    pub async fn delete_link(&self, id: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/links/{id}")))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(ClientError::Rejected(status.to_string()))
        }
    }
}

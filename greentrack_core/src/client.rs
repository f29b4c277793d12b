//! HTTP request client for the GreenTrack backend.
//!
//! One thin wrapper owns the connection pool, attaches the bearer token,
//! and normalizes every failure into [`crate::Error`]. It holds a copy of
//! the token handed to it at construction and never touches session state.

use crate::error::{Error, ErrorBody, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client for a single backend base URL
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://host/api/v1`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach (or clear) the bearer token used for authenticated calls
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.get(self.url(path))).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.execute(self.http.get(self.url(path)).query(query))
            .await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(self.http.post(self.url(path)).json(body))
            .await
    }

    /// POST without a body (logout, suggestions, email verification)
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.post(self.url(path))).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(self.http.put(self.url(path)).json(body)).await
    }

    /// DELETE, expecting `204 No Content` on success
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute_raw(self.http.delete(self.url(path))).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let value = self.execute_raw(builder).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send the request and resolve the response into JSON.
    ///
    /// A non-JSON content type means the backend is unreachable or
    /// misconfigured (a proxy error page, a misrouted path) and is reported
    /// as a transport failure, before the status is even considered. The
    /// one exception is a bodyless `204`, which maps to JSON null.
    async fn execute_raw(&self, builder: RequestBuilder) -> Result<serde_json::Value> {
        let response = self.apply_auth(builder).send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::Value::Null);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("application/json") {
            tracing::warn!(
                "Expected JSON from {} but got {:?} (status {})",
                response.url(),
                content_type,
                status
            );
            return Err(Error::UnexpectedContentType { content_type });
        }

        let value: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            let (message, body) = ErrorBody::resolve(status.as_u16(), reason, &value);
            tracing::debug!("Backend rejected request ({}): {}", status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
                body,
            });
        }

        Ok(value)
    }
}

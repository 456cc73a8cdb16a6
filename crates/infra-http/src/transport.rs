//! Shared HTTP transport
//!
//! Every request goes through here: URL building with percent-encoded segments,
//! bearer token, request id header, status mapping.

use crate::auth::TokenProvider;
use crate::error::{HttpError, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

pub struct ApiTransport {
    http: Client,
    base: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiTransport {
    pub fn new(base_url: &str, timeout: Duration, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mbyte-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base, tokens })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL followed by `segments`, each percent-encoded
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.request(Method::GET, url).await).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST an urlencoded form, returns the raw body text
    pub async fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<String> {
        let request = self.request(Method::POST, url).await.form(form);
        let response = self.send(request).await?;
        Ok(response.text().await?)
    }

    /// GET for a streamed body
    pub async fn get_stream(&self, url: Url) -> Result<Response> {
        self.send(self.request(Method::GET, url).await).await
    }

    async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %method, url = %url, request_id = %request_id, "HTTP request");

        let mut request = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(token) = self.tokens.token().await {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), url = %url, "HTTP request failed");
        Err(HttpError::Status {
            code: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn build(base: &str) -> Result<ApiTransport> {
        ApiTransport::new(
            base,
            Duration::from_secs(5),
            Arc::new(StaticTokenProvider::anonymous()),
        )
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let transport = build("https://manager.example/").unwrap();
        let url = transport.url(&["api", "apps", "my app/1", "procs"]).unwrap();
        assert_eq!(url.as_str(), "https://manager.example/api/apps/my%20app%2F1/procs");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let transport = build("https://host.example/mbyte/").unwrap();
        let url = transport.url(&["api", "nodes"]).unwrap();
        assert_eq!(url.as_str(), "https://host.example/mbyte/api/nodes");

        let transport = build("https://host.example/mbyte").unwrap();
        let url = transport.url(&["api", "nodes"]).unwrap();
        assert_eq!(url.as_str(), "https://host.example/mbyte/api/nodes");
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        assert!(matches!(build("not a url"), Err(HttpError::InvalidUrl(_))));
        assert!(matches!(build("mailto:me@example.com"), Err(HttpError::InvalidUrl(_))));
    }
}

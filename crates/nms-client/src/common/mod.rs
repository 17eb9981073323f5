//! Common utilities for the NMS API client
//!
//! Provides the authenticated request helper shared by every endpoint.

use crate::error::NmsError;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

/// HTTP client wrapper bound to one NMS base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Get authorization header value
    pub fn auth_header(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Percent-encode a single path segment (gNB name, UPF hostname, slice name)
    pub fn encode_segment(segment: &str) -> String {
        urlencoding::encode(segment).into_owned()
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - 2xx with a JSON body
    /// * `Ok(None)` - 2xx with an empty or non-JSON body
    /// * `Err(NmsError)` - transport failure or non-2xx status
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<Option<serde_json::Value>, NmsError> {
        let url = self.build_url(path);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            request = request.header("Authorization", Self::auth_header(token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(NmsError::Http)?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(NmsError::Authentication(format!(
                "{} {} rejected: {}",
                method, path, status
            )));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(NmsError::NotFound(format!("{} {}", method, path)));
        }
        if !status.is_success() {
            return Err(NmsError::Api(format!(
                "{} {} failed: {} - {}",
                method,
                path,
                status,
                text.chars().take(500).collect::<String>()
            )));
        }

        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                debug!("{} {} returned a non-JSON body: {}", method, path, e);
                Ok(None)
            }
        }
    }
}

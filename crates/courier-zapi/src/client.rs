// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the provider API.
//!
//! [`ZapiClient`] owns URL construction, authentication, and response
//! decoding. It knows nothing about which endpoints exist; see
//! [`crate::candidates`] for that.

use std::time::Duration;

use courier_config::model::ProviderConfig;
use courier_core::CourierError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

/// Authenticated HTTP client bound to one provider base URL.
#[derive(Debug, Clone)]
pub struct ZapiClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

/// A completed request that returned a non-2xx status.
#[derive(Debug)]
pub struct RemoteFailure {
    pub status: Option<StatusCode>,
    pub body: Option<Value>,
    pub message: String,
}

impl ZapiClient {
    /// Build a client from provider configuration.
    ///
    /// `Authorization: Bearer <token>` is attached only when a token is set.
    pub fn new(config: &ProviderConfig) -> Result<Self, CourierError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                CourierError::Config(format!("invalid provider token header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CourierError::adapter(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL and append `query` pairs.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CourierError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| CourierError::Config(format!("invalid provider URL `{raw}`: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Send one request and decode the body.
    ///
    /// Transport failures and non-2xx responses are both reported as
    /// [`RemoteFailure`]; the status and body are filled in when a response
    /// was received.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, RemoteFailure> {
        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| RemoteFailure {
            status: None,
            body: None,
            message: format!("{method} {} failed: {e}", url.path()),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| RemoteFailure {
            status: Some(status),
            body: None,
            message: format!("{method} {} body unreadable: {e}", url.path()),
        })?;
        let parsed = parse_body(&text);
        debug!(%method, path = url.path(), status = status.as_u16(), "provider response");

        if status.is_success() {
            Ok(parsed)
        } else {
            Err(RemoteFailure {
                status: Some(status),
                message: format!("{method} {} returned {status}", url.path()),
                body: Some(parsed),
            })
        }
    }

    /// `HEAD` the base URL with the short health timeout.
    pub async fn ping(&self) -> Result<StatusCode, reqwest::Error> {
        self.client
            .head(&self.base_url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map(|r| r.status())
    }
}

/// Empty → `null`, JSON → value, anything else → the raw text as a string.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

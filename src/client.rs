use crate::error::{ComponentsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const LINK_CHECK_TIMEOUT_SECS: u64 = 10;
const ERROR_EXCERPT_CHARS: usize = 512;

/// Shared JSON transport for the vendor clients: fixed timeout, default
/// headers, full body read, non-2xx mapped to [`ComponentsError::Api`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    pub(crate) vendor: &'static str,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) client: reqwest::Client,
    error_message: fn(&str) -> String,
}

impl HttpClient {
    pub(crate) fn new(
        vendor: &'static str,
        base_url: String,
        timeout: Option<u64>,
        headers: HeaderMap,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let timeout = Duration::from_secs(timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            vendor,
            base_url,
            timeout,
            client,
            error_message: excerpt,
        })
    }

    /// Replaces how a failed response body is turned into an error message.
    pub(crate) fn with_error_message(mut self, format: fn(&str) -> String) -> Self {
        self.error_message = format;
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub(crate) async fn send<T>(&self, request: reqwest::RequestBuilder, endpoint: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                vendor = self.vendor,
                endpoint,
                status = status.as_u16(),
                "vendor request failed"
            );
            return Err(ComponentsError::Api {
                status,
                message: (self.error_message)(&body),
            });
        }

        debug!(vendor = self.vendor, endpoint, %body, "vendor response");
        Ok(serde_json::from_str(&body)?)
    }

    /// HEAD probe for an externally supplied URL. Only a 200 counts as live.
    pub async fn check_link_availability(&self, url: &str) -> bool {
        let result = self
            .client
            .head(url)
            .timeout(Duration::from_secs(LINK_CHECK_TIMEOUT_SECS))
            .send()
            .await;

        match result {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(err) => {
                debug!(vendor = self.vendor, %url, error = %err, "link check failed");
                false
            }
        }
    }
}

pub(crate) fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if !token.is_empty() {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ComponentsError::Other(format!("invalid API token: {e}")))?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Resolves an API key from the options, falling back to the environment.
pub(crate) fn resolve_api_key(explicit: Option<String>, env: &'static str) -> Result<String> {
    explicit
        .filter(|key| !key.is_empty())
        .or_else(|| std::env::var(env).ok().filter(|key| !key.is_empty()))
        .ok_or(ComponentsError::MissingApiKey { env })
}

pub(crate) fn excerpt(body: &str) -> String {
    if body.chars().count() <= ERROR_EXCERPT_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(ERROR_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

//! HTTP transport for the GitHub REST API
//!
//! Wraps `reqwest` with a per-request timeout and turns every failure into a
//! classified [`SourceControlProviderError`]:
//!
//! - transport failures (timeouts, refused connections) go through
//!   [`SourceControlProviderError::from_error`] with a [`TransportError`] cause;
//! - non-2xx responses go through
//!   [`SourceControlProviderError::from_http_status`] with the decoded
//!   [`GitHubApiErrorBody`] as cause.

use crate::error::{ProviderResult, SourceControlProviderError};
use crate::logging::{log_debug, log_error, log_warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";

/// Failure to get any HTTP response at all
///
/// The URL is kept out of the message so repository names never reach the
/// message classifier.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request aborted after {timeout_ms}ms timeout")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("network error sending request")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("network error reading response body")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not build request")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Outcome of a best-effort call that failed
#[derive(Debug, Error)]
pub enum BestEffortError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Credentials(String),
}

/// Error payload GitHub returns with non-2xx responses
#[derive(Debug, Clone, Deserialize, Error)]
#[error("{message}")]
pub struct GitHubApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

impl GitHubApiErrorBody {
    /// Decode an error body, keeping the raw text when it is not GitHub's JSON shape.
    pub fn parse(raw: &str, status: reqwest::StatusCode) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| {
            let message = if raw.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                raw.trim().to_string()
            };
            Self {
                message,
                documentation_url: None,
            }
        })
    }
}

/// GitHub REST client with GitHub's default headers and a bounded request time
#[derive(Debug, Clone)]
pub struct GitHubHttpClient {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
}

impl GitHubHttpClient {
    pub fn new(api_url: &str, user_agent: &str, timeout: Duration) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .default_headers(Self::default_headers(user_agent)?)
            .build()
            .map_err(|e| {
                SourceControlProviderError::permanent(format!(
                    "Failed to build GitHub HTTP client: {e}"
                ))
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Headers sent with every GitHub request
    pub fn default_headers(user_agent: &str) -> ProviderResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            HeaderName::from_static(GITHUB_API_VERSION_HEADER),
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| {
                SourceControlProviderError::permanent(format!("Invalid user agent: {e}"))
            })?,
        );

        Ok(headers)
    }

    /// `Authorization: Bearer <token>`, marked sensitive so it is never logged
    pub fn bearer_header(token: &SecretString) -> ProviderResult<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| {
                SourceControlProviderError::permanent(format!("Invalid GitHub token format: {e}"))
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        operation: &str,
    ) -> ProviderResult<T> {
        let response = self
            .send::<()>(Method::GET, path, token, None, operation)
            .await?;
        self.parse_json_response(response, operation).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
        operation: &str,
    ) -> ProviderResult<T> {
        let response = self
            .send(Method::POST, path, token, Some(body), operation)
            .await?;
        self.parse_json_response(response, operation).await
    }

    /// POST whose failure is only reported to the caller, never classified
    pub async fn post_best_effort<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<(), BestEffortError> {
        let url = self.url(path);
        let authorization = Self::bearer_header(token)
            .map_err(|e| BestEffortError::Credentials(e.message().to_string()))?;
        let request = self
            .client
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .json(body);

        let response = self.fetch_with_timeout(request, &url).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let raw_body = self.read_body(response, &url).await.unwrap_or_default();
        Err(BestEffortError::Status {
            status: status.as_u16(),
            message: GitHubApiErrorBody::parse(&raw_body, status).message,
        })
    }

    /// Send a request, giving up once the configured timeout elapses.
    pub async fn fetch_with_timeout(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Response, TransportError> {
        match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(source)) if source.is_timeout() => Err(self.timeout_error(url)),
            Ok(Err(source)) if source.is_builder() => Err(TransportError::Request {
                url: url.to_string(),
                source,
            }),
            Ok(Err(source)) => Err(TransportError::Network {
                url: url.to_string(),
                source,
            }),
            Err(_elapsed) => Err(self.timeout_error(url)),
        }
    }

    fn timeout_error(&self, url: &str) -> TransportError {
        TransportError::Timeout {
            url: url.to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: &SecretString,
        body: Option<&B>,
        operation: &str,
    ) -> ProviderResult<Response> {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, Self::bearer_header(token)?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = self.fetch_with_timeout(request, &url).await.map_err(|e| {
            let error = SourceControlProviderError::from_error(
                format!("{operation} failed"),
                Some(Box::new(e)),
            );
            log_error!(
                provider = "github",
                method = %method,
                url = %url,
                error_type = %error.error_type(),
                error = %error,
                "GitHub request failed before a response was received"
            );
            error
        })?;

        log_debug!(
            provider = "github",
            method = %method,
            url = %url,
            status = response.status().as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "GitHub request completed"
        );

        if !response.status().is_success() {
            return Err(self.handle_error_response(response, operation).await);
        }

        Ok(response)
    }

    /// Turn a non-2xx response into a status-classified error
    async fn handle_error_response(
        &self,
        response: Response,
        operation: &str,
    ) -> SourceControlProviderError {
        let status = response.status();
        let retry_after = header_string(response.headers(), "retry-after");
        let rate_limit_remaining = header_string(response.headers(), "x-ratelimit-remaining");
        let url = response.url().to_string();
        let raw_body = self.read_body(response, &url).await.unwrap_or_default();

        let body = GitHubApiErrorBody::parse(&raw_body, status);
        let error = SourceControlProviderError::from_http_status(
            format!("{operation} failed: {}", body.message),
            Some(Box::new(body)),
            status.as_u16(),
        );

        if error.is_transient() {
            log_warn!(
                provider = "github",
                status = status.as_u16(),
                retry_after = ?retry_after,
                rate_limit_remaining = ?rate_limit_remaining,
                error = %error,
                "GitHub API returned a transient error"
            );
        } else {
            log_error!(
                provider = "github",
                status = status.as_u16(),
                error = %error,
                "GitHub API returned a permanent error"
            );
        }

        error
    }

    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &str,
    ) -> ProviderResult<T> {
        let url = response.url().to_string();
        let raw_body = self.read_body(response, &url).await.map_err(|e| {
            SourceControlProviderError::from_error(
                format!("{operation} failed: could not read response"),
                Some(Box::new(e)),
            )
        })?;

        serde_json::from_str(&raw_body).map_err(|e| {
            log_error!(
                provider = "github",
                url = %url,
                error = %e,
                "Failed to parse GitHub response"
            );
            SourceControlProviderError::from_error(
                format!("{operation} failed: invalid response body"),
                Some(Box::new(e)),
            )
        })
    }

    async fn read_body(&self, response: Response, url: &str) -> Result<String, TransportError> {
        match tokio::time::timeout(self.timeout, response.text()).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(source)) if source.is_timeout() => Err(self.timeout_error(url)),
            Ok(Err(source)) => Err(TransportError::Body {
                url: url.to_string(),
                source,
            }),
            Err(_elapsed) => Err(self.timeout_error(url)),
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

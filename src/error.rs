//! Error types for source-control provider operations.
//!
//! Every failed remote call surfaces as a [`SourceControlProviderError`]
//! carrying exactly one [`ErrorType`]:
//!
//! - **Transient**: retrying may succeed (rate limiting, gateway failures,
//!   network blips, timeouts).
//! - **Permanent**: retrying is pointless until configuration or credentials
//!   change.
//!
//! The crate never retries on its own. Callers read the classification and
//! decide.
//!
//! # Classification rules
//!
//! | Input available | Rule |
//! |-----------------|------|
//! | HTTP status | `429`, `502`, `503`, `504` are transient, anything else permanent |
//! | Underlying error only | lower-cased message contains a [`TRANSIENT_MESSAGE_PATTERNS`] entry |
//! | Nothing to inspect | permanent |
//!
//! A status, when present, always wins over the message.
//!
//! # Example
//!
//! ```rust
//! use source_control_provider::{ErrorType, SourceControlProviderError};
//!
//! let err = SourceControlProviderError::from_http_status(
//!     "GitHub repository fetch failed",
//!     None,
//!     503,
//! );
//! assert_eq!(err.error_type(), ErrorType::Transient);
//! assert!(err.is_retryable());
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed underlying error kept as the `source()` of a classified error.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Convenient result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, SourceControlProviderError>;

/// HTTP statuses that indicate a retryable condition.
pub const TRANSIENT_STATUS_CODES: &[u16] = &[429, 502, 503, 504];

/// Lower-case substrings that mark an error message as a transient network
/// condition. Matched with a plain `contains`, not on word boundaries.
pub const TRANSIENT_MESSAGE_PATTERNS: &[&str] = &[
    "fetch failed",
    "etimedout",
    "econnreset",
    "econnrefused",
    "network",
    "timeout",
    "aborted",
];

/// Binary retry classification for a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    /// Safe to retry with backoff.
    Transient,
    /// Requires a configuration or credential change.
    Permanent,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Transient => "transient",
            ErrorType::Permanent => "permanent",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a failure by HTTP status alone.
pub fn classify_status(status: u16) -> ErrorType {
    if TRANSIENT_STATUS_CODES.contains(&status) {
        ErrorType::Transient
    } else {
        ErrorType::Permanent
    }
}

/// Classify a failure by the text of its error message.
pub fn classify_message(message: &str) -> ErrorType {
    let lowered = message.to_lowercase();
    if TRANSIENT_MESSAGE_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        ErrorType::Transient
    } else {
        ErrorType::Permanent
    }
}

/// Classify an underlying error that arrived without an HTTP status.
///
/// The error's own message and the message of every error in its `source()`
/// chain are inspected. With no cause there is nothing to inspect and the
/// result is [`ErrorType::Permanent`].
pub fn classify_cause(cause: Option<&(dyn StdError + 'static)>) -> ErrorType {
    match cause {
        Some(err) => classify_message(&error_chain_message(err)),
        None => ErrorType::Permanent,
    }
}

/// Join an error and its sources into a single `a: b: c` message.
pub(crate) fn error_chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}

/// A failed source-control provider call, tagged with its retry classification.
///
/// Fields are private so the classification cannot change after construction.
#[derive(Debug, Error)]
pub struct SourceControlProviderError {
    message: String,
    error_type: ErrorType,
    http_status: Option<u16>,
    #[source]
    cause: Option<BoxError>,
}

impl fmt::Display for SourceControlProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(
                f,
                "{} (HTTP {}, {})",
                self.message, status, self.error_type
            ),
            None => write!(f, "{} ({})", self.message, self.error_type),
        }
    }
}

impl SourceControlProviderError {
    /// Build an error for a failure that produced an HTTP response.
    ///
    /// Only the status decides the classification; the cause is kept for
    /// diagnostics even when its message would suggest otherwise.
    pub fn from_http_status(
        message: impl Into<String>,
        cause: Option<BoxError>,
        status: u16,
    ) -> Self {
        Self {
            message: message.into(),
            error_type: classify_status(status),
            http_status: Some(status),
            cause,
        }
    }

    /// Build an error for a failure that never produced an HTTP response.
    ///
    /// Classification comes from the cause's message chain. Without a cause
    /// the error is permanent.
    pub fn from_error(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        let error_type = classify_cause(
            cause
                .as_deref()
                .map(|err| err as &(dyn StdError + 'static)),
        );
        Self {
            message: message.into(),
            error_type,
            http_status: None,
            cause,
        }
    }

    /// Build a permanent error for a fault detected locally, such as missing
    /// configuration or an unusable private key.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: ErrorType::Permanent,
            http_status: None,
            cause: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn is_transient(&self) -> bool {
        self.error_type == ErrorType::Transient
    }

    pub fn is_permanent(&self) -> bool {
        self.error_type == ErrorType::Permanent
    }

    /// Whether a caller's retry loop should try the operation again.
    pub fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

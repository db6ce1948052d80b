//! GitHub App authentication
//!
//! An App authenticates as itself with a short-lived RS256 JWT, then exchanges
//! it for installation access tokens that act on repositories.

use crate::error::{ProviderResult, SourceControlProviderError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Backdate `iat` to tolerate clock drift between us and GitHub
const JWT_CLOCK_DRIFT_SECS: i64 = 60;
/// GitHub rejects App JWTs that live longer than ten minutes
const JWT_LIFETIME_SECS: i64 = 540;
/// Cached installation tokens are re-minted once this close to expiry
pub(super) const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// Signs App JWTs with the App's private key
pub(super) struct AppJwtSigner {
    app_id: u64,
    key: EncodingKey,
}

impl AppJwtSigner {
    pub fn new(app_id: u64, private_key: &SecretString) -> ProviderResult<Self> {
        let key = EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes()).map_err(|e| {
            SourceControlProviderError::permanent(format!(
                "GitHub App private key is not a valid RSA PEM key: {e}"
            ))
        })?;
        Ok(Self { app_id, key })
    }

    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    pub fn sign(&self, now: DateTime<Utc>) -> ProviderResult<SecretString> {
        let claims = AppClaims {
            iat: (now - Duration::seconds(JWT_CLOCK_DRIFT_SECS)).timestamp(),
            exp: (now + Duration::seconds(JWT_LIFETIME_SECS)).timestamp(),
            iss: self.app_id.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map(SecretString::new)
            .map_err(|e| {
                SourceControlProviderError::permanent(format!(
                    "Failed to sign GitHub App JWT: {e}"
                ))
            })
    }
}

/// An installation access token together with its expiry
#[derive(Clone)]
pub(super) struct InstallationToken {
    pub token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InstallationToken {
    /// Whether the token can still be used at `now` without refreshing
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > now,
            None => true,
        }
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl std::fmt::Debug for AppJwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppJwtSigner")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

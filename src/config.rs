use crate::error::{ProviderResult, SourceControlProviderError};
use crate::logging::log_debug;
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;
use std::time::Duration;
use url::Url;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_WEB_URL: &str = "https://github.com";
pub const DEFAULT_USER_AGENT: &str = "source-control-provider";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for provider-specific configuration
pub trait ProviderConfig: Send + Sync + Debug {
    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Validate provider configuration
    ///
    /// # Errors
    ///
    /// Returns a permanent [`SourceControlProviderError`] if:
    /// - Required credentials are missing
    /// - URLs are malformed
    /// - The request timeout is zero
    fn validate(&self) -> ProviderResult<()>;

    /// Get the base URL for API calls
    fn base_url(&self) -> &str;

    /// Upper bound for a single HTTP request
    fn request_timeout(&self) -> Duration;
}

/// Top-level configuration naming the provider to build
#[derive(Debug, Clone)]
pub enum SourceControlConfig {
    GitHub(GitHubConfig),
}

impl SourceControlConfig {
    /// Load configuration from environment variables.
    ///
    /// `SOURCE_CONTROL_PROVIDER` selects the provider and defaults to `github`.
    pub fn from_environment() -> ProviderResult<Self> {
        let provider = env_var("SOURCE_CONTROL_PROVIDER").unwrap_or_else(|| "github".to_string());

        match provider.to_lowercase().as_str() {
            "github" => Ok(SourceControlConfig::GitHub(GitHubConfig::from_environment()?)),
            other => Err(SourceControlProviderError::permanent(format!(
                "Source control provider not supported: {other}"
            ))),
        }
    }

    pub fn provider(&self) -> &dyn ProviderConfig {
        match self {
            SourceControlConfig::GitHub(config) => config,
        }
    }
}

/// How the GitHub provider authenticates
#[derive(Debug, Clone)]
pub enum GitHubAuth {
    /// GitHub App; API calls and pushes use installation access tokens
    App {
        app_id: u64,
        /// PEM-encoded RSA private key of the App
        private_key: SecretString,
        /// Resolved per repository when absent
        installation_id: Option<u64>,
    },
    /// Static personal access or OAuth token
    Token(SecretString),
}

/// GitHub-specific configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// REST API root, e.g. `https://api.github.com` or `https://ghe.example.com/api/v3`
    pub api_url: String,
    /// Web root used to build git remote URLs
    pub web_url: String,
    pub auth: Option<GitHubAuth>,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            web_url: DEFAULT_GITHUB_WEB_URL.to_string(),
            auth: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GitHubConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            auth: Some(GitHubAuth::Token(SecretString::new(token.into()))),
            ..Default::default()
        }
    }

    pub fn with_app(app_id: u64, private_key: SecretString, installation_id: Option<u64>) -> Self {
        Self {
            auth: Some(GitHubAuth::App {
                app_id,
                private_key,
                installation_id,
            }),
            ..Default::default()
        }
    }

    /// Load GitHub configuration from environment variables.
    ///
    /// `GITHUB_TOKEN` takes priority over App credentials when both are set.
    pub fn from_environment() -> ProviderResult<Self> {
        let mut config = GitHubConfig::default();

        if let Some(api_url) = env_var("GITHUB_API_URL") {
            config.api_url = api_url;
        }
        if let Some(web_url) = env_var("GITHUB_WEB_URL") {
            config.web_url = web_url;
        }
        if let Some(user_agent) = env_var("GITHUB_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout_ms) = env_var("GITHUB_REQUEST_TIMEOUT_MS") {
            let timeout_ms: u64 = timeout_ms.parse().map_err(|_| {
                SourceControlProviderError::permanent(
                    "GITHUB_REQUEST_TIMEOUT_MS needs to be an integer",
                )
            })?;
            config.request_timeout = Duration::from_millis(timeout_ms);
        }

        config.auth = Self::auth_from_environment()?;

        log_debug!(
            provider = "github",
            api_url = %config.api_url,
            web_url = %config.web_url,
            auth = config.auth_kind(),
            timeout_ms = config.request_timeout.as_millis() as u64,
            "Loaded GitHub configuration from environment"
        );

        config.validate()?;
        Ok(config)
    }

    fn auth_from_environment() -> ProviderResult<Option<GitHubAuth>> {
        if let Some(token) = env_var("GITHUB_TOKEN") {
            return Ok(Some(GitHubAuth::Token(SecretString::new(token))));
        }

        let Some(app_id) = env_var("GITHUB_APP_ID") else {
            return Ok(None);
        };
        let app_id = app_id.parse().map_err(|_| {
            SourceControlProviderError::permanent("GITHUB_APP_ID needs to be an integer")
        })?;
        let private_key = env_var("GITHUB_APP_PRIVATE_KEY").ok_or_else(|| {
            SourceControlProviderError::permanent(
                "Please provide the GITHUB_APP_PRIVATE_KEY environment variable",
            )
        })?;
        let installation_id = env_var("GITHUB_APP_INSTALLATION_ID")
            .map(|id| {
                id.parse().map_err(|_| {
                    SourceControlProviderError::permanent(
                        "GITHUB_APP_INSTALLATION_ID needs to be an integer",
                    )
                })
            })
            .transpose()?;

        Ok(Some(GitHubAuth::App {
            app_id,
            // Keys pasted into single-line env vars usually carry escaped newlines
            private_key: SecretString::new(private_key.replace("\\n", "\n")),
            installation_id,
        }))
    }

    fn auth_kind(&self) -> &'static str {
        match &self.auth {
            Some(GitHubAuth::App { .. }) => "app",
            Some(GitHubAuth::Token(_)) => "token",
            None => "none",
        }
    }
}

impl ProviderConfig for GitHubConfig {
    fn provider_name(&self) -> &'static str {
        "github"
    }

    fn validate(&self) -> ProviderResult<()> {
        validate_http_url("GitHub API URL", &self.api_url)?;
        validate_http_url("GitHub web URL", &self.web_url)?;

        if self.request_timeout.is_zero() {
            return Err(SourceControlProviderError::permanent(
                "GitHub request timeout must be greater than zero",
            ));
        }

        match &self.auth {
            None => Err(SourceControlProviderError::permanent(
                "GitHub credentials are required: set a token or GitHub App credentials",
            )),
            Some(GitHubAuth::Token(token)) if token.expose_secret().trim().is_empty() => Err(
                SourceControlProviderError::permanent("GitHub token must not be empty"),
            ),
            Some(GitHubAuth::App { app_id: 0, .. }) => Err(SourceControlProviderError::permanent(
                "GitHub App id must be a positive integer",
            )),
            Some(GitHubAuth::App { private_key, .. })
                if private_key.expose_secret().trim().is_empty() =>
            {
                Err(SourceControlProviderError::permanent(
                    "GitHub App private key must not be empty",
                ))
            }
            Some(_) => Ok(()),
        }
    }

    fn base_url(&self) -> &str {
        &self.api_url
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn validate_http_url(label: &str, value: &str) -> ProviderResult<()> {
    let url = Url::parse(value).map_err(|e| {
        SourceControlProviderError::permanent(format!("{label} is invalid ({value}): {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(SourceControlProviderError::permanent(format!(
            "{label} must use http or https, got {scheme}"
        ))),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

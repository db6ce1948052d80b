use super::auth::{AppJwtSigner, InstallationToken};
use super::types::{
    GitHubAddLabels, GitHubCreateInstallationToken, GitHubCreatePullRequest, GitHubInstallation,
    GitHubInstallationToken, GitHubPullRequest, GitHubRepository, GitHubRequestReviewers,
};
use crate::config::{GitHubAuth, GitHubConfig, ProviderConfig};
use crate::error::{ProviderResult, SourceControlProviderError};
use crate::http::{BestEffortError, GitHubHttpClient};
use crate::logging::{log_debug, log_info, log_warn};
use crate::provider::{
    CreatePullRequest, PullRequest, PushAuthContext, RepositoryInfo, SourceControlProvider,
};
use chrono::Utc;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Username GitHub expects alongside an installation or personal token
pub const PUSH_USERNAME: &str = "x-access-token";

/// Cached unscoped token for one installation; locked while it is re-minted
type TokenSlot = Arc<Mutex<Option<InstallationToken>>>;

#[derive(Debug)]
enum Credentials {
    App {
        signer: AppJwtSigner,
        installation_id: Option<u64>,
        /// Installation ids looked up per `owner/repo`
        installation_ids: Mutex<HashMap<String, u64>>,
        /// Unscoped installation tokens for API calls, keyed by installation id
        token_cache: Mutex<HashMap<u64, TokenSlot>>,
    },
    Token(SecretString),
}

/// GitHub provider implementation
#[derive(Debug)]
pub struct GitHubProvider {
    http_client: GitHubHttpClient,
    config: GitHubConfig,
    credentials: Credentials,
}

impl GitHubProvider {
    /// Create a new GitHub provider instance
    ///
    /// # Errors
    ///
    /// Returns a permanent error if:
    /// - Configuration validation fails
    /// - The App private key cannot be parsed
    /// - HTTP client initialization fails
    pub fn new(config: GitHubConfig) -> ProviderResult<Self> {
        log_debug!(
            provider = "github",
            api_url = %config.api_url,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "Creating GitHub provider"
        );

        config.validate()?;

        let credentials = match &config.auth {
            Some(GitHubAuth::App {
                app_id,
                private_key,
                installation_id,
            }) => Credentials::App {
                signer: AppJwtSigner::new(*app_id, private_key)?,
                installation_id: *installation_id,
                installation_ids: Mutex::new(HashMap::new()),
                token_cache: Mutex::new(HashMap::new()),
            },
            Some(GitHubAuth::Token(token)) => Credentials::Token(token.clone()),
            None => {
                return Err(SourceControlProviderError::permanent(
                    "GitHub credentials are required",
                ))
            }
        };

        let http_client = GitHubHttpClient::new(
            &config.api_url,
            &config.user_agent,
            config.request_timeout(),
        )?;

        Ok(Self {
            http_client,
            config,
            credentials,
        })
    }

    /// Token for REST calls against `owner/repo`
    async fn api_token(&self, owner: &str, repo: &str) -> ProviderResult<SecretString> {
        match &self.credentials {
            Credentials::Token(token) => Ok(token.clone()),
            Credentials::App {
                signer,
                installation_id,
                installation_ids,
                token_cache,
            } => {
                let installation_id = self
                    .resolve_installation_id(
                        signer,
                        *installation_id,
                        installation_ids,
                        owner,
                        repo,
                    )
                    .await?;

                // Only callers of the same installation wait on a mint
                let slot = Arc::clone(
                    token_cache
                        .lock()
                        .await
                        .entry(installation_id)
                        .or_default(),
                );
                let mut cached = slot.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                    return Ok(token.token.clone());
                }

                let minted = self
                    .mint_installation_token(signer, installation_id, None)
                    .await?;
                let token = minted.token.clone();
                *cached = Some(minted);
                Ok(token)
            }
        }
    }

    async fn resolve_installation_id(
        &self,
        signer: &AppJwtSigner,
        configured: Option<u64>,
        known: &Mutex<HashMap<String, u64>>,
        owner: &str,
        repo: &str,
    ) -> ProviderResult<u64> {
        if let Some(id) = configured {
            return Ok(id);
        }

        let key = format!("{owner}/{repo}");
        if let Some(id) = known.lock().await.get(&key) {
            return Ok(*id);
        }

        let jwt = signer.sign(Utc::now())?;
        let installation: GitHubInstallation = self
            .http_client
            .get_json(
                &format!("/repos/{owner}/{repo}/installation"),
                &jwt,
                "GitHub installation lookup",
            )
            .await?;

        log_debug!(
            provider = "github",
            owner = %owner,
            repo = %repo,
            installation_id = installation.id,
            "Resolved GitHub App installation"
        );

        known.lock().await.insert(key, installation.id);
        Ok(installation.id)
    }

    /// Exchange an App JWT for an installation access token, optionally
    /// restricted to `repositories`
    async fn mint_installation_token(
        &self,
        signer: &AppJwtSigner,
        installation_id: u64,
        repositories: Option<&[&str]>,
    ) -> ProviderResult<InstallationToken> {
        let jwt = signer.sign(Utc::now())?;
        let body = GitHubCreateInstallationToken { repositories };

        let minted: GitHubInstallationToken = self
            .http_client
            .post_json(
                &format!("/app/installations/{installation_id}/access_tokens"),
                &jwt,
                &body,
                "GitHub installation token minting",
            )
            .await?;

        log_info!(
            provider = "github",
            app_id = signer.app_id(),
            installation_id = installation_id,
            scoped = repositories.is_some(),
            expires_at = ?minted.expires_at,
            "Minted GitHub installation token"
        );

        Ok(InstallationToken {
            token: SecretString::new(minted.token),
            expires_at: minted.expires_at,
        })
    }

    async fn add_labels(
        &self,
        token: &SecretString,
        request: &CreatePullRequest,
        number: u64,
    ) -> Result<(), BestEffortError> {
        self.http_client
            .post_best_effort(
                &format!(
                    "/repos/{}/{}/issues/{number}/labels",
                    request.owner, request.repo
                ),
                token,
                &GitHubAddLabels {
                    labels: &request.labels,
                },
            )
            .await
    }

    async fn request_reviewers(
        &self,
        token: &SecretString,
        request: &CreatePullRequest,
        number: u64,
    ) -> Result<(), BestEffortError> {
        self.http_client
            .post_best_effort(
                &format!(
                    "/repos/{}/{}/pulls/{number}/requested_reviewers",
                    request.owner, request.repo
                ),
                token,
                &GitHubRequestReviewers {
                    reviewers: &request.reviewers,
                    team_reviewers: &request.team_reviewers,
                },
            )
            .await
    }

    /// Reject owner/repo names that would change the REST path they are spliced into
    fn validate_repository_path(owner: &str, repo: &str) -> ProviderResult<()> {
        for (label, segment) in [("owner", owner), ("repository", repo)] {
            let valid = !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if !valid {
                return Err(SourceControlProviderError::permanent(format!(
                    "Invalid GitHub {label} name: {segment:?}"
                )));
            }
        }
        Ok(())
    }

    /// HTTPS remote for `owner/repo` without credentials
    pub fn remote_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/{owner}/{repo}.git",
            self.config.web_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl SourceControlProvider for GitHubProvider {
    async fn get_repository(&self, owner: &str, repo: &str) -> ProviderResult<RepositoryInfo> {
        Self::validate_repository_path(owner, repo)?;
        let token = self.api_token(owner, repo).await?;
        let repository: GitHubRepository = self
            .http_client
            .get_json(
                &format!("/repos/{owner}/{repo}"),
                &token,
                "GitHub repository fetch",
            )
            .await?;

        log_debug!(
            provider = "github",
            full_name = %repository.full_name,
            default_branch = %repository.default_branch,
            "Fetched repository metadata"
        );

        Ok(repository.into())
    }

    async fn create_pull_request(&self, request: CreatePullRequest) -> ProviderResult<PullRequest> {
        Self::validate_repository_path(&request.owner, &request.repo)?;
        let token = self.api_token(&request.owner, &request.repo).await?;
        let body = GitHubCreatePullRequest {
            title: &request.title,
            head: &request.head,
            base: &request.base,
            body: request.body.as_deref(),
            draft: request.draft,
        };

        let created: GitHubPullRequest = self
            .http_client
            .post_json(
                &format!("/repos/{}/{}/pulls", request.owner, request.repo),
                &token,
                &body,
                "GitHub pull request creation",
            )
            .await?;

        log_info!(
            provider = "github",
            owner = %request.owner,
            repo = %request.repo,
            number = created.number,
            head = %request.head,
            base = %request.base,
            "Created pull request"
        );

        // Labels and reviewers are best-effort: the pull request already exists
        if !request.labels.is_empty() {
            if let Err(e) = self.add_labels(&token, &request, created.number).await {
                log_warn!(
                    provider = "github",
                    number = created.number,
                    labels = ?request.labels,
                    error = %e,
                    "Failed to add labels to pull request"
                );
            }
        }

        if !request.reviewers.is_empty() || !request.team_reviewers.is_empty() {
            if let Err(e) = self.request_reviewers(&token, &request, created.number).await {
                log_warn!(
                    provider = "github",
                    number = created.number,
                    reviewers = ?request.reviewers,
                    team_reviewers = ?request.team_reviewers,
                    error = %e,
                    "Failed to request reviewers for pull request"
                );
            }
        }

        Ok(created.into())
    }

    async fn get_push_auth_context(
        &self,
        owner: &str,
        repo: &str,
    ) -> ProviderResult<PushAuthContext> {
        Self::validate_repository_path(owner, repo)?;
        let remote_url = self.remote_url(owner, repo);

        let (token, expires_at) = match &self.credentials {
            Credentials::Token(token) => (token.clone(), None),
            Credentials::App {
                signer,
                installation_id,
                installation_ids,
                ..
            } => {
                let installation_id = self
                    .resolve_installation_id(
                        signer,
                        *installation_id,
                        installation_ids,
                        owner,
                        repo,
                    )
                    .await?;
                let minted = self
                    .mint_installation_token(signer, installation_id, Some(&[repo][..]))
                    .await?;
                (minted.token, minted.expires_at)
            }
        };

        Ok(PushAuthContext {
            username: PUSH_USERNAME.to_string(),
            token,
            expires_at,
            remote_url,
        })
    }

    fn provider_name(&self) -> &'static str {
        "github"
    }
}

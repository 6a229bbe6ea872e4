mod readme;

use std::sync::Arc;
use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::{ChallengeError, Result};
use crate::rate_limiter::RateLimitedClient;

pub use readme::{ReadmeFetcher, ReadmeSource};

/// A repository as listed by `GET /users/{username}/repos`
///
/// Only the fields the ranking needs are kept; everything else in the
/// per-repo JSON object is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Web URL of the repository
    #[serde(rename = "html_url")]
    pub url: String,
    /// Branch GitHub reports as default, when present
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Repository {
    /// Creates a repository record from a name and web URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            default_branch: None,
        }
    }

    /// Guessed README location on the `master` branch
    pub fn readme_url(&self) -> String {
        format!("{}/blob/master/README.md", self.url)
    }

    /// `(owner, repo)` taken from the web URL path
    pub fn owner_and_name(&self) -> Result<(String, String)> {
        owner_and_name(&self.url)
    }
}

/// Splits `https://github.com/{owner}/{repo}` into its two path segments
pub fn owner_and_name(repo_url: &str) -> Result<(String, String)> {
    let parsed = url::Url::parse(repo_url)?;
    let mut segments = parsed
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(repo)) => Ok((owner.to_string(), repo.trim_end_matches(".git").to_string())),
        _ => Err(ChallengeError::Validation(format!(
            "Not a repository URL: {}",
            repo_url
        ))),
    }
}

/// Source of a user's repository list
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Lists the repositories of `username` in the order the source returns them
    async fn fetch_user_repos(&self, username: &str) -> Result<Vec<Repository>>;
}

/// Lists repositories through the GitHub REST API
#[derive(Clone)]
pub struct RepositoryFetcher {
    client: Arc<RateLimitedClient>,
    api_base: String,
}

impl RepositoryFetcher {
    /// Creates a fetcher talking to `api_base`
    pub fn new(client: Arc<RateLimitedClient>, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl RepositorySource for RepositoryFetcher {
    async fn fetch_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ChallengeError::Validation("GitHub username is empty".into()));
        }

        let url = format!("{}/users/{}/repos", self.api_base.trim_end_matches('/'), username);
        let body = self.client.get(&url, None).await?;

        match body {
            Value::Array(_) => {
                let repos: Vec<Repository> = serde_json::from_value(body)?;
                info!("Fetched {} repositories for {}", repos.len(), username);
                Ok(repos)
            }
            other => {
                let message = other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string());
                Err(ChallengeError::GitHubApi(format!(
                    "Failed to list repositories for {}: {}",
                    username, message
                )))
            }
        }
    }
}

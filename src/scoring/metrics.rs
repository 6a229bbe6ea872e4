use std::collections::BTreeMap;
use std::sync::Arc;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::error::{ChallengeError, Result};
use crate::github::owner_and_name;
use crate::rate_limiter::RateLimitedClient;

/// Code metrics for one repository
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodeMetrics {
    /// Score on the same 0–10 range the model is asked to use
    pub complexity_score: f64,
}

/// Produces a code-metrics score for a repository URL
///
/// Implementations must fail with [`ChallengeError::MetricsUnavailable`]
/// instead of inventing a score.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeMetricsProvider: Send + Sync {
    /// Metrics for the repository at `repo_url`
    async fn extract_metrics(&self, repo_url: &str) -> Result<CodeMetrics>;
}

/// Scores repositories from GitHub's language breakdown
///
/// `GET /repos/{owner}/{repo}/languages` gives bytes of code per language.
/// Up to six points come from code volume (log scale, 10 MB saturates) and
/// up to four from the number of languages.
#[derive(Clone)]
pub struct GitHubStatsMetrics {
    client: Arc<RateLimitedClient>,
    api_base: String,
}

impl GitHubStatsMetrics {
    /// Creates a provider talking to `api_base`
    pub fn new(client: Arc<RateLimitedClient>, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl CodeMetricsProvider for GitHubStatsMetrics {
    async fn extract_metrics(&self, repo_url: &str) -> Result<CodeMetrics> {
        let (owner, repo) = owner_and_name(repo_url)
            .map_err(|e| ChallengeError::metrics_unavailable(repo_url, e))?;
        let url = format!(
            "{}/repos/{}/{}/languages",
            self.api_base.trim_end_matches('/'),
            owner,
            repo
        );

        let body = self
            .client
            .get(&url, None)
            .await
            .map_err(|e| ChallengeError::metrics_unavailable(repo_url, e))?;

        let languages: BTreeMap<String, u64> = serde_json::from_value(body.clone()).map_err(|_| {
            let reason = body
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("unexpected languages payload: {}", body));
            ChallengeError::metrics_unavailable(repo_url, reason)
        })?;

        let complexity_score = score_from_languages(&languages);
        debug!("{} languages {:?} -> {}", repo_url, languages, complexity_score);
        Ok(CodeMetrics { complexity_score })
    }
}

/// Maps a language breakdown onto 0–10, rounded to two decimals
pub fn score_from_languages(languages: &BTreeMap<String, u64>) -> f64 {
    let total_bytes: u64 = languages.values().sum();
    if total_bytes == 0 {
        return 0.0;
    }

    let volume = ((total_bytes as f64).log10() / 7.0 * 6.0).clamp(0.0, 6.0);
    let diversity = (languages.len() as f64).min(4.0);
    ((volume + diversity) * 100.0).round() / 100.0
}

use std::io;
use thiserror::Error;
use async_openai::error::OpenAIError;

/// Custom result type alias for the crate
pub type Result<T> = std::result::Result<T, ChallengeError>;

/// Errors that can occur while fetching, scoring and ranking repositories
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// OpenAI API errors
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// The bounded rate-limit wait loop ran out of attempts
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// GitHub API returned something other than the expected payload
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Language model backend errors
    #[error("LLM error: {0}")]
    LLM(String),

    /// The user has no public repositories
    #[error("No repositories found for user {username}")]
    NoRepositories {
        /// GitHub login that was looked up
        username: String,
    },

    /// The model reply did not contain a parseable complexity score
    #[error("Could not extract complexity score from response: {response}")]
    ScoreExtraction {
        /// Raw model reply, kept for diagnostics
        response: String,
    },

    /// The code-metrics provider could not produce a score
    #[error("Code metrics unavailable for {repo_url}: {reason}")]
    MetricsUnavailable {
        /// Repository the metrics were requested for
        repo_url: String,
        /// What went wrong
        reason: String,
    },
}

impl ChallengeError {
    /// Wraps any displayable failure as a metrics error for `repo_url`
    pub fn metrics_unavailable(repo_url: &str, reason: impl std::fmt::Display) -> Self {
        Self::MetricsUnavailable {
            repo_url: repo_url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Checks if this error was caused by the caller's input rather than a backend
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NoRepositories { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_unavailable_wraps_reason() {
        let error = ChallengeError::metrics_unavailable("https://github.com/u/A", "Not Found");
        assert_eq!(
            error.to_string(),
            "Code metrics unavailable for https://github.com/u/A: Not Found"
        );
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_rate_limit_is_not_user_error() {
        let error = ChallengeError::RateLimitExceeded("gave up after 8 attempts".into());
        assert!(!error.is_user_error());
        assert!(ChallengeError::Validation("empty".into()).is_user_error());
    }

    #[test]
    fn test_score_extraction_keeps_raw_reply() {
        let error = ChallengeError::ScoreExtraction {
            response: "This repo is pretty interesting.".into(),
        };
        assert!(error.to_string().contains("This repo is pretty interesting."));
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_no_repositories_is_user_error() {
        let error = ChallengeError::NoRepositories { username: "octocat".into() };
        assert!(error.is_user_error());
        assert_eq!(error.to_string(), "No repositories found for user octocat");
    }
}

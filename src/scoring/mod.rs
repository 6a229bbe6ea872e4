//! Per-repository complexity scoring.
//!
//! A repository's overall score is the sum of two parts: the score a chat
//! model gives it from its name and README, and the score of an injected
//! [`CodeMetricsProvider`]. Both parts must succeed; neither is defaulted.

/// Code-metrics providers
pub mod metrics;
/// Turning model replies into numbers
pub mod parser;

use std::sync::Arc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use crate::error::{ChallengeError, Result};
use crate::github::{ReadmeSource, Repository};
use crate::llm::{ChatMessage, ChatModel};
use crate::prompts::complexity_prompt;

pub use metrics::{CodeMetrics, CodeMetricsProvider, GitHubStatsMetrics};
pub use parser::{ParseError, RegexScoreParser, ScoreParser};

/// Default cap on README characters embedded in the prompt
pub const DEFAULT_README_MAX_CHARS: usize = 8000;

/// A repository with its computed score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRepository {
    /// Repository name
    pub name: String,
    /// Web URL of the repository
    pub url: String,
    /// `llm_score + metrics_score`
    pub overall_score: f64,
    /// Score parsed from the model reply
    pub llm_score: f64,
    /// Score from the code-metrics provider
    pub metrics_score: f64,
}

impl ScoredRepository {
    /// Combines the two sub-scores for `repo`
    pub fn new(repo: &Repository, llm_score: f64, metrics_score: f64) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.url.clone(),
            overall_score: llm_score + metrics_score,
            llm_score,
            metrics_score,
        }
    }
}

/// Scores one repository at a time
pub struct ComplexityScorer {
    readme: Arc<dyn ReadmeSource>,
    chat: Arc<dyn ChatModel>,
    metrics: Arc<dyn CodeMetricsProvider>,
    parser: Arc<dyn ScoreParser>,
    readme_max_chars: usize,
}

impl ComplexityScorer {
    /// Creates a scorer with the regex score parser
    pub fn new(
        readme: Arc<dyn ReadmeSource>,
        chat: Arc<dyn ChatModel>,
        metrics: Arc<dyn CodeMetricsProvider>,
    ) -> Self {
        Self {
            readme,
            chat,
            metrics,
            parser: Arc::new(RegexScoreParser),
            readme_max_chars: DEFAULT_README_MAX_CHARS,
        }
    }

    /// Replaces the score parser
    pub fn with_parser(mut self, parser: Arc<dyn ScoreParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Caps README text embedded in the prompt
    pub fn with_readme_limit(mut self, max_chars: usize) -> Self {
        self.readme_max_chars = max_chars;
        self
    }

    /// Asks the model about `repo` and parses the score out of its reply
    pub async fn llm_score(&self, repo: &Repository) -> Result<f64> {
        let readme = self.readme.fetch_readme(repo).await;
        let readme = truncate_chars(&readme, self.readme_max_chars);
        let prompt = complexity_prompt(&repo.name, readme);

        let reply = self.chat.complete(&[ChatMessage::user(prompt)]).await?;
        debug!("Model reply for {}: {}", repo.name, reply);

        self.parser
            .parse(&reply)
            .map_err(|_| ChallengeError::ScoreExtraction { response: reply })
    }

    /// Computes the overall score of `repo`
    pub async fn score(&self, repo: &Repository) -> Result<ScoredRepository> {
        let llm_score = self.llm_score(repo).await?;
        let metrics = self.metrics.extract_metrics(&repo.url).await?;

        let scored = ScoredRepository::new(repo, llm_score, metrics.complexity_score);
        info!(
            "Scored {}: {} (llm {} + metrics {})",
            scored.name, scored.overall_score, scored.llm_score, scored.metrics_score
        );
        Ok(scored)
    }
}

/// Longest prefix of `text` with at most `max_chars` characters
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::metrics::MockCodeMetricsProvider;
    use crate::llm::MockChatModel;
    use crate::testing::StaticReadme;

    fn repo() -> Repository {
        Repository::new("A", "https://github.com/u/A")
    }

    fn metrics_returning(score: f64) -> MockCodeMetricsProvider {
        let mut metrics = MockCodeMetricsProvider::new();
        metrics
            .expect_extract_metrics()
            .returning(move |_| Ok(CodeMetrics { complexity_score: score }));
        metrics
    }

    fn chat_replying(reply: &'static str) -> MockChatModel {
        let mut chat = MockChatModel::new();
        chat.expect_complete().returning(move |_| Ok(reply.to_string()));
        chat
    }

    #[tokio::test]
    async fn test_score_sums_llm_and_metrics() {
        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat_replying("Quite involved.\ncomplexity score: 7.5")),
            Arc::new(metrics_returning(2.0)),
        );

        let scored = scorer.score(&repo()).await.unwrap();
        assert_eq!(scored.overall_score, 9.5);
        assert_eq!(scored.llm_score, 7.5);
        assert_eq!(scored.metrics_score, 2.0);
        assert_eq!(scored.name, "A");
        assert_eq!(scored.url, "https://github.com/u/A");
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_score_extraction_error() {
        let mut metrics = MockCodeMetricsProvider::new();
        metrics.expect_extract_metrics().never();

        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat_replying("This repo is pretty interesting.")),
            Arc::new(metrics),
        );

        match scorer.score(&repo()).await {
            Err(ChallengeError::ScoreExtraction { response }) => {
                assert_eq!(response, "This repo is pretty interesting.");
            }
            other => panic!("expected ScoreExtraction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_metrics_failure_propagates() {
        let mut metrics = MockCodeMetricsProvider::new();
        metrics
            .expect_extract_metrics()
            .returning(|url| Err(ChallengeError::metrics_unavailable(url, "network down")));

        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat_replying("complexity score: 5")),
            Arc::new(metrics),
        );

        let err = scorer.score(&repo()).await.unwrap_err();
        assert!(matches!(err, ChallengeError::MetricsUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_prompt_contains_truncated_readme() {
        let mut chat = MockChatModel::new();
        chat.expect_complete()
            .withf(|messages: &[ChatMessage]| {
                messages.len() == 1
                    && messages[0].content.starts_with("Assess the complexity of repository A. äöü\n")
            })
            .returning(|_| Ok("complexity score: 1".to_string()));

        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default().with("A", "äöüß and more")),
            Arc::new(chat),
            Arc::new(metrics_returning(0.0)),
        )
        .with_readme_limit(3);

        assert_eq!(scorer.score(&repo()).await.unwrap().overall_score, 1.0);
    }

    /// Reads scores written as `N/10`
    struct OutOfTenParser;

    impl ScoreParser for OutOfTenParser {
        fn parse(&self, text: &str) -> std::result::Result<f64, ParseError> {
            text.split_whitespace()
                .find_map(|word| word.strip_suffix("/10")?.parse().ok())
                .ok_or_else(|| ParseError("no N/10 rating".into()))
        }
    }

    #[tokio::test]
    async fn test_custom_parser_replaces_regex() {
        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat_replying("I would rate it 8/10 overall")),
            Arc::new(metrics_returning(1.5)),
        )
        .with_parser(Arc::new(OutOfTenParser));

        let scored = scorer.score(&repo()).await.unwrap();
        assert_eq!(scored.llm_score, 8.0);
        assert_eq!(scored.overall_score, 9.5);

        let strict = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat_replying("complexity score: 7")),
            Arc::new(metrics_returning(1.5)),
        )
        .with_parser(Arc::new(OutOfTenParser));
        assert!(matches!(
            strict.score(&repo()).await,
            Err(ChallengeError::ScoreExtraction { .. })
        ));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }
}

use std::sync::Arc;
use log::info;
use crate::config::Config;
use crate::error::{ChallengeError, Result};
use crate::github::{ReadmeFetcher, RepositoryFetcher, RepositorySource};
use crate::llm::build_chat_model;
use crate::parallel::ParallelProcessor;
use crate::rate_limiter::RateLimitedClient;
use crate::scoring::{ComplexityScorer, GitHubStatsMetrics, ScoredRepository};

/// Finds a user's most technically challenging repository
///
/// Every run fetches and scores from scratch. A failure while scoring any one
/// repository fails the whole run.
pub struct ChallengeRanker {
    repositories: Arc<dyn RepositorySource>,
    scorer: Arc<ComplexityScorer>,
    processor: ParallelProcessor,
}

impl ChallengeRanker {
    /// Creates a ranker that scores repositories one at a time
    pub fn new(repositories: Arc<dyn RepositorySource>, scorer: Arc<ComplexityScorer>) -> Self {
        Self {
            repositories,
            scorer,
            processor: ParallelProcessor::new(1),
        }
    }

    /// Scores up to `max_concurrent` repositories at once
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.processor = ParallelProcessor::new(max_concurrent);
        self
    }

    /// Wires the production collaborators described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(RateLimitedClient::new(&config.github)?);
        Self::from_config_with_client(config, client)
    }

    /// Like [`ChallengeRanker::from_config`] with a prepared GitHub client
    pub fn from_config_with_client(config: &Config, client: Arc<RateLimitedClient>) -> Result<Self> {
        let repositories = RepositoryFetcher::new(client.clone(), config.github.api_base.clone());
        let readme = ReadmeFetcher::new(client.http().clone())
            .with_source(config.readme.source, config.github.raw_base.clone());
        let metrics = GitHubStatsMetrics::new(client, config.github.api_base.clone());
        let chat = build_chat_model(&config.llm)?;

        let scorer = ComplexityScorer::new(Arc::new(readme), chat, Arc::new(metrics))
            .with_readme_limit(config.readme.max_chars);

        Ok(Self::new(Arc::new(repositories), Arc::new(scorer))
            .with_concurrency(config.scoring.max_concurrent))
    }

    /// All repositories of `username`, highest overall score first
    ///
    /// The sort is stable, so equal scores keep the order GitHub listed them in.
    pub async fn rank(&self, username: &str) -> Result<Vec<ScoredRepository>> {
        let repos = self.repositories.fetch_user_repos(username).await?;
        if repos.is_empty() {
            return Err(ChallengeError::NoRepositories {
                username: username.to_string(),
            });
        }

        info!(
            "Scoring {} repositories for {} ({} at a time)",
            repos.len(),
            username,
            self.processor.max_concurrent()
        );
        let scorer = &self.scorer;
        let mut scored = self
            .processor
            .try_process_ordered(repos, |repo| async move { scorer.score(&repo).await })
            .await?;

        scored.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        Ok(scored)
    }

    /// The repository of `username` with the highest overall score
    pub async fn find_most_challenging(&self, username: &str) -> Result<ScoredRepository> {
        let best = self
            .rank(username)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ChallengeError::NoRepositories {
                username: username.to_string(),
            })?;

        info!(
            "Most challenging repository of {}: {} ({})",
            username, best.name, best.overall_score
        );
        Ok(best)
    }
}

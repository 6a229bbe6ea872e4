#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! repo-challenge - find the most technically challenging repository of a GitHub user
//!
//! The pipeline is linear: list the user's repositories, score each one, sort
//! by score and keep the best.
//!
//! ## Scoring
//! - A chat model reads the repository name and README and answers with a
//!   `complexity score: <number>` line
//! - A [`scoring::CodeMetricsProvider`] adds a code-metrics score
//! - The overall score is the plain sum of the two
//!
//! ## Usage
//! ```rust,ignore
//! use repo_challenge::{ChallengeRanker, Config};
//!
//! async fn example() -> repo_challenge::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!     let ranker = ChallengeRanker::from_config(&config)?;
//!
//!     let best = ranker.find_most_challenging("octocat").await?;
//!     println!("{} ({}) scored {}", best.name, best.url, best.overall_score);
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// GitHub repository listing and README lookup
pub mod github;
/// Chat-model backends
pub mod llm;
/// Logging configuration and utilities
pub mod logging;
/// Ordered, all-or-nothing concurrent execution
pub mod parallel;
/// Prompt templates
pub mod prompts;
/// Ranking of a user's repositories
pub mod ranker;
/// Rate-limit aware GitHub API client
pub mod rate_limiter;
/// Per-repository complexity scoring
pub mod scoring;
/// REST API and web form
pub mod api;
/// In-memory fakes for tests
pub mod testing;

// Re-export common types
pub use config::Config;
pub use error::{ChallengeError, Result};
pub use github::{ReadmeFetcher, ReadmeSource, Repository, RepositoryFetcher, RepositorySource};
pub use llm::{ChatMessage, ChatModel};
pub use ranker::ChallengeRanker;
pub use rate_limiter::RateLimitedClient;
pub use scoring::{CodeMetrics, CodeMetricsProvider, ComplexityScorer, ScoreParser, ScoredRepository};

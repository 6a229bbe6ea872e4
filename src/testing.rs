//! In-memory stand-ins for the ranking collaborators.
//!
//! Used by the unit tests and by the integration tests under `tests/`, so the
//! module is compiled into the library rather than behind `cfg(test)`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use crate::error::{ChallengeError, Result};
use crate::github::{ReadmeSource, Repository, RepositorySource};
use crate::llm::{ChatMessage, ChatModel};
use crate::rate_limiter::Sleeper;
use crate::scoring::{CodeMetrics, CodeMetricsProvider};

/// Serves a fixed repository list for every username
#[derive(Debug, Default)]
pub struct StaticRepositories {
    repos: Vec<Repository>,
    calls: AtomicUsize,
}

impl StaticRepositories {
    /// Serves `repos` in the given order
    pub fn new(repos: Vec<Repository>) -> Self {
        Self {
            repos,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of list requests served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositorySource for StaticRepositories {
    async fn fetch_user_repos(&self, _username: &str) -> Result<Vec<Repository>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.repos.clone())
    }
}

/// README text keyed by repository name, empty for unknown names
#[derive(Debug, Default, Clone)]
pub struct StaticReadme {
    readmes: HashMap<String, String>,
}

impl StaticReadme {
    /// Adds a README for `name`
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.readmes.insert(name.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl ReadmeSource for StaticReadme {
    async fn fetch_readme(&self, repo: &Repository) -> String {
        self.readmes.get(&repo.name).cloned().unwrap_or_default()
    }
}

/// Answers with the reply registered for the repository named in the prompt
#[derive(Debug, Default)]
pub struct ScriptedChat {
    replies: Vec<(String, String)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    /// Replies `reply` when the prompt is about repository `name`
    pub fn reply(mut self, name: &str, reply: &str) -> Self {
        self.replies.push((name.to_string(), reply.to_string()));
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        self.replies
            .iter()
            .find(|(name, _)| prompt.starts_with(&format!("Assess the complexity of repository {}.", name)))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| ChallengeError::LLM(format!("no scripted reply for prompt: {}", prompt)))
    }
}

/// Metrics scores keyed by repository URL; unknown URLs are unavailable
#[derive(Debug, Default)]
pub struct FixedMetrics {
    scores: HashMap<String, f64>,
    calls: AtomicUsize,
}

impl FixedMetrics {
    /// Scores `url` as `score`
    pub fn with(mut self, url: &str, score: f64) -> Self {
        self.scores.insert(url.to_string(), score);
        self
    }

    /// Number of metrics requests served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeMetricsProvider for FixedMetrics {
    async fn extract_metrics(&self, repo_url: &str) -> Result<CodeMetrics> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scores
            .get(repo_url)
            .map(|&complexity_score| CodeMetrics { complexity_score })
            .ok_or_else(|| ChallengeError::metrics_unavailable(repo_url, "no metrics registered"))
    }
}

/// Records requested sleeps and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Durations requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

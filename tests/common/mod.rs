#![allow(dead_code)]

use std::sync::Arc;
use repo_challenge::config::GitHubConfig;
use repo_challenge::testing::{FixedMetrics, ScriptedChat, StaticReadme, StaticRepositories};
use repo_challenge::{ChallengeRanker, ComplexityScorer, Repository};
use serde_json::json;

pub mod test_helpers {
    use super::*;

    /// GitHub settings pointing at a mock server
    pub fn github_config(api_base: &str) -> GitHubConfig {
        GitHubConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
            ..GitHubConfig::default()
        }
    }

    /// Body of `GET /users/{username}/repos` for `names`, hosted under `base`
    pub fn repos_body(base: &str, owner: &str, names: &[&str]) -> String {
        let repos: Vec<_> = names
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "full_name": format!("{}/{}", owner, name),
                    "html_url": format!("{}/{}/{}", base, owner, name),
                    "default_branch": "main",
                    "fork": false
                })
            })
            .collect();
        json!(repos).to_string()
    }

    /// Ranker over fakes: repos A and B, both scoring 7.5 + 2.0
    pub fn tied_ranker() -> ChallengeRanker {
        let repos = vec![Repository::new("A", "u/A"), Repository::new("B", "u/B")];
        let chat = ScriptedChat::default()
            .reply("A", "Solid work.\ncomplexity score: 7.5")
            .reply("B", "Equally solid.\ncomplexity score: 7.5");
        let metrics = FixedMetrics::default().with("u/A", 2.0).with("u/B", 2.0);
        ranker_over(repos, chat, metrics)
    }

    /// Ranker over fakes with the given repositories, replies and metrics
    pub fn ranker_over(repos: Vec<Repository>, chat: ScriptedChat, metrics: FixedMetrics) -> ChallengeRanker {
        let scorer = ComplexityScorer::new(
            Arc::new(StaticReadme::default()),
            Arc::new(chat),
            Arc::new(metrics),
        );
        ChallengeRanker::new(Arc::new(StaticRepositories::new(repos)), Arc::new(scorer))
    }

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }
}

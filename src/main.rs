use std::path::PathBuf;
use std::process;
use std::time::Duration;
use anyhow::Context;
use clap::Parser;
use colored::*;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use repo_challenge::{
    config::LlmProvider,
    logging, ChallengeError, ChallengeRanker, Config, ScoredRepository,
};

#[derive(Parser)]
#[command(author, version, about = "Find the most technically challenging repository of a GitHub user", long_about = None)]
struct Cli {
    /// GitHub username to analyze (prompted for when omitted)
    username: Option<String>,

    /// Config file (defaults to <config dir>/repo-challenge/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat model backend
    #[arg(short, long, value_enum)]
    provider: Option<LlmProvider>,

    /// Model name for the selected backend
    #[arg(short, long)]
    model: Option<String>,

    /// Score this many repositories at once
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Print every repository's score, not just the winner
    #[arg(short, long)]
    all: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    let config = build_config(&cli)?;
    config.validate().context("invalid configuration")?;
    let ranker = ChallengeRanker::from_config(&config)?;

    let username = match cli.username.clone() {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Enter GitHub Username")
            .interact_text()
            .context("failed to read username")?,
    };

    if username.trim().is_empty() {
        eprintln!("{}", "Please enter a GitHub username.".red());
        process::exit(2);
    }

    let spinner = spinner(&format!("Analyzing repositories of {}", username.trim()));
    let outcome = if cli.all {
        ranker.rank(username.trim()).await
    } else {
        ranker.find_most_challenging(username.trim()).await.map(|best| vec![best])
    };
    spinner.finish_and_clear();

    match outcome {
        Ok(ranked) => {
            print_ranking(&ranked, cli.all, cli.json)?;
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            report_failure(&e);
            process::exit(if e.is_user_error() { 2 } else { 1 });
        }
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env();
            config
        }
        None => Config::load()?,
    };

    if let Some(provider) = cli.provider {
        if provider != config.llm.provider {
            config.llm.provider = provider;
            config.llm.model = None;
            config.llm.api_key = None;
            config.apply_env();
        }
    }
    if let Some(model) = &cli.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.scoring.max_concurrent = concurrency;
    }
    Ok(config)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_ranking(ranked: &[ScoredRepository], all: bool, json: bool) -> anyhow::Result<()> {
    if json {
        let output = if all {
            serde_json::to_string_pretty(ranked)?
        } else {
            serde_json::to_string_pretty(&ranked.first())?
        };
        println!("{}", output);
        return Ok(());
    }

    let Some(best) = ranked.first() else {
        return Ok(());
    };
    println!("{}", "Most challenging repository found!".bright_green().bold());
    println!("{} {}", "Repository Name:".bright_white().bold(), best.name);
    println!("{} {}", "Repository URL:".bright_white().bold(), best.url);
    println!(
        "{} {} (model {} + metrics {})",
        "Overall Complexity Score:".bright_white().bold(),
        best.overall_score,
        best.llm_score,
        best.metrics_score
    );

    if all && ranked.len() > 1 {
        println!("\n{}", "All repositories:".bright_yellow());
        for (rank, repo) in ranked.iter().enumerate() {
            println!("  {:>2}. {:<40} {:>6.2}", rank + 1, repo.name, repo.overall_score);
        }
    }
    Ok(())
}

fn report_failure(e: &ChallengeError) {
    match e {
        ChallengeError::NoRepositories { username } => {
            eprintln!("{}", format!("No repositories found for user {}", username).yellow());
        }
        ChallengeError::ScoreExtraction { response } => {
            eprintln!("{}", "Could not extract a complexity score from the model reply:".red());
            eprintln!("{}", response);
        }
        other => {
            eprintln!("{}", "Could not find a repository or an error occurred.".red());
            eprintln!("{}", other);
        }
    }
}

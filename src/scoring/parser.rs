use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static COMPLEXITY_SCORE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"complexity score: ([0-9]*\.?[0-9]+)").expect("complexity score pattern is valid")
});

/// Why a reply could not be turned into a score
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Turns a free-text model reply into a numeric complexity score
pub trait ScoreParser: Send + Sync {
    /// Extracts the score from `text`
    fn parse(&self, text: &str) -> Result<f64, ParseError>;
}

/// Finds the first `complexity score: <number>` in the reply
///
/// Matching is case-sensitive. The number may carry a decimal part and may
/// omit the leading zero (`.5`).
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexScoreParser;

impl ScoreParser for RegexScoreParser {
    fn parse(&self, text: &str) -> Result<f64, ParseError> {
        let captures = COMPLEXITY_SCORE
            .captures(text)
            .ok_or_else(|| ParseError("no `complexity score: <number>` in reply".into()))?;
        captures[1]
            .parse::<f64>()
            .map_err(|e| ParseError(format!("invalid score {:?}: {}", &captures[1], e)))
    }
}

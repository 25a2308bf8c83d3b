use thiserror::Error;

pub type BracketResult<T> = Result<T, BracketError>;

/// Every variant is recoverable: an operation that fails leaves the bracket
/// (and the store) exactly as it was.
#[derive(Debug, Error)]
pub enum BracketError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Incomplete matchup {0}: both teams must be set before selecting a winner")]
    IncompleteMatchup(String),

    #[error("Winner {winner} is not playing in matchup {matchup_id}")]
    WinnerNotInMatchup { matchup_id: String, winner: String },

    #[error("Invalid bracket: {0}")]
    InvalidBracket(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl BracketError {
    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        BracketError::Io { path: path.to_string(), source }
    }
}

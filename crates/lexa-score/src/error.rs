//! Error types for lexa-score.

use thiserror::Error;

/// Why a document received no score.
///
/// These never escape [`ScoringClient::score`](crate::ScoringClient::score);
/// they are logged and surface only as an absent score.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("response contains no prediction")]
    NoPrediction,

    #[error("prediction '{0}' is not a number")]
    NotANumber(String),

    #[error("prediction {0} is not finite")]
    NonFinite(f64),

    #[error("prediction {0} is outside the score range")]
    OutOfRange(f64),
}

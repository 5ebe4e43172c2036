use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScoreError;

// Numeric literals are tried first; any other token is still captured and
// reported as `NotANumber`.
static PREDICTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bprediction\s*=\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:e[-+]?\d+)?|[-+]?(?:nan|infinity)\b|[^\s;,<>"'(){}\[\]]+)"#,
    )
    .expect("prediction pattern is valid")
});

/// Extract the score from an otherwise opaque response body.
///
/// The first `prediction = <number>` assignment is authoritative. Values in
/// `[0, 1]` are returned as-is; values in `(1, 100]` are read as percentages.
pub fn parse_prediction(body: &str) -> Result<f64, ScoreError> {
    let raw = PREDICTION
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or(ScoreError::NoPrediction)?
        .as_str();

    let value: f64 = raw
        .parse()
        .map_err(|_| ScoreError::NotANumber(raw.to_string()))?;

    if !value.is_finite() {
        return Err(ScoreError::NonFinite(value));
    }

    match value {
        v if (0.0..=1.0).contains(&v) => Ok(v),
        v if v > 1.0 && v <= 100.0 => Ok(v / 100.0),
        v => Err(ScoreError::OutOfRange(v)),
    }
}

use std::time::Duration;

use lexa_text::PlusEncodedText;
use tracing::{debug, warn};
use url::form_urlencoded::byte_serialize;

use crate::error::ScoreError;
use crate::options::ScoringOptions;
use crate::parse::parse_prediction;
use crate::transport::Transport;

const SAMPLE_CHARS: usize = 200;

/// Build the request body for one document: `content=` followed by the
/// plus-joined tokens, each token form-encoded on its own so the `+`
/// separators survive as spaces on the receiving side.
pub fn form_body(text: &PlusEncodedText) -> String {
    let mut body = String::from("content=");
    for (i, token) in text.tokens().enumerate() {
        if i > 0 {
            body.push(PlusEncodedText::SEPARATOR);
        }
        body.extend(byte_serialize(token.as_bytes()));
    }
    body
}

/// Scores documents against a fixed endpoint.
///
/// The client is cheap to share behind an `Arc`; requests are independent
/// and may run concurrently.
pub struct ScoringClient<T: Transport> {
    transport: T,
    endpoint: String,
    timeout: Duration,
}

impl<T: Transport> ScoringClient<T> {
    pub fn new(transport: T, options: &ScoringOptions) -> Self {
        Self {
            transport,
            endpoint: options.endpoint.clone(),
            timeout: options.timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Score one document. Failures of any kind yield `None`.
    pub async fn score(&self, text: &PlusEncodedText) -> Option<f64> {
        if text.is_empty() {
            debug!("empty document text, not scoring");
            return None;
        }

        match self.try_score(text).await {
            Ok(score) => {
                debug!(score, "document scored");
                Some(score)
            }
            Err(ScoreError::NoPrediction) => {
                debug!(endpoint = %self.endpoint, "response carried no prediction");
                None
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "scoring failed");
                None
            }
        }
    }

    /// Score one document, reporting why no score was produced.
    pub async fn try_score(&self, text: &PlusEncodedText) -> Result<f64, ScoreError> {
        debug!(sample = %text.sample(SAMPLE_CHARS), "sending document for scoring");
        let request = self.transport.post_form(&self.endpoint, form_body(text));
        let body = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ScoreError::Timeout)?
            .map_err(|e| ScoreError::Transport(e.to_string()))?;
        parse_prediction(&body)
    }
}

#[cfg(feature = "reqwest")]
impl ScoringClient<crate::transport::ReqwestTransport> {
    /// Client over the production `reqwest` transport.
    pub fn from_options(options: &ScoringOptions) -> Result<Self, ScoreError> {
        let transport = crate::transport::ReqwestTransport::new(options)?;
        Ok(Self::new(transport, options))
    }
}

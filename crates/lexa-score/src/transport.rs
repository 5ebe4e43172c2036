use std::future::Future;

/// HTTP seam between the scoring client and the network.
///
/// Implementations send one form-encoded POST and return the response body
/// as text. Any non-success status must be reported as an error.
pub trait Transport: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// POST `body` as `application/x-www-form-urlencoded` to `url`.
    fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = std::result::Result<String, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use reqwest::header::CONTENT_TYPE;

    use super::Transport;
    use crate::error::ScoreError;
    use crate::options::ScoringOptions;

    /// Production transport backed by a shared `reqwest` client.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(options: &ScoringOptions) -> Result<Self, ScoreError> {
            let client = reqwest::Client::builder()
                .timeout(options.timeout)
                .user_agent(options.user_agent.as_str())
                .build()
                .map_err(|e| ScoreError::ClientBuild(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl Transport for ReqwestTransport {
        type Error = reqwest::Error;

        async fn post_form(&self, url: &str, body: String) -> Result<String, Self::Error> {
            let response = self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body)
                .send()
                .await?
                .error_for_status()?;
            response.text().await
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestTransport;

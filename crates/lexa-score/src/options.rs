use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how scoring requests are sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    /// Fixed endpoint receiving one POST per document.
    pub endpoint: String,
    /// Upper bound for one request, connection included.
    #[serde(with = "seconds")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl ScoringOptions {
    pub const DEFAULT_ENDPOINT: &str = "https://ghostbuster-api-gm7xhurxnq-uw.a.run.app";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("lexa/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

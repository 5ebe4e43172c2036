//! Scoring client behavior against an in-process transport.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lexa_score::{ScoreError, ScoringClient, ScoringOptions, Transport};
use lexa_text::{NormalizedText, PlusEncodedText};

#[derive(Debug)]
struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

/// Mock transport replying with a canned body after an optional delay.
#[derive(Clone, Default)]
struct TestTransport {
    reply: Option<String>,
    delay: Duration,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl TestTransport {
    fn replying(body: &str) -> Self {
        Self {
            reply: Some(body.to_string()),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self::default()
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Transport for TestTransport {
    type Error = TestError;

    fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> impl std::future::Future<Output = Result<String, Self::Error>> + Send {
        self.requests.lock().unwrap().push((url.to_string(), body));
        let reply = self.reply.clone();
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            reply.ok_or_else(|| TestError("connection refused".to_string()))
        }
    }
}

fn text(raw: &str) -> PlusEncodedText {
    NormalizedText::from(raw.to_string()).plus_encoded()
}

fn options() -> ScoringOptions {
    ScoringOptions::default().endpoint("http://scoring.test/predict")
}

#[tokio::test]
async fn score_is_read_from_script_body() {
    let transport = TestTransport::replying("<script>\n  const prediction = 0.73;\n</script>");
    let client = ScoringClient::new(transport, &options());

    assert_eq!(client.score(&text("some document text")).await, Some(0.73));
}

#[tokio::test]
async fn request_carries_plus_joined_content() {
    let transport = TestTransport::replying("const prediction = 0.5;");
    let requests = transport.requests.clone();
    let client = ScoringClient::new(transport, &options());

    client.score(&text("Hello   world\n\nfoo")).await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "http://scoring.test/predict");
    assert_eq!(requests[0].1, "content=Hello+world+foo");
}

#[tokio::test]
async fn empty_text_is_not_sent() {
    let transport = TestTransport::replying("const prediction = 0.5;");
    let requests = transport.requests.clone();
    let client = ScoringClient::new(transport, &options());

    assert_eq!(client.score(&text(" \n\t ")).await, None);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn body_without_prediction_yields_no_score() {
    let client = ScoringClient::new(TestTransport::replying("<h1>Bad gateway</h1>"), &options());

    assert_eq!(client.score(&text("doc")).await, None);
    assert!(matches!(
        client.try_score(&text("doc")).await,
        Err(ScoreError::NoPrediction)
    ));
}

#[tokio::test]
async fn non_numeric_prediction_yields_no_score() {
    let client = ScoringClient::new(TestTransport::replying("const prediction = NaN;"), &options());

    assert_eq!(client.score(&text("doc")).await, None);
}

#[tokio::test]
async fn transport_failure_yields_no_score() {
    let client = ScoringClient::new(TestTransport::failing(), &options());

    assert_eq!(client.score(&text("doc")).await, None);
    assert!(matches!(
        client.try_score(&text("doc")).await,
        Err(ScoreError::Transport(_))
    ));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let transport =
        TestTransport::replying("const prediction = 0.9;").delayed(Duration::from_secs(10));
    let client = ScoringClient::new(transport, &options().timeout(Duration::from_millis(20)));

    let started = std::time::Instant::now();
    assert!(matches!(
        client.try_score(&text("doc")).await,
        Err(ScoreError::Timeout)
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let transport = TestTransport::replying("const prediction = 0.25;")
        .delayed(Duration::from_millis(20));
    let requests = transport.requests.clone();
    let client = Arc::new(ScoringClient::new(transport, &options()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.score(&text(&format!("document {i}"))).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(0.25));
    }
    assert_eq!(requests.lock().unwrap().len(), 8);
}

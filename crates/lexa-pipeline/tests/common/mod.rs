#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lexa_pipeline::{ImportRun, PipelineEvent};
use lexa_score::Transport;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let kids: Vec<Object> = vec![page_id.into()];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Flip the first byte of `marker` inside a stored archive so its CRC check fails.
pub fn corrupt(mut data: Vec<u8>, marker: &[u8]) -> Vec<u8> {
    let at = data
        .windows(marker.len())
        .position(|w| w == marker)
        .expect("marker is stored verbatim");
    data[at] ^= 0xff;
    data
}

#[derive(Debug)]
pub struct TestError(String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TestError {}

/// Mock scoring endpoint answering every request with the same prediction.
#[derive(Clone)]
pub struct TestTransport {
    prediction: Option<f64>,
    delay: Duration,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl TestTransport {
    pub fn scoring(prediction: f64) -> Self {
        Self {
            prediction: Some(prediction),
            delay: Duration::ZERO,
            requests: Arc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            prediction: None,
            delay: Duration::ZERO,
            requests: Arc::default(),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for TestTransport {
    type Error = TestError;

    fn post_form(
        &self,
        _url: &str,
        body: String,
    ) -> impl std::future::Future<Output = Result<String, Self::Error>> + Send {
        self.requests.lock().unwrap().push(body);
        let prediction = self.prediction;
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            match prediction {
                Some(p) => Ok(format!("<script>const prediction = {p};</script>")),
                None => Err(TestError("connection refused".to_string())),
            }
        }
    }
}

/// Drain a run, returning every event up to and including `Finished`.
pub async fn drain(mut run: ImportRun) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Some(event) = run.next_event().await {
        events.push(event);
    }
    events
}

pub fn progress_values(events: &[PipelineEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect()
}

use std::ops::ControlFlow;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use lexa_archive::{ArchivePath, BudgetTracker, ExtractionLimits, Leaf, LeafKind, LeafSink, Walker};
use lexa_score::{ScoringClient, Transport};
use lexa_text::NormalizedText;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, PreviewMode};
use crate::error::{Error, Result};
use crate::estimate::count_leaves;
use crate::event::{Phase, PipelineEvent, ProgressMeter};
use crate::outcome::{LeafResult, SkippedEntry, TraversalOutcome, display_name};
use crate::preview::PreviewHandle;

const EVENT_BUFFER: usize = 64;

/// One user-supplied top-level archive.
#[derive(Clone, Debug)]
pub struct ArchiveInput {
    /// Display name, used as the first path segment of every result.
    pub name: String,
    pub data: Bytes,
    /// Size announced by whoever supplied the bytes, when known.
    pub declared_size: Option<u64>,
}

impl ArchiveInput {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            declared_size: None,
        }
    }

    pub fn declared_size(mut self, size: u64) -> Self {
        self.declared_size = Some(size);
        self
    }
}

/// Extract-and-score pipeline. Each [`start`](Self::start) is an independent
/// import with its own budget, counters and display-name numbering.
pub struct Pipeline<T: Transport> {
    config: PipelineConfig,
    scorer: Arc<ScoringClient<T>>,
}

#[cfg(feature = "reqwest")]
impl Pipeline<lexa_score::ReqwestTransport> {
    /// Pipeline scoring over HTTP with the configured endpoint.
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let transport = lexa_score::ReqwestTransport::new(&config.scoring)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport + 'static> Pipeline<T> {
    pub fn new(config: PipelineConfig, transport: T) -> Self {
        let scorer = Arc::new(ScoringClient::new(transport, &config.scoring));
        Self { config, scorer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Begin importing `input` on the current Tokio runtime.
    ///
    /// The import runs in the background; observe it through the returned
    /// [`ImportRun`]. Dropping the handle cancels the import.
    pub fn start(&self, input: ArchiveInput) -> ImportRun {
        let (events, receiver) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();
        let run = Run {
            config: self.config.clone(),
            scorer: self.scorer.clone(),
            events,
            cancel: cancel.clone(),
        };
        tokio::spawn(run.drive(input));

        ImportRun {
            events: receiver,
            cancel: cancel.clone(),
            phase: Phase::Idle,
            _guard: cancel.drop_guard(),
        }
    }

    /// Import `input` to completion, reporting each progress percentage.
    pub async fn run(&self, input: ArchiveInput, mut on_progress: impl FnMut(u8)) -> Result<TraversalOutcome> {
        let mut run = self.start(input);
        while let Some(event) = run.next_event().await {
            match event {
                PipelineEvent::Progress(pct) => on_progress(pct),
                PipelineEvent::Finished(result) => return result,
                _ => {}
            }
        }
        Err(Error::Task("import ended without an outcome".to_string()))
    }
}

/// Handle to one in-flight import.
///
/// Events arrive lazily and in order; the sequence ends right after a single
/// [`PipelineEvent::Finished`].
#[derive(Debug)]
pub struct ImportRun {
    events: mpsc::Receiver<PipelineEvent>,
    cancel: CancellationToken,
    phase: Phase,
    _guard: DropGuard,
}

impl ImportRun {
    /// Next event, or `None` once the import has finished.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        let event = self.events.recv().await?;
        if let PipelineEvent::Phase(phase) = &event {
            self.phase = *phase;
        }
        Some(event)
    }

    /// Last phase observed through [`next_event`](Self::next_event).
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Stop the import before its next leaf. It then finishes with
    /// [`Error::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct Run<T: Transport> {
    config: PipelineConfig,
    scorer: Arc<ScoringClient<T>>,
    events: mpsc::Sender<PipelineEvent>,
    cancel: CancellationToken,
}

struct Processed {
    path: ArchivePath,
    kind: LeafKind,
    size: u64,
    score: Option<f64>,
    preview: PreviewHandle,
}

struct WalkReport {
    result: lexa_archive::Result<ControlFlow<()>>,
    skipped: Vec<SkippedEntry>,
}

impl<T: Transport + 'static> Run<T> {
    async fn drive(self, input: ArchiveInput) {
        let name = input.name.clone();
        let result = self.execute(input).await;

        match &result {
            Ok(outcome) => {
                info!(
                    archive = %name,
                    leaves = outcome.leaves.len(),
                    scored = outcome.scored().count(),
                    skipped = outcome.skipped.len(),
                    truncated = outcome.is_truncated(),
                    "import done"
                );
                self.emit(PipelineEvent::Phase(Phase::Done)).await;
                self.emit(PipelineEvent::Progress(ProgressMeter::COMPLETE)).await;
            }
            Err(e) => {
                warn!(archive = %name, error = %e, "import failed");
                self.emit(PipelineEvent::Phase(Phase::Failed)).await;
            }
        }
        self.emit(PipelineEvent::Finished(result)).await;
    }

    async fn emit(&self, event: PipelineEvent) {
        if self.events.send(event).await.is_err() {
            debug!("event receiver dropped");
        }
    }

    async fn execute(&self, input: ArchiveInput) -> Result<TraversalOutcome> {
        let ArchiveInput {
            name,
            data,
            declared_size,
        } = input;
        let root = ArchivePath::root(name.clone());
        if let Some(declared) = declared_size.filter(|&n| n != data.len() as u64) {
            warn!(archive = %root, declared, actual = data.len(), "archive size differs from declared size");
        }
        info!(archive = %root, bytes = data.len(), "import started");

        self.emit(PipelineEvent::Phase(Phase::Counting)).await;
        let counting = {
            let data = data.clone();
            let root = root.clone();
            let limits = self.config.limits;
            tokio::task::spawn_blocking(move || count_leaves(data, &root, limits))
        };
        let estimate = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(Error::Cancelled),
            joined = counting => joined?.map_err(|source| Error::ArchiveOpen {
                name: name.clone(),
                source,
            })?,
        };

        self.emit(PipelineEvent::Phase(Phase::Extracting)).await;
        let mut meter = ProgressMeter::new(estimate.scorable);
        debug!(
            total = meter.total(),
            leaves = estimate.leaves(),
            "scorable leaves to process"
        );

        let budget = Arc::new(BudgetTracker::new(&self.config.limits));
        let concurrency = self.config.effective_concurrency();
        let (leaf_tx, leaf_rx) = mpsc::channel(concurrency * 2);
        let walker = self.spawn_walk(data, root, budget.clone(), leaf_tx);

        let scorer = self.scorer.clone();
        let preview = self.config.preview;
        let leaves = stream::unfold(leaf_rx, |mut rx| async move { rx.recv().await.map(|leaf| (leaf, rx)) });
        let mut processed = std::pin::pin!(
            leaves
                .map(|leaf| process_leaf(leaf, scorer.clone(), preview))
                .buffered(concurrency)
        );

        let mut outcome = TraversalOutcome::default();
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                next = processed.next() => next,
            };
            let Some(leaf) = next else { break };

            let display_name = display_name(leaf.path.file_name(), outcome.leaves.len() as u64);
            budget.counters().record_leaf_processed();
            self.emit(PipelineEvent::Leaf {
                path: leaf.path.clone(),
                display_name: display_name.clone(),
                score: leaf.score,
            })
            .await;
            if leaf.kind.is_scorable() {
                if let Some(pct) = meter.advance() {
                    self.emit(PipelineEvent::Progress(pct)).await;
                }
            }

            outcome.leaves.push(LeafResult {
                path: leaf.path,
                display_name,
                kind: leaf.kind,
                is_scorable: leaf.kind.is_scorable(),
                size_bytes: leaf.size,
                score: leaf.score,
                preview: leaf.preview,
            });
        }

        debug!(progress = meter.last(), emitted = outcome.leaves.len(), "leaf stream drained");

        let report = walker.await?;
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        report.result.map_err(|source| Error::ArchiveOpen { name, source })?;

        outcome.truncation = budget.truncation();
        outcome.counters = budget.counters().snapshot();
        outcome.skipped = report.skipped;
        Ok(outcome)
    }

    fn spawn_walk(
        &self,
        data: Bytes,
        root: ArchivePath,
        budget: Arc<BudgetTracker>,
        leaves: mpsc::Sender<Leaf>,
    ) -> JoinHandle<WalkReport> {
        let limits: ExtractionLimits = self.config.limits;
        let mut sink = ChannelSink {
            leaves,
            cancel: self.cancel.clone(),
            emit_unsupported: self.config.emit_unsupported,
            skipped: Vec::new(),
        };
        tokio::task::spawn_blocking(move || {
            let result = Walker::new(limits, &budget).walk_root(data, &root, &mut sink);
            WalkReport {
                result,
                skipped: sink.skipped,
            }
        })
    }
}

/// Forwards walked leaves to the async side, blocking while it is busy.
struct ChannelSink {
    leaves: mpsc::Sender<Leaf>,
    cancel: CancellationToken,
    emit_unsupported: bool,
    skipped: Vec<SkippedEntry>,
}

impl LeafSink for ChannelSink {
    fn accept(&mut self, leaf: Leaf) -> ControlFlow<()> {
        if self.cancel.is_cancelled() {
            return ControlFlow::Break(());
        }
        if !leaf.is_scorable() && !self.emit_unsupported {
            debug!(path = %leaf.path, "unsupported leaf not emitted");
            return ControlFlow::Continue(());
        }
        match self.leaves.blocking_send(leaf) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }

    fn skipped(&mut self, path: &ArchivePath, reason: &lexa_archive::Error) {
        self.skipped.push(SkippedEntry {
            path: path.clone(),
            reason: reason.to_string(),
        });
    }
}

async fn process_leaf<T: Transport>(leaf: Leaf, scorer: Arc<ScoringClient<T>>, mode: PreviewMode) -> Processed {
    let Leaf {
        path,
        kind,
        size,
        payload,
    } = leaf;

    let prepared = {
        let path = path.clone();
        tokio::task::spawn_blocking(move || prepare(&path, kind, payload, mode)).await
    };
    let (text, preview) = prepared.unwrap_or_else(|e| {
        warn!(path = %path, error = %e, "leaf preparation aborted");
        (None, PreviewHandle::Empty)
    });

    let score = match text {
        Some(text) => scorer.score(&text.plus_encoded()).await,
        None => None,
    };

    Processed {
        path,
        kind,
        size,
        score,
        preview,
    }
}

/// Decode-side work for one leaf: retain the preview and extract the text.
fn prepare(
    path: &ArchivePath,
    kind: LeafKind,
    payload: Option<Bytes>,
    mode: PreviewMode,
) -> (Option<NormalizedText>, PreviewHandle) {
    let extension = match kind.document() {
        Some(doc) => doc.extension(),
        None => path.file_name().rsplit_once('.').map_or("bin", |(_, ext)| ext),
    };
    let preview = PreviewHandle::create(mode, payload.as_ref(), extension).unwrap_or_else(|e| {
        warn!(path = %path, error = %e, "preview not retained");
        PreviewHandle::Empty
    });

    let text = match (kind.document(), payload) {
        (Some(doc), Some(bytes)) => match lexa_text::extract_text(doc, &bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(path = %path, error = %e, "text extraction failed, leaf kept without score");
                None
            }
        },
        _ => None,
    };
    (text, preview)
}

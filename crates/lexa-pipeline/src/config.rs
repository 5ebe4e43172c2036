use lexa_archive::ExtractionLimits;
use lexa_score::ScoringOptions;
use serde::{Deserialize, Serialize};

/// How a leaf's decoded bytes are retained for previewing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewMode {
    /// Keep the payload in memory.
    #[default]
    Memory,
    /// Spill the payload to a temporary file removed when the handle is released.
    TempFile,
    /// Keep nothing.
    None,
}

/// Optional result-set features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Allow attaching a person name to each result.
    pub annotations: bool,
    /// Allow exporting the result table as a spreadsheet.
    pub export: bool,
}

/// Configuration of one [`Pipeline`](crate::Pipeline).
///
/// # Example
///
/// ```
/// use lexa_pipeline::{PipelineConfig, PreviewMode};
///
/// let config = PipelineConfig::default()
///     .concurrency(8)
///     .emit_unsupported(true)
///     .preview(PreviewMode::None);
/// assert_eq!(config.concurrency, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub limits: ExtractionLimits,
    pub scoring: ScoringOptions,
    /// Leaves extracted and scored at the same time.
    pub concurrency: usize,
    /// Emit non-document leaves as unscored rows instead of dropping them.
    pub emit_unsupported: bool,
    pub capabilities: Capabilities,
    pub preview: PreviewMode,
}

impl PipelineConfig {
    pub const DEFAULT_CONCURRENCY: usize = 4;

    pub fn limits(mut self, limits: ExtractionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn scoring(mut self, scoring: ScoringOptions) -> Self {
        self.scoring = scoring;
        self
    }

    /// Zero is treated as one.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn emit_unsupported(mut self, emit: bool) -> Self {
        self.emit_unsupported = emit;
        self
    }

    pub fn annotations(mut self, enabled: bool) -> Self {
        self.capabilities.annotations = enabled;
        self
    }

    pub fn export(mut self, enabled: bool) -> Self {
        self.capabilities.export = enabled;
        self
    }

    pub fn preview(mut self, mode: PreviewMode) -> Self {
        self.preview = mode;
        self
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            limits: ExtractionLimits::default(),
            scoring: ScoringOptions::default(),
            concurrency: Self::DEFAULT_CONCURRENCY,
            emit_unsupported: false,
            capabilities: Capabilities::default(),
            preview: PreviewMode::default(),
        }
    }
}

//! Classifier-backed scoring: a backend labels each text, a [`LabelTable`]
//! turns labels into numbers, and the batch value is the mean.

use crate::config::ClassifierConfig;
use crate::error::AnalysisError;
use crate::inference::HttpClassifier;
use crate::result::AnalysisKind;
use crate::scorer::Scorer;
use anyhow::Result;
use std::fmt;

/// Where inference runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Accelerator,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Accelerator => f.write_str("accelerator"),
        }
    }
}

/// A text-classification runtime returning exactly one label per input.
pub trait ClassifierBackend: Send + Sync {
    fn name(&self) -> &str;

    fn device(&self) -> Device;

    /// Full label set the model can emit, when the runtime exposes it.
    fn declared_labels(&self) -> Option<Vec<String>> {
        None
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<String>, AnalysisError>;
}

/// Initialise a backend on the preferred device. An accelerator that cannot be
/// used is logged and replaced by CPU; every other failure is returned.
pub fn init_with_fallback<B, F>(prefer: Device, mut init: F) -> Result<B, AnalysisError>
where
    F: FnMut(Device) -> Result<B, AnalysisError>,
{
    match prefer {
        Device::Cpu => init(Device::Cpu),
        Device::Accelerator => match init(Device::Accelerator) {
            Err(AnalysisError::AcceleratorUnavailable(reason)) => {
                tracing::warn!("Accelerator unavailable ({}); continuing on CPU", reason);
                init(Device::Cpu)
            }
            other => other,
        },
    }
}

/// Exhaustive label -> value mapping for one model.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTable {
    entries: Vec<(String, f64)>, // sorted by label
}

impl LabelTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, f64)> = entries.into_iter().map(|(l, v)| (l.into(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        Self { entries }
    }

    /// Tables for the models each classifier kind is run with.
    pub fn for_kind(kind: AnalysisKind) -> Option<Self> {
        match kind {
            AnalysisKind::Sentiment => Some(Self::new([("LABEL_0", -1.0), ("LABEL_1", 0.0), ("LABEL_2", 1.0)])),
            AnalysisKind::Nsfwness => Some(Self::new([("safe", 0.0), ("nsfw", 1.0)])),
            AnalysisKind::Polarity => None,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn value(&self, label: &str) -> Option<f64> {
        self.entries
            .binary_search_by(|(l, _)| l.as_str().cmp(label))
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn map(&self, backend: &str, label: &str) -> Result<f64, AnalysisError> {
        self.value(label).ok_or_else(|| AnalysisError::UnknownLabel {
            backend: backend.to_string(),
            label: label.to_string(),
            expected: self.labels(),
        })
    }

    /// The backend's declared label set must match the table exactly.
    pub fn check_declared(&self, backend: &str, declared: &[String]) -> Result<(), AnalysisError> {
        let mut declared: Vec<String> = declared.to_vec();
        declared.sort();
        declared.dedup();
        let table = self.labels();
        if declared != table {
            return Err(AnalysisError::LabelSetMismatch { backend: backend.to_string(), declared, table });
        }
        Ok(())
    }
}

/// Keep at most `max_tokens` whitespace-separated tokens.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    let mut words = text.split_whitespace();
    let head: Vec<&str> = words.by_ref().take(max_tokens).collect();
    if words.next().is_none() {
        text.to_string()
    } else {
        head.join(" ")
    }
}

pub struct ClassifierScorer {
    kind: AnalysisKind,
    backend: Box<dyn ClassifierBackend>,
    table: LabelTable,
    max_tokens: usize,
    batch_size: usize,
}

impl ClassifierScorer {
    pub const DEFAULT_MAX_TOKENS: usize = 511;
    pub const DEFAULT_BATCH_SIZE: usize = 32;

    pub fn new(kind: AnalysisKind, backend: Box<dyn ClassifierBackend>, table: LabelTable) -> Result<Self, AnalysisError> {
        if let Some(declared) = backend.declared_labels() {
            table.check_declared(backend.name(), &declared)?;
        }
        Ok(Self {
            kind,
            backend,
            table,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        })
    }

    /// Use the built-in label table for `kind`.
    pub fn for_kind(kind: AnalysisKind, backend: Box<dyn ClassifierBackend>) -> Result<Self, AnalysisError> {
        let table = LabelTable::for_kind(kind)
            .ok_or_else(|| AnalysisError::Backend(format!("{} is not a classifier analysis", kind)))?;
        Self::new(kind, backend, table)
    }

    /// Connect the HTTP inference backend described by `cfg`, falling back to
    /// CPU when the accelerator is requested but unavailable.
    pub fn from_config(kind: AnalysisKind, cfg: &ClassifierConfig) -> Result<Self, AnalysisError> {
        let prefer = if cfg.use_gpu { Device::Accelerator } else { Device::Cpu };
        let backend = init_with_fallback(prefer, |device| HttpClassifier::connect(cfg, device))?;
        tracing::info!("Classifier {} ready on {}", backend.name(), backend.device());
        Ok(Self::for_kind(kind, Box::new(backend))?
            .with_max_tokens(cfg.max_tokens)
            .with_batch_size(cfg.batch_size))
    }

    pub fn with_max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n.max(1);
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn device(&self) -> Device {
        self.backend.device()
    }

    pub fn table(&self) -> &LabelTable {
        &self.table
    }

    /// Mapped value per input, in input order.
    pub fn classify_values(&self, texts: &[String]) -> Result<Vec<f64>, AnalysisError> {
        let mut values = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let truncated: Vec<String> = chunk.iter().map(|t| truncate_tokens(t, self.max_tokens)).collect();
            let labels = self.backend.classify(&truncated)?;
            if labels.len() != truncated.len() {
                return Err(AnalysisError::LabelCountMismatch { sent: truncated.len(), got: labels.len() });
            }
            for label in &labels {
                values.push(self.table.map(self.backend.name(), label)?);
            }
        }
        Ok(values)
    }
}

impl Scorer for ClassifierScorer {
    fn kind(&self) -> AnalysisKind {
        self.kind
    }

    fn score(&self, text: &str) -> Result<f64> {
        let values = self.classify_values(&[text.to_string()])?;
        values
            .first()
            .copied()
            .ok_or_else(|| AnalysisError::LabelCountMismatch { sent: 1, got: 0 }.into())
    }

    fn score_batch(&self, texts: &[String]) -> Result<Option<f64>> {
        if texts.is_empty() {
            return Ok(None);
        }
        let values = self.classify_values(texts)?;
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }
}

use crate::date::DayPolicy;
use crate::result::AnalysisKind;
use std::fmt;
use std::str::FromStr;

/// How a day's comments are reduced to one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AggregationMode {
    /// Hand the whole day to the scorer as one batch (one backend round-trip per chunk).
    #[default]
    Batch,
    /// Score comments one by one; non-finite scores are dropped before the mean.
    PerItem,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Batch => f.write_str("batch"),
            AggregationMode::PerItem => f.write_str("per-item"),
        }
    }
}

impl FromStr for AggregationMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batch" => Ok(AggregationMode::Batch),
            "per-item" | "per_item" | "item" | "items" => Ok(AggregationMode::PerItem),
            other => Err(format!("unknown aggregation mode {:?} (batch, per-item)", other)),
        }
    }
}

/// Aggregation options with builder chaining.
#[derive(Clone, Debug)]
pub struct AnalysisOptions {
    pub score_threshold: i64,     // keep comments with score strictly above
    pub min_samples: usize,       // emit a day only when it has strictly more samples
    pub day_policy: DayPolicy,    // timestamp -> calendar day
    pub mode: AggregationMode,
    pub normalize_text: bool,     // run bodies through the normalizer before scoring
    pub parallelism: usize,       // per-day scoring workers; 1 = sequential
    pub progress: bool,           // show progress bars
    pub progress_label: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            score_threshold: 1,
            min_samples: 5,
            day_policy: DayPolicy::Utc,
            mode: AggregationMode::Batch,
            normalize_text: true,
            parallelism: 1,
            progress: true,
            progress_label: None,
        }
    }
}

impl AnalysisOptions {
    pub fn with_score_threshold(mut self, threshold: i64) -> Self {
        self.score_threshold = threshold;
        self
    }
    pub fn with_min_samples(mut self, n: usize) -> Self {
        self.min_samples = n;
        self
    }
    pub fn with_day_policy(mut self, policy: DayPolicy) -> Self {
        self.day_policy = policy;
        self
    }
    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }
    pub fn with_normalize_text(mut self, yes: bool) -> Self {
        self.normalize_text = yes;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = threads.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}

/// Connection settings for the HTTP text-classification backend.
/// Credentials live here and nowhere else.
#[derive(Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,          // base URL; requests go to {endpoint}/models/{model}
    pub model: String,
    pub api_token: Option<String>,
    pub use_gpu: bool,             // prefer the accelerator, fall back to CPU
    pub max_tokens: usize,         // per-text truncation
    pub batch_size: usize,         // texts per request
    pub timeout_secs: u64,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("use_gpu", &self.use_gpu)
            .field("max_tokens", &self.max_tokens)
            .field("batch_size", &self.batch_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co".to_string(),
            model: Self::default_model(AnalysisKind::Sentiment).unwrap_or_default().to_string(),
            api_token: None,
            use_gpu: false,
            max_tokens: 511,
            batch_size: 32,
            timeout_secs: 120,
        }
    }
}

impl ClassifierConfig {
    /// Model each classifier analysis is run with (the label tables match these).
    pub fn default_model(kind: AnalysisKind) -> Option<&'static str> {
        match kind {
            AnalysisKind::Sentiment => Some("cardiffnlp/twitter-roberta-base-sentiment"),
            AnalysisKind::Nsfwness => Some("eliasalbouzidi/distilbert-nsfw-text-classifier"),
            AnalysisKind::Polarity => None,
        }
    }

    pub fn for_kind(kind: AnalysisKind) -> Self {
        let mut cfg = Self::default();
        if let Some(model) = Self::default_model(kind) {
            cfg.model = model.to_string();
        }
        cfg
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }
    pub fn with_gpu(mut self, yes: bool) -> Self {
        self.use_gpu = yes;
        self
    }
    pub fn with_max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n.max(1);
        self
    }
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }
}

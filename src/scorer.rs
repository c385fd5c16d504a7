//! Scoring seam between the trajectory aggregator and the concrete backends.

use crate::classifier::ClassifierScorer;
use crate::lexical::LexicalScorer;
use crate::result::AnalysisKind;
use anyhow::Result;

/// Maps text to a scalar. Implementations must be shareable across the
/// per-day worker pool.
pub trait Scorer: Send + Sync {
    /// Which measurement the produced values represent.
    fn kind(&self) -> AnalysisKind;

    fn score(&self, text: &str) -> Result<f64>;

    /// Mean score over `texts`; `None` for an empty batch.
    fn score_batch(&self, texts: &[String]) -> Result<Option<f64>> {
        if texts.is_empty() {
            return Ok(None);
        }
        let mut total = 0.0;
        for t in texts {
            total += self.score(t)?;
        }
        Ok(Some(total / texts.len() as f64))
    }
}

/// The configured scoring strategy.
pub enum ScoringBackend {
    Lexical(LexicalScorer),
    Classifier(ClassifierScorer),
}

impl ScoringBackend {
    pub fn name(&self) -> String {
        match self {
            ScoringBackend::Lexical(_) => "lexical".to_string(),
            ScoringBackend::Classifier(c) => format!("classifier:{}", c.backend_name()),
        }
    }
}

impl Scorer for ScoringBackend {
    fn kind(&self) -> AnalysisKind {
        match self {
            ScoringBackend::Lexical(s) => s.kind(),
            ScoringBackend::Classifier(s) => s.kind(),
        }
    }

    fn score(&self, text: &str) -> Result<f64> {
        match self {
            ScoringBackend::Lexical(s) => s.score(text),
            ScoringBackend::Classifier(s) => s.score(text),
        }
    }

    fn score_batch(&self, texts: &[String]) -> Result<Option<f64>> {
        match self {
            ScoringBackend::Lexical(s) => s.score_batch(texts),
            ScoringBackend::Classifier(s) => s.score_batch(texts),
        }
    }
}

impl From<LexicalScorer> for ScoringBackend {
    fn from(s: LexicalScorer) -> Self {
        ScoringBackend::Lexical(s)
    }
}

impl From<ClassifierScorer> for ScoringBackend {
    fn from(s: ClassifierScorer) -> Self {
        ScoringBackend::Classifier(s)
    }
}

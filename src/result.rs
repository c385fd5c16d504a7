use crate::date::Day;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a trajectory measures. Serialized as the `analysis_type` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// Three-way classifier sentiment mapped to -1 / 0 / 1.
    Sentiment,
    /// Binary safe/nsfw classifier mapped to 0 / 1.
    Nsfwness,
    /// Lexical polarity estimate in (-1, 1).
    Polarity,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Sentiment => "sentiment",
            AnalysisKind::Nsfwness => "nsfwness",
            AnalysisKind::Polarity => "polarity",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentiment" => Ok(AnalysisKind::Sentiment),
            "nsfwness" | "nsfw" => Ok(AnalysisKind::Nsfwness),
            "polarity" | "lexical" => Ok(AnalysisKind::Polarity),
            other => Err(format!("unknown analysis kind {:?} (sentiment, nsfwness, polarity)", other)),
        }
    }
}

/// One emitted day. Serialized as a `["YYYY-MM-DD", value]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Day, f64)", into = "(Day, f64)")]
pub struct TrajectoryPoint {
    pub date: Day,
    pub value: f64,
}

impl From<(Day, f64)> for TrajectoryPoint {
    fn from((date, value): (Day, f64)) -> Self {
        Self { date, value }
    }
}

impl From<TrajectoryPoint> for (Day, f64) {
    fn from(p: TrajectoryPoint) -> Self {
        (p.date, p.value)
    }
}

/// Persisted output of one analysis: the kind tag and its ascending points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_type: AnalysisKind,
    pub dates: Vec<TrajectoryPoint>,
}

impl AnalysisResult {
    pub fn new(kind: AnalysisKind) -> Self {
        Self { analysis_type: kind, dates: Vec::new() }
    }

    pub fn with_points(kind: AnalysisKind, points: Vec<TrajectoryPoint>) -> Result<Self, AnalysisError> {
        let r = Self { analysis_type: kind, dates: points };
        r.validate()?;
        Ok(r)
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.dates
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Check that dates are strictly ascending and every value is finite.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some(p) = self.dates.iter().find(|p| !p.value.is_finite()) {
            return Err(AnalysisError::NonFiniteValue { date: p.date.to_string(), value: p.value });
        }
        for pair in self.dates.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(AnalysisError::UnsortedTrajectory(pair[1].date.to_string()));
            }
        }
        Ok(())
    }

    /// Merge `points` into this result. A point for a day already present
    /// replaces the stored one; the result stays strictly ascending.
    pub fn absorb(&mut self, points: impl IntoIterator<Item = TrajectoryPoint>) {
        for p in points {
            match self.dates.binary_search_by(|q| q.date.cmp(&p.date)) {
                Ok(i) => self.dates[i] = p,
                Err(i) => self.dates.insert(i, p),
            }
        }
    }

    /// Merge another result of the same kind (see [`AnalysisResult::absorb`]).
    pub fn merge(&mut self, other: AnalysisResult) -> Result<(), AnalysisError> {
        if other.analysis_type != self.analysis_type {
            return Err(AnalysisError::KindMismatch {
                existing: self.analysis_type.to_string(),
                incoming: other.analysis_type.to_string(),
            });
        }
        self.absorb(other.dates);
        Ok(())
    }
}

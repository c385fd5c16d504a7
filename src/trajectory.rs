//! Daily trajectory aggregation: filter popular comments, bucket them by
//! calendar day, score each sufficiently large day, emit points in date order.

use crate::config::{AggregationMode, AnalysisOptions};
use crate::date::{Day, DayPolicy};
use crate::lexical::LexicalScorer;
use crate::model::Post;
use crate::normalize::normalize;
use crate::progress::ProgressScope;
use crate::result::{AnalysisKind, AnalysisResult, TrajectoryPoint};
use crate::scorer::{Scorer, ScoringBackend};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Comment bodies that fell on one calendar day. Built per run, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct DailyBucket {
    pub day: Day,
    pub bodies: Vec<String>,
}

pub struct TrajectoryAnalyzer {
    pub(crate) opts: AnalysisOptions,
    scorer: ScoringBackend,
}

impl TrajectoryAnalyzer {
    pub fn new(scorer: impl Into<ScoringBackend>) -> Self {
        Self { opts: AnalysisOptions::default(), scorer: scorer.into() }
    }

    /// Analyzer over the built-in lexical polarity estimator.
    pub fn lexical() -> Self {
        Self::new(LexicalScorer::new())
    }

    // -------- Builder methods --------
    pub fn options(mut self, opts: AnalysisOptions) -> Self { self.opts = opts; self }
    pub fn score_threshold(mut self, t: i64) -> Self { self.opts = self.opts.with_score_threshold(t); self }
    pub fn min_samples(mut self, n: usize) -> Self { self.opts = self.opts.with_min_samples(n); self }
    pub fn day_policy(mut self, p: DayPolicy) -> Self { self.opts = self.opts.with_day_policy(p); self }
    pub fn mode(mut self, m: AggregationMode) -> Self { self.opts = self.opts.with_mode(m); self }
    pub fn normalize_text(mut self, yes: bool) -> Self { self.opts = self.opts.with_normalize_text(yes); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }

    pub fn opts(&self) -> &AnalysisOptions {
        &self.opts
    }

    pub fn kind(&self) -> AnalysisKind {
        self.scorer.kind()
    }

    pub fn scorer(&self) -> &ScoringBackend {
        &self.scorer
    }

    /// Flatten posts, keep comments with `score > score_threshold`, and group
    /// their (normalized) bodies by day. Returned in ascending date order.
    pub fn collect_buckets(&self, posts: &[Post]) -> Result<Vec<DailyBucket>> {
        let label = self.opts.progress_label.as_deref().unwrap_or("Collecting comments");
        let pb = ProgressScope::count(self.opts.progress, label, posts.len() as u64);
        let mut days: BTreeMap<Day, Vec<String>> = BTreeMap::new();
        let (mut kept, mut dropped) = (0usize, 0usize);

        for (i, post) in posts.iter().enumerate() {
            for comment in &post.comments {
                if comment.score <= self.opts.score_threshold {
                    dropped += 1;
                    continue;
                }
                let day = self
                    .opts
                    .day_policy
                    .day_of(comment.created_utc)
                    .with_context(|| format!("comment {} in post {}", comment.id, post.id))?;
                let body = if self.opts.normalize_text { normalize(&comment.body) } else { comment.body.clone() };
                days.entry(day).or_default().push(body);
                kept += 1;
            }
            tracing::debug!("Collected comments from post {} of {}", i + 1, posts.len());
            pb.inc(1);
        }
        pb.finish("Comments collected");
        tracing::info!(
            "Bucketed {} comments into {} days ({} at or below score {})",
            kept,
            days.len(),
            dropped,
            self.opts.score_threshold
        );

        Ok(days.into_iter().map(|(day, bodies)| DailyBucket { day, bodies }).collect())
    }

    /// Reduce one bucket to its value, or `None` when the day has too few samples.
    pub fn reduce_bucket(&self, bucket: &DailyBucket) -> Result<Option<f64>> {
        let min = self.opts.min_samples;
        if bucket.bodies.len() <= min {
            return Ok(None);
        }
        let value = match self.opts.mode {
            AggregationMode::Batch => self.scorer.score_batch(&bucket.bodies)?,
            AggregationMode::PerItem => {
                let mut scores = Vec::with_capacity(bucket.bodies.len());
                for body in &bucket.bodies {
                    let s = self.scorer.score(body)?;
                    if s.is_finite() {
                        scores.push(s);
                    }
                }
                if scores.len() <= min {
                    None
                } else {
                    Some(scores.iter().sum::<f64>() / scores.len() as f64)
                }
            }
        };
        Ok(value.filter(|v| v.is_finite()))
    }

    /// Build a fresh trajectory from `posts`. Days are not gap-filled.
    pub fn build_trajectory(&self, posts: &[Post]) -> Result<Vec<TrajectoryPoint>> {
        let buckets = self.collect_buckets(posts)?;
        let total = buckets.len();
        let pb = ProgressScope::count(self.opts.progress, "Scoring days", total as u64);

        let reduce = |(i, bucket): (usize, &DailyBucket)| -> Result<Option<TrajectoryPoint>> {
            let value = self
                .reduce_bucket(bucket)
                .with_context(|| format!("scoring {}", bucket.day))?;
            match value {
                Some(_) => tracing::debug!("Analyzed date {} of {} ({})", i + 1, total, bucket.day),
                None => tracing::debug!("Low comment count on date {} of {} ({})", i + 1, total, bucket.day),
            }
            pb.inc(1);
            Ok(value.map(|value| TrajectoryPoint { date: bucket.day, value }))
        };

        // Buckets are already in date order; indexed collection keeps it.
        let scored: Vec<Option<TrajectoryPoint>> = if self.opts.parallelism > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.opts.parallelism)
                .build()
                .context("build scoring thread pool")?;
            pool.install(|| buckets.par_iter().enumerate().map(reduce).collect::<Result<Vec<_>>>())?
        } else {
            buckets.iter().enumerate().map(reduce).collect::<Result<Vec<_>>>()?
        };
        pb.finish("Days scored");

        let points: Vec<TrajectoryPoint> = scored.into_iter().flatten().collect();
        tracing::info!("Emitted {} of {} days ({})", points.len(), total, self.scorer.name());
        Ok(points)
    }

    /// Build a new result (replace semantics).
    pub fn analyze(&self, posts: &[Post]) -> Result<AnalysisResult> {
        let points = self.build_trajectory(posts)?;
        Ok(AnalysisResult::with_points(self.kind(), points)?)
    }

    /// Merge this run's points into `result` (append semantics: same-day points
    /// are replaced, order is kept). `result` must be of this analyzer's kind.
    pub fn analyze_into(&self, posts: &[Post], result: &mut AnalysisResult) -> Result<()> {
        let fresh = self.analyze(posts)?;
        result.merge(fresh)?;
        Ok(())
    }
}

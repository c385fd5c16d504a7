#![allow(dead_code)]

use sentimentopolis::{AnalysisError, ClassifierBackend, Comment, Device, Post};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// 2024-01-01T00:00:00Z
pub const JAN1_2024: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;
pub const HOUR: i64 = 3_600;

pub fn comment(id: &str, body: &str, created_utc: i64, score: i64) -> Comment {
    Comment {
        id: id.to_string(),
        author: Some(format!("user_{}", id)),
        body: body.to_string(),
        created_utc,
        score,
    }
}

pub fn post(id: &str, created_utc: i64, comments: Vec<Comment>) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Thread {}", id),
        selftext: String::new(),
        url: format!("https://www.reddit.com/r/DestinyTheGame/comments/{}/", id),
        author: Some("op".to_string()),
        created_utc,
        score: 42,
        comments,
    }
}

/// `scores.len()` comments with the same body at `created_utc + i` seconds.
pub fn comments_on(prefix: &str, created_utc: i64, body: &str, scores: &[i64]) -> Vec<Comment> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| comment(&format!("{}{}", prefix, i), body, created_utc + i as i64, *s))
        .collect()
}

/// A small multi-day corpus spread over three posts whose order is not
/// chronological. Every comment scores 10, so all pass the default threshold.
///
/// - 2024-01-03: 6 comments ("worst patch ever") -> emitted with min_samples 5
/// - 2024-01-01: 7 comments ("great raid, love it")
/// - 2024-01-02: 3 comments -> too few
/// - 2024-01-04: 8 comments mixed positive/negative
pub fn corpus_multi_day() -> Vec<Post> {
    let p1 = post("p1", JAN1_2024 + 2 * DAY, comments_on("a", JAN1_2024 + 2 * DAY + 5 * HOUR, "worst patch ever", &[10; 6]));
    let p2 = post(
        "p2",
        JAN1_2024,
        [
            comments_on("b", JAN1_2024 + 9 * HOUR, "great raid, love it", &[10; 7]),
            comments_on("c", JAN1_2024 + DAY + 3 * HOUR, "meh", &[10; 3]),
        ]
        .concat(),
    );
    let p3 = post(
        "p3",
        JAN1_2024 + 3 * DAY,
        [
            comments_on("d", JAN1_2024 + 3 * DAY + HOUR, "really good drops!", &[10; 4]),
            comments_on("e", JAN1_2024 + 3 * DAY + 2 * HOUR, "not fun, boring grind", &[10; 4]),
        ]
        .concat(),
    );
    vec![p1, p2, p3]
}

/// Test double for a text-classification runtime: the first rule whose keyword
/// occurs in the text decides the label, otherwise `default_label`.
pub struct StubClassifier {
    pub rules: Vec<(String, String)>,
    pub default_label: String,
    pub declared: Option<Vec<String>>,
    pub device: Device,
    pub calls: AtomicUsize,
    pub max_tokens_seen: AtomicUsize,
    pub drop_one: bool,
    pub batches: Mutex<Vec<usize>>,
}

impl StubClassifier {
    pub fn new(default_label: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_label: default_label.to_string(),
            declared: None,
            device: Device::Cpu,
            calls: AtomicUsize::new(0),
            max_tokens_seen: AtomicUsize::new(0),
            drop_one: false,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn rule(mut self, keyword: &str, label: &str) -> Self {
        self.rules.push((keyword.to_string(), label.to_string()));
        self
    }

    pub fn declare(mut self, labels: &[&str]) -> Self {
        self.declared = Some(labels.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn on(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sentiment stub: "love" -> positive, "hate" -> negative, else neutral.
    pub fn sentiment() -> Self {
        Self::new("LABEL_1").rule("love", "LABEL_2").rule("hate", "LABEL_0")
    }
}

impl ClassifierBackend for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn device(&self) -> Device {
        self.device
    }

    fn declared_labels(&self) -> Option<Vec<String>> {
        self.declared.clone()
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<String>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(texts.len());
        let mut labels = Vec::with_capacity(texts.len());
        for t in texts {
            self.max_tokens_seen.fetch_max(t.split_whitespace().count(), Ordering::SeqCst);
            let label = self
                .rules
                .iter()
                .find(|(kw, _)| t.contains(kw.as_str()))
                .map(|(_, l)| l.clone())
                .unwrap_or_else(|| self.default_label.clone());
            labels.push(label);
        }
        if self.drop_one {
            labels.pop();
        }
        Ok(labels)
    }
}

/// Find a domain error anywhere in an anyhow chain.
pub fn domain_error(err: &anyhow::Error) -> Option<&AnalysisError> {
    err.chain().find_map(|e| e.downcast_ref::<AnalysisError>())
}

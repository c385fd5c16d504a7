//! HTTP text-classification backend (Hugging Face inference API shape).
//!
//! Request:  `POST {endpoint}/models/{model}` with
//! `{"inputs": [...], "parameters": {"truncation": true, "max_length": N},
//!   "options": {"use_gpu": bool, "wait_for_model": true}}`.
//! Response: per input either a list of `{label, score}` candidates or a single
//! `{label, score}`; the highest-scoring candidate's label is used.

use crate::classifier::{ClassifierBackend, Device};
use crate::config::ClassifierConfig;
use crate::error::AnalysisError;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct Request<'a> {
    inputs: &'a [String],
    parameters: Parameters,
    options: Options,
}

#[derive(Serialize)]
struct Parameters {
    truncation: bool,
    max_length: usize,
}

#[derive(Serialize)]
struct Options {
    use_gpu: bool,
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response {
    PerInput(Vec<Vec<Candidate>>),
    Flat(Vec<Candidate>),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: serde_json::Value,
}

pub struct HttpClassifier {
    client: Client,
    url: String,
    model: String,
    api_token: Option<String>,
    device: Device,
    max_tokens: usize,
}

impl HttpClassifier {
    /// Build the client and send one warm-up request so configuration and
    /// device problems surface before any data is processed.
    pub fn connect(cfg: &ClassifierConfig, device: Device) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(Duration::from_secs(cfg.timeout_secs)).build()?;
        let backend = Self {
            client,
            url: format!("{}/models/{}", cfg.endpoint.trim_end_matches('/'), cfg.model),
            model: cfg.model.clone(),
            api_token: cfg.api_token.clone(),
            device,
            max_tokens: cfg.max_tokens,
        };
        tracing::debug!("Warming up {} on {}", backend.url, device);
        backend.classify(&["warm up".to_string()])?;
        Ok(backend)
    }

    fn describe_error(&self, status: reqwest::StatusCode, body: &str) -> AnalysisError {
        let msg = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { error: serde_json::Value::String(s) }) => s,
            Ok(ErrorBody { error }) => error.to_string(),
            Err(_) => body.trim().to_string(),
        };
        if self.device == Device::Accelerator && mentions_accelerator(&msg) {
            return AnalysisError::AcceleratorUnavailable(msg);
        }
        AnalysisError::Backend(format!("{} returned {}: {}", self.url, status, msg))
    }
}

fn mentions_accelerator(msg: &str) -> bool {
    let m = msg.to_ascii_lowercase();
    m.contains("gpu") || m.contains("cuda") || m.contains("accelerat")
}

fn top_label(candidates: Vec<Candidate>) -> Result<String, AnalysisError> {
    candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|c| c.label)
        .ok_or_else(|| AnalysisError::Backend("empty candidate list in response".into()))
}

impl ClassifierBackend for HttpClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    fn device(&self) -> Device {
        self.device
    }

    fn classify(&self, texts: &[String]) -> Result<Vec<String>, AnalysisError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = Request {
            inputs: texts,
            parameters: Parameters { truncation: true, max_length: self.max_tokens },
            options: Options { use_gpu: self.device == Device::Accelerator, wait_for_model: true },
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        let resp = req.send()?;
        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(self.describe_error(status, &text));
        }
        let parsed: Response = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::Backend(format!("unexpected response from {}: {}", self.url, e)))?;
        match parsed {
            Response::PerInput(rows) => rows.into_iter().map(top_label).collect(),
            Response::Flat(rows) => Ok(rows.into_iter().map(|c| c.label).collect()),
        }
    }
}

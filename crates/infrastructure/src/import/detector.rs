//! Content sniffing.
//!
//! JSON documents are scored against every JSON dialect by counting how many
//! of its discriminating fields are present; the best score wins. Content that
//! does not parse as JSON falls through to line-oriented `.env` detection.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use portage_domain::{DetectionResult, ImportFormat, RawDocument};

use super::config::ImportConfig;
use super::dotenv::{content_lines, parse_line};
use crate::native::NATIVE_TYPE;

static SCHEMA_VERSION: OnceLock<Regex> = OnceLock::new();

/// A dialect's score before the threshold is applied.
struct Score {
    format: ImportFormat,
    version: Option<String>,
    confidence: f64,
}

impl Score {
    #[allow(clippy::cast_precision_loss)]
    fn of(format: ImportFormat, version: Option<String>, checks: &[bool]) -> Self {
        let hits = checks.iter().filter(|c| **c).count();
        Self {
            format,
            version,
            confidence: hits as f64 / checks.len() as f64,
        }
    }
}

/// Classifies a document. Never fails; unknown content is reported as
/// unrecognized.
#[must_use]
pub fn detect(document: &RawDocument, config: &ImportConfig) -> DetectionResult {
    if !config.admits_size(&document.content) {
        tracing::debug!(
            size = document.content.len(),
            max = config.max_file_size,
            "Document exceeds size limit; not sniffed"
        );
        return DetectionResult::unrecognized();
    }

    let result = match serde_json::from_str::<Value>(&document.content) {
        Ok(Value::Object(root)) => detect_json(&root, config.min_confidence),
        Ok(_) => DetectionResult::unrecognized(),
        Err(_) => detect_dotenv(document, config.min_confidence),
    };
    tracing::debug!(
        format = ?result.format,
        confidence = result.confidence,
        valid = result.is_valid,
        "Detected document format"
    );
    result
}

fn detect_json(root: &Map<String, Value>, threshold: f64) -> DetectionResult {
    let scores = [
        score_native(root),
        score_postman_v2(root),
        score_postman_v1(root),
        score_environment(root),
    ];
    // Earlier candidates win ties.
    let best = scores
        .into_iter()
        .flatten()
        .fold(None::<Score>, |best, candidate| match best {
            Some(b) if b.confidence >= candidate.confidence => Some(b),
            _ => Some(candidate),
        });

    match best {
        Some(score) if score.confidence > 0.0 => {
            DetectionResult::recognized(score.format, score.version, score.confidence, threshold)
        }
        _ => DetectionResult::unrecognized(),
    }
}

fn is_array(root: &Map<String, Value>, field: &str) -> bool {
    root.get(field).is_some_and(Value::is_array)
}

fn score_native(root: &Map<String, Value>) -> Option<Score> {
    if root.get("type").and_then(Value::as_str) != Some(NATIVE_TYPE) {
        return None;
    }
    let version = root.get("version").and_then(Value::as_str).map(str::to_string);
    Some(Score::of(
        ImportFormat::Native,
        version.clone(),
        &[
            true,
            version.is_some(),
            root.get("collection").is_some_and(Value::is_object),
            is_array(root, "requests") || is_array(root, "folders"),
        ],
    ))
}

fn schema(root: &Map<String, Value>) -> Option<&str> {
    root.get("info")
        .and_then(|info| info.get("schema"))
        .and_then(Value::as_str)
}

#[allow(clippy::expect_used)]
fn schema_version(schema: &str) -> Option<String> {
    SCHEMA_VERSION
        .get_or_init(|| Regex::new(r"v(\d+(?:\.\d+){0,2})").expect("valid regex"))
        .captures(schema)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn score_postman_v2(root: &Map<String, Value>) -> Option<Score> {
    let has_info = root.get("info").is_some_and(Value::is_object);
    let has_items = is_array(root, "item");
    if !has_info && !has_items {
        return None;
    }
    let schema = schema(root);
    let is_v2 = schema.is_some_and(|s| s.contains("v2"));
    if schema.is_some() && !is_v2 {
        return None;
    }
    Some(Score::of(
        ImportFormat::PostmanV2,
        schema.and_then(schema_version),
        &[has_info, is_v2, has_items],
    ))
}

fn score_postman_v1(root: &Map<String, Value>) -> Option<Score> {
    if schema(root).is_some() {
        return None;
    }
    let has_folders = is_array(root, "folders");
    let has_requests = is_array(root, "requests");
    if !has_folders && !has_requests {
        return None;
    }
    Some(Score::of(
        ImportFormat::PostmanV1,
        Some("1.0".to_string()),
        &[
            root.get("name").is_some_and(Value::is_string),
            has_folders,
            has_requests,
            is_array(root, "order"),
        ],
    ))
}

fn score_environment(root: &Map<String, Value>) -> Option<Score> {
    if root.contains_key("info") {
        return None;
    }
    let values = root.get("values").and_then(Value::as_array)?;
    let keyed = !values.is_empty() && values.iter().all(|v| v.get("key").is_some());
    Some(Score::of(
        ImportFormat::PostmanEnvironment,
        None,
        &[
            root.contains_key("id"),
            root.get("name").is_some_and(Value::is_string),
            true,
            keyed,
        ],
    ))
}

/// `.env` confidence is the share of content lines in `KEY=VALUE` form.
#[allow(clippy::cast_precision_loss)]
fn detect_dotenv(document: &RawDocument, threshold: f64) -> DetectionResult {
    let mut total = 0usize;
    let mut matched = 0usize;
    for (_, line) in content_lines(&document.content) {
        total += 1;
        if parse_line(line).is_some() {
            matched += 1;
        }
    }

    if total == 0 {
        // Blank or comment-only text is only an environment when the name says so.
        return if document.extension().as_deref() == Some("env") {
            DetectionResult::recognized(ImportFormat::DotEnv, None, 1.0, threshold)
        } else {
            DetectionResult::unrecognized()
        };
    }
    if matched == 0 {
        return DetectionResult::unrecognized();
    }
    DetectionResult::recognized(
        ImportFormat::DotEnv,
        None,
        matched as f64 / total as f64,
        threshold,
    )
}

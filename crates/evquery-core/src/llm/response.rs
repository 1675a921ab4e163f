//! Model response parsing
//!
//! Models are asked for a bare JSON object but regularly wrap it in markdown
//! fences or emit slightly broken JSON. Parsing strips one layer of fencing and
//! then runs an ordered list of strategies; the first one that yields a
//! non-empty query wins.

use crate::error::{EvQueryError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref QUERY_FIELD_RE: Regex =
        Regex::new(r#""query"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap();
}

/// Query candidate extracted from a model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCandidate {
    /// Everything query, trimmed and non-empty
    pub query: String,

    /// Model-reported confidence (0.0 - 1.0)
    pub confidence: Option<f64>,

    /// Syntax rules the model claims to have applied
    pub rules_used: Vec<String>,

    /// Alternative queries suggested by the model
    pub alternatives: Vec<String>,

    /// The original request as echoed back by the model
    pub original_query: Option<String>,
}

impl ParsedCandidate {
    fn bare(query: String) -> Self {
        Self {
            query,
            confidence: None,
            rules_used: vec![],
            alternatives: vec![],
            original_query: None,
        }
    }
}

/// A parsing strategy: pure function from cleaned text to an optional candidate
type ParseStrategy = fn(&str) -> Option<ParsedCandidate>;

/// Name of the strategy that decodes the reply as a whole JSON object
pub(crate) const STRICT_JSON: &str = "strict_json";

/// Strategies in the order they are attempted
const STRATEGIES: &[(&str, ParseStrategy)] = &[
    (STRICT_JSON, strict_json),
    ("query_field_pattern", query_field_pattern),
];

/// Extract a query candidate from raw model output
pub fn parse_response(raw: &str) -> Result<ParsedCandidate> {
    extract_candidate(raw).map(|(_, candidate)| candidate)
}

/// Like [`parse_response`], also naming the strategy that produced the candidate
pub(crate) fn extract_candidate(raw: &str) -> Result<(&'static str, ParsedCandidate)> {
    let cleaned = strip_fences(raw);
    tracing::debug!("Model response before cleanup: {:?}", raw);
    tracing::debug!("Model response after cleanup: {:?}", cleaned);

    for (name, strategy) in STRATEGIES {
        if let Some(candidate) = strategy(cleaned) {
            let confidence = candidate
                .confidence
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info!(
                strategy = *name,
                query = %candidate.query,
                original = candidate.original_query.as_deref().unwrap_or(""),
                confidence = %confidence,
                rules = ?candidate.rules_used,
                alternatives = ?candidate.alternatives,
                "Extracted query from model response"
            );
            return Ok((*name, candidate));
        }
        tracing::debug!("Parse strategy '{}' found no query", name);
    }

    Err(EvQueryError::UnparsableResponse {
        raw: raw.to_string(),
    })
}

/// Remove at most one leading marker (`json`, ```` ```json ````, ```` ``` ````)
/// and one trailing ```` ``` ```` fence
fn strip_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();

    if let Some(rest) = cleaned.strip_prefix("json") {
        cleaned = rest.trim();
    } else if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest.trim();
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest.trim();
    }

    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim();
    }

    cleaned
}

/// Decode the whole text as a JSON object with a non-empty string `query`
fn strict_json(text: &str) -> Option<ParsedCandidate> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Model response is not valid JSON: {}", e);
            return None;
        }
    };
    let object = value.as_object()?;

    // Non-string query values (numbers, objects) count as missing
    let query = object.get("query")?.as_str()?.trim();
    if query.is_empty() {
        return None;
    }

    Some(ParsedCandidate {
        query: query.to_string(),
        confidence: object.get("confidence").and_then(Value::as_f64),
        rules_used: string_list(object.get("rules_used")),
        alternatives: string_list(object.get("alternatives")),
        original_query: object
            .get("original_query")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Find the first `"query": "<value>"` pair with a non-blank value anywhere in the text
fn query_field_pattern(text: &str) -> Option<ParsedCandidate> {
    QUERY_FIELD_RE.captures_iter(text).find_map(|caps| {
        let captured = caps.get(1)?.as_str();

        // Resolve JSON escapes when the captured run is a valid string body
        let value = serde_json::from_str::<String>(&format!("\"{}\"", captured))
            .unwrap_or_else(|_| captured.to_string());

        let query = value.trim();
        if query.is_empty() {
            return None;
        }
        Some(ParsedCandidate::bare(query.to_string()))
    })
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

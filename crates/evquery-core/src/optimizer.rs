//! Rule-based local query conversion
//!
//! Used whenever the model path is skipped or fails. Output must be a pure
//! function of the input.

use crate::error::{EvQueryError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(
        r"(?i)\b(today|yesterday|this\s*week|last\s*week|this\s*month|last\s*month|this\s*year|last\s*year)\b"
    )
    .unwrap();
    static ref SIZE_OVER_RE: Regex = Regex::new(
        r"(?i)(?:\b(?:over|above|larger\s+than|bigger\s+than|greater\s+than|more\s+than)\s*|>\s*)(\d+(?:\.\d+)?)\s*(kb|mb|gb|tb)\b"
    )
    .unwrap();
    static ref SIZE_UNDER_RE: Regex = Regex::new(
        r"(?i)(?:\b(?:under|below|smaller\s+than|less\s+than)\s*|<\s*)(\d+(?:\.\d+)?)\s*(kb|mb|gb|tb)\b"
    )
    .unwrap();
}

/// Deterministic fallback converter
pub trait LocalOptimizer: Send + Sync {
    /// Convert a raw request into Everything syntax
    fn optimize(&self, raw_query: &str) -> Result<String>;
}

const IMAGES: &str = "*.jpg;*.png;*.gif;*.bmp;*.jpeg";
const DOCUMENTS: &str = "*.doc;*.docx;*.pdf;*.txt";
const VIDEOS: &str = "*.mp4;*.avi;*.mkv;*.mov";
const AUDIO: &str = "*.mp3;*.wav;*.flac";

const FILLER_WORDS: &[&str] = &[
    "find", "search", "show", "list", "get", "me", "my", "all", "any", "files", "file", "from",
    "the", "a", "an", "with", "of", "for", "in", "that", "were", "was", "are", "is", "modified",
    "changed", "edited", "created", "please",
];

/// Default [`LocalOptimizer`]: keyword rules for dates, sizes and file types
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleOptimizer;

impl LocalOptimizer for RuleOptimizer {
    fn optimize(&self, raw_query: &str) -> Result<String> {
        let raw = raw_query.trim();
        if raw.is_empty() {
            return Err(EvQueryError::LocalOptimizerFailed(
                "query is empty".to_string(),
            ));
        }

        if looks_like_syntax(raw) {
            return Ok(raw.to_string());
        }

        let mut parts: Vec<String> = Vec::new();

        // Date
        if let Some(m) = DATE_RE.captures(raw).and_then(|c| c.get(1)) {
            let keyword: String = m
                .as_str()
                .to_lowercase()
                .split_whitespace()
                .collect();
            parts.push(format!("dm:{}", keyword));
        }
        let rest = DATE_RE.replace_all(raw, " ");

        // Size
        let mut size_parts = Vec::new();
        if let Some(c) = SIZE_OVER_RE.captures(&rest) {
            size_parts.push(format!("size:>{}{}", &c[1], c[2].to_lowercase()));
        }
        if let Some(c) = SIZE_UNDER_RE.captures(&rest) {
            size_parts.push(format!("size:<{}{}", &c[1], c[2].to_lowercase()));
        }
        let rest = SIZE_OVER_RE.replace_all(&rest, " ");
        let rest = SIZE_UNDER_RE.replace_all(&rest, " ");
        parts.extend(size_parts);

        // File types and keywords
        let mut types: Vec<&'static str> = Vec::new();
        let mut keywords: Vec<&str> = Vec::new();
        for token in rest.split_whitespace() {
            let token = token.trim_matches(|c: char| matches!(c, ',' | '.' | '?' | '!' | ';'));
            if token.is_empty() {
                continue;
            }
            let lower = token.to_lowercase();
            if let Some(group) = file_type_group(&lower) {
                if !types.contains(&group) {
                    types.push(group);
                }
            } else if !FILLER_WORDS.contains(&lower.as_str()) {
                keywords.push(token);
            }
        }
        parts.extend(types.into_iter().map(str::to_string));
        parts.extend(keywords.into_iter().map(str::to_string));

        if parts.is_empty() {
            // Nothing but filler: search for the request as typed
            return Ok(raw.to_string());
        }

        Ok(parts.join(" "))
    }
}

/// Input that already uses wildcards, functions or operators is left alone
fn looks_like_syntax(raw: &str) -> bool {
    raw.contains(['*', ':', '|', '"'])
}

fn file_type_group(word: &str) -> Option<&'static str> {
    match word {
        "pdf" | "pdfs" => Some("*.pdf"),
        "image" | "images" | "picture" | "pictures" | "photo" | "photos" | "pics" => Some(IMAGES),
        "video" | "videos" | "movie" | "movies" => Some(VIDEOS),
        "audio" | "music" | "song" | "songs" => Some(AUDIO),
        "document" | "documents" | "doc" | "docs" => Some(DOCUMENTS),
        _ => None,
    }
}

//! Search execution
//!
//! The converted query is handed to a [`SearchBackend`]; [`SearchEngine`]
//! ties conversion and execution together and reports failures as a
//! structured [`SearchOutcome`] instead of an error.

mod engine;
mod es;

pub use engine::{SearchEngine, SearchOutcome};
pub use es::EsBackend;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Options passed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results
    pub count: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { count: 1000 }
    }
}

/// A matching file or folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub path: String,
}

impl SearchHit {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Raw backend reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Option<Vec<SearchHit>>,
    #[serde(default)]
    pub total_results: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

impl BackendResponse {
    pub fn found(results: Vec<SearchHit>) -> Self {
        Self {
            success: true,
            total_results: Some(results.len()),
            results: Some(results),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            total_results: None,
            error: Some(error.into()),
        }
    }
}

/// File-search backend executing finished Everything queries
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<BackendResponse>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

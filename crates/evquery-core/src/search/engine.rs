//! Conversion + execution pipeline

use super::{SearchBackend, SearchHit, SearchOptions};
use crate::convert::{ConversionPath, ConversionRequest, QueryConverter};
use crate::debug::DebugEmitter;
use crate::error::{EvQueryError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a search, successful or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub success: bool,

    /// The user's original request
    pub query: String,

    /// The Everything query that was executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub everything_query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<ConversionPath>,

    #[serde(default)]
    pub results: Vec<SearchHit>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    fn failure(query: &str, everything_query: Option<String>, error: String) -> Self {
        Self {
            success: false,
            query: query.to_string(),
            everything_query,
            via: None,
            results: vec![],
            total_results: None,
            error: Some(error),
        }
    }
}

/// Converts requests and runs them against a backend
pub struct SearchEngine {
    converter: Arc<QueryConverter>,
    backend: Arc<dyn SearchBackend>,
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(converter: Arc<QueryConverter>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            converter,
            backend,
            options: SearchOptions::default(),
        }
    }

    /// Override the backend result limit
    pub fn with_max_results(mut self, count: usize) -> Self {
        self.options.count = count;
        self
    }

    /// Convert and execute a natural language request. Never fails; errors
    /// come back as an unsuccessful outcome.
    pub async fn search(&self, raw_query: &str, debug: bool) -> SearchOutcome {
        let emitter = DebugEmitter::new(self.converter.debug_sink(), debug);

        let conversion = match self
            .converter
            .convert(&ConversionRequest::new(raw_query).with_debug(debug))
            .await
        {
            Ok(conversion) => conversion,
            Err(e) => {
                tracing::error!("Search failed: {}", e);
                emitter.error(format!("Search failed: {}", e));
                return SearchOutcome::failure(raw_query, None, e.to_string());
            }
        };

        emitter.info(format!("Executing search: {}", conversion.query));

        let (results, total) = match self.execute(&conversion.query).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Search failed for '{}': {}", conversion.query, e);
                emitter.error(format!("Search failed: {}", e));
                return SearchOutcome::failure(
                    raw_query,
                    Some(conversion.query),
                    e.to_string(),
                );
            }
        };

        emitter.info(format!("Search finished, {} results", results.len()));
        tracing::info!(
            original = raw_query,
            converted = %conversion.query,
            results = results.len(),
            "Search completed"
        );

        SearchOutcome {
            success: true,
            query: raw_query.to_string(),
            everything_query: Some(conversion.query),
            via: Some(conversion.via),
            total_results: Some(total.unwrap_or(results.len())),
            results,
            error: None,
        }
    }

    async fn execute(&self, query: &str) -> Result<(Vec<SearchHit>, Option<usize>)> {
        let response = self.backend.search(query, &self.options).await?;
        if !response.success {
            return Err(EvQueryError::Search(
                response
                    .error
                    .unwrap_or_else(|| format!("{} search failed", self.backend.name())),
            ));
        }
        Ok((response.results.unwrap_or_default(), response.total_results))
    }
}

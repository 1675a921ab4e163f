//! Natural language to Everything query conversion
//!
//! The converter decides per call whether to ask the model at all, runs the
//! prompt → completion → parse pipeline when it does, and drops to the local
//! optimizer on any failure along the way. Only a failing local optimizer
//! surfaces as an error.

use crate::config::LLMServiceConfig;
use crate::debug::{DebugEmitter, DebugSink};
use crate::error::{EvQueryError, Result};
use crate::llm::response::{extract_candidate, STRICT_JSON};
use crate::llm::{build_messages, complete_standard, complete_streaming, LLMClient, OpenAIClient};
use crate::optimizer::{LocalOptimizer, RuleOptimizer};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Requests this short (in characters) never go to the model
pub const MIN_MODEL_QUERY_CHARS: usize = 3;

/// A single conversion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub raw_query: String,
    /// Stream the model reply and report progress to the debug sink
    pub debug: bool,
}

impl ConversionRequest {
    pub fn new(raw_query: impl Into<String>) -> Self {
        Self {
            raw_query: raw_query.into(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Which path produced the final query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionPath {
    Model,
    Local,
}

/// Result of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub query: String,
    pub via: ConversionPath,
}

/// Orchestrates model-backed conversion with local fallback
pub struct QueryConverter {
    client: RwLock<Option<Arc<dyn LLMClient>>>,
    optimizer: Arc<dyn LocalOptimizer>,
    sink: Option<Arc<dyn DebugSink>>,
}

impl QueryConverter {
    /// Create with an explicit (optional) client and optimizer
    pub fn new(client: Option<Arc<dyn LLMClient>>, optimizer: Arc<dyn LocalOptimizer>) -> Self {
        Self {
            client: RwLock::new(client),
            optimizer,
            sink: None,
        }
    }

    /// Create from configuration; without an API key only the local path is used
    pub fn from_config(config: &LLMServiceConfig) -> Result<Self> {
        Ok(Self::new(build_client(config)?, Arc::new(RuleOptimizer)))
    }

    /// Attach a debug sink
    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// The attached debug sink, if any
    pub fn debug_sink(&self) -> Option<&Arc<dyn DebugSink>> {
        self.sink.as_ref()
    }

    /// Replace the model client from new configuration
    ///
    /// Conversions already in flight keep the client they started with.
    pub fn update_config(&self, config: &LLMServiceConfig) -> Result<()> {
        let client = build_client(config)?;
        tracing::info!(
            "Model configuration updated: {}",
            client
                .as_ref()
                .map(|c| c.model_name().to_string())
                .unwrap_or_else(|| "no API key, local only".to_string())
        );
        self.replace_client(client);
        Ok(())
    }

    /// Swap the client directly
    pub fn replace_client(&self, client: Option<Arc<dyn LLMClient>>) {
        match self.client.write() {
            Ok(mut guard) => *guard = client,
            Err(poisoned) => *poisoned.into_inner() = client,
        }
    }

    /// Whether a model client is configured
    pub fn is_model_available(&self) -> bool {
        self.current_client().is_some()
    }

    fn current_client(&self) -> Option<Arc<dyn LLMClient>> {
        match self.client.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Convert a natural language request into an Everything query
    pub async fn convert(&self, request: &ConversionRequest) -> Result<Conversion> {
        let debug = DebugEmitter::new(self.sink.as_ref(), request.debug);
        let raw = request.raw_query.as_str();

        let client = match self.current_client() {
            Some(client) if raw.chars().count() > MIN_MODEL_QUERY_CHARS => client,
            Some(_) => {
                tracing::debug!("Query too short for model conversion, using local rules");
                return self.convert_locally(raw);
            }
            None => {
                tracing::debug!("No model configured, using local rules");
                return self.convert_locally(raw);
            }
        };

        match self
            .convert_with_model(client.as_ref(), raw, request.debug, &debug)
            .await
        {
            Ok(query) => {
                tracing::info!("Converted '{}' → '{}' via {}", raw, query, client.model_name());
                Ok(Conversion {
                    query,
                    via: ConversionPath::Model,
                })
            }
            Err(e) => {
                tracing::warn!("Model conversion failed, using local rules: {}", e);
                debug.error(format!("Model conversion failed: {}, using local rules", e));
                self.convert_locally(raw)
            }
        }
    }

    async fn convert_with_model(
        &self,
        client: &dyn LLMClient,
        raw: &str,
        stream: bool,
        debug: &DebugEmitter,
    ) -> Result<String> {
        let messages = Vec::from(build_messages(raw));

        // Stream only when someone asked to watch
        let reply = if stream {
            debug.info(format!("Converting query with {}...", client.model_name()));
            complete_streaming(client, messages, |fragment| debug.stream(fragment)).await?
        } else {
            complete_standard(client, messages).await?
        };

        let (strategy, candidate) = match extract_candidate(&reply) {
            Ok(found) => found,
            Err(e) => {
                debug.info("Model response is not usable JSON, trying pattern extraction");
                return Err(e);
            }
        };
        if strategy != STRICT_JSON {
            debug.info("Model response is not usable JSON, trying pattern extraction");
            debug.info(format!("Recovered query via {}: {}", strategy, candidate.query));
        }
        if candidate.query.trim().is_empty() {
            return Err(EvQueryError::UnparsableResponse { raw: reply });
        }
        Ok(candidate.query)
    }

    fn convert_locally(&self, raw: &str) -> Result<Conversion> {
        let query = self.optimizer.optimize(raw).map_err(|e| match e {
            EvQueryError::LocalOptimizerFailed(_) => e,
            other => EvQueryError::LocalOptimizerFailed(other.to_string()),
        })?;
        if query.trim().is_empty() {
            return Err(EvQueryError::LocalOptimizerFailed(format!(
                "no query produced for '{}'",
                raw
            )));
        }
        Ok(Conversion {
            query,
            via: ConversionPath::Local,
        })
    }
}

fn build_client(config: &LLMServiceConfig) -> Result<Option<Arc<dyn LLMClient>>> {
    match OpenAIClient::new(config.clone()) {
        Ok(client) => Ok(Some(Arc::new(client))),
        Err(EvQueryError::ModelUnavailable) => Ok(None),
        Err(e) => Err(e),
    }
}

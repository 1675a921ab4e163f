//! Evquery Core Library
//!
//! Natural language file search on top of Everything.
//!
//! # Features
//! - Conversion of free-text requests into Everything search syntax via an
//!   OpenAI-compatible chat model (standard or streamed replies)
//! - Tolerant parsing of fenced or malformed JSON replies
//! - Deterministic rule-based fallback when the model is unavailable or fails
//! - Search execution through the Everything command-line client

pub mod config;
pub mod convert;
pub mod debug;
pub mod error;
pub mod llm;
pub mod optimizer;
pub mod search;

pub use config::{Config, LLMServiceConfig, SearchConfig};
pub use convert::{Conversion, ConversionPath, ConversionRequest, QueryConverter};
pub use debug::{ChannelSink, DebugEvent, DebugKind, DebugSink, TracingSink};
pub use error::{EvQueryError, Error, Result};
pub use llm::{
    build_messages, complete_standard, complete_streaming, parse_response, ChatMessage,
    FragmentStream, LLMClient, OpenAIClient, ParsedCandidate,
};
pub use optimizer::{LocalOptimizer, RuleOptimizer};
pub use search::{
    BackendResponse, EsBackend, SearchBackend, SearchEngine, SearchHit, SearchOptions,
    SearchOutcome,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "evquery";

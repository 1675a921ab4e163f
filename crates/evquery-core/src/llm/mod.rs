//! LLM integration
//!
//! Provides:
//! - Prompt construction for natural language to Everything syntax conversion
//! - An OpenAI-compatible chat client with standard and streaming modes
//! - Tolerant parsing of the model's JSON reply

mod client;
pub mod prompt;
pub mod response;
mod sse;

pub use client::{
    complete_standard, complete_streaming, ChatMessage, FragmentStream, LLMClient, OpenAIClient,
};
pub use prompt::{build_messages, SYNTAX_REFERENCE};
pub use response::{parse_response, ParsedCandidate};

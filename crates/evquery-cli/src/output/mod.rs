//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use evquery_core::{Conversion, SearchOutcome};

/// Format a conversion result
pub fn format_conversion(raw_query: &str, conversion: &Conversion, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_conversion(raw_query, conversion),
        OutputFormat::Cli => terminal::format_conversion(conversion),
    }
}

/// Format a search outcome
pub fn format_outcome(outcome: &SearchOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_outcome(outcome),
        OutputFormat::Cli => terminal::format_outcome(outcome),
    }
}

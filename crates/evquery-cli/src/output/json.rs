//! JSON output formatter

use evquery_core::{Conversion, SearchOutcome};

pub fn format_conversion(raw_query: &str, conversion: &Conversion) -> String {
    let output = serde_json::json!({
        "query": raw_query,
        "everything_query": conversion.query,
        "via": conversion.via,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_outcome(outcome: &SearchOutcome) -> String {
    serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

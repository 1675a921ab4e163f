//! Terminal output formatter

use evquery_core::{Conversion, SearchOutcome};

pub fn format_conversion(conversion: &Conversion) -> String {
    format!("{}\n", conversion.query)
}

pub fn format_outcome(outcome: &SearchOutcome) -> String {
    if !outcome.success {
        return String::new();
    }

    let mut output = String::new();
    for hit in &outcome.results {
        output.push_str(&hit.path);
        output.push('\n');
    }

    let shown = outcome.results.len();
    let total = outcome.total_results.unwrap_or(shown);
    if let Some(ref query) = outcome.everything_query {
        output.push_str(&format!("\n{} of {} results for `{}`\n", shown, total, query));
    }

    output
}

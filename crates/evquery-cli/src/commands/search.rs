//! Search command

use super::{build_converter, finish_printer};
use crate::app::{OutputFormat, SearchArgs};
use crate::output::format_outcome;
use anyhow::Result;
use evquery_core::{error::exit_codes, Config, EsBackend, SearchEngine};
use std::io::Write;
use std::sync::Arc;

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let (converter, printer) = build_converter(&config.llm_service, args.debug)?;

    let engine = SearchEngine::new(
        Arc::new(converter),
        Arc::new(EsBackend::new(config.search.es_path.clone())),
    )
    .with_max_results(args.limit.unwrap_or(config.search.max_results));

    let outcome = engine.search(&query, args.debug).await;
    drop(engine);
    finish_printer(printer).await;

    print!("{}", format_outcome(&outcome, format));

    if !outcome.success {
        let code = if outcome.everything_query.is_none() {
            exit_codes::CONVERSION_FAILED
        } else {
            exit_codes::GENERAL_ERROR
        };
        if format == OutputFormat::Cli {
            eprintln!("Error: {}", outcome.error.as_deref().unwrap_or("search failed"));
        }
        let _ = std::io::stdout().flush();
        std::process::exit(code);
    }
    Ok(())
}

//! Convert command

use super::{build_converter, finish_printer};
use crate::app::{ConvertArgs, OutputFormat};
use crate::output::format_conversion;
use anyhow::Result;
use evquery_core::{Config, ConversionPath, ConversionRequest};

pub async fn run(args: ConvertArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let (converter, printer) = build_converter(&config.llm_service, args.debug)?;

    let result = converter
        .convert(&ConversionRequest::new(query.as_str()).with_debug(args.debug))
        .await;
    drop(converter);
    finish_printer(printer).await;

    let conversion = result?;
    print!("{}", format_conversion(&query, &conversion, format));
    if format == OutputFormat::Cli {
        let via = match conversion.via {
            ConversionPath::Model => "model",
            ConversionPath::Local => "local rules",
        };
        eprintln!("(converted via {})", via);
    }
    Ok(())
}

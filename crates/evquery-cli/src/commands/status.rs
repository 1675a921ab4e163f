//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use evquery_core::{Config, QueryConverter};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let llm = &config.llm_service;
    let model_available = QueryConverter::from_config(llm)?.is_model_available();
    let config_path = Config::default_path();

    match format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "model_available": model_available,
                "base_url": llm.base_url,
                "model": llm.model,
                "es_path": config.search.es_path,
                "max_results": config.search.max_results,
                "config_path": config_path,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        OutputFormat::Cli => {
            let availability = if model_available {
                "available"
            } else {
                "unavailable (no API key, using local rules)"
            };
            println!("Model:           {}", availability);
            println!("  Name:          {}", llm.model);
            println!("  Endpoint:      {}", llm.base_url);
            println!();
            println!("Everything:      {}", config.search.es_path.display());
            println!("  Max results:   {}", config.search.max_results);
            println!();
            println!("Config file:     {}", config_path.display());
        }
    }
    Ok(())
}

//! Config command

use crate::app::{ConfigAction, ConfigArgs};
use anyhow::Result;
use evquery_core::{Config, EvQueryError};

pub async fn run(args: ConfigArgs, mut config: Config) -> Result<()> {
    match args.action {
        ConfigAction::SetKey {
            key,
            base_url,
            model,
        } => {
            if key.trim().is_empty() {
                return Err(EvQueryError::InvalidInput("API key must not be empty".to_string()).into());
            }
            config.llm_service.api_key = Some(key.trim().to_string());
            if let Some(url) = base_url {
                config.llm_service.base_url = url;
            }
            if let Some(model) = model {
                config.llm_service.model = model;
            }

            let path = Config::default_path();
            config.save_to(&path)?;
            println!("Saved model settings to {}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
    }
    Ok(())
}

//! Everything command-line client (`es`) backend

use super::{BackendResponse, SearchBackend, SearchHit, SearchOptions};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Runs queries through the `es` executable shipped with Everything
#[derive(Debug, Clone)]
pub struct EsBackend {
    program: PathBuf,
}

impl EsBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl SearchBackend for EsBackend {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<BackendResponse> {
        let output = match Command::new(&self.program)
            .arg("-n")
            .arg(options.count.to_string())
            .args(split_terms(query))
            .kill_on_drop(true)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return Ok(BackendResponse::failed(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                stderr
            };
            return Ok(BackendResponse::failed(message));
        }

        let hits: Vec<SearchHit> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(SearchHit::new)
            .collect();

        tracing::debug!("es returned {} results for '{}'", hits.len(), query);
        Ok(BackendResponse::found(hits))
    }

    fn name(&self) -> &str {
        "es"
    }
}

/// Split a query into arguments on whitespace, keeping quoted phrases intact
fn split_terms(query: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in query.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    terms.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        terms.push(current);
    }
    terms
}

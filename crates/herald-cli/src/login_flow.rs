//! Terminal implementation of the interactive login step.

use async_trait::async_trait;
use herald_core::{HeraldError, Result};
use herald_infrastructure::LoginFlow;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Shows the OAuth dialog URL and reads the result from stdin.
///
/// With a preset token (`herald login --token`) nothing is prompted.
pub struct PromptLoginFlow {
    preset: Option<String>,
}

impl PromptLoginFlow {
    pub fn new(preset: Option<String>) -> Self {
        Self { preset }
    }
}

#[async_trait]
impl LoginFlow for PromptLoginFlow {
    async fn authorize(&self, dialog_url: &str) -> Result<Option<String>> {
        if let Some(token) = &self.preset {
            return Ok(Some(token.clone()));
        }

        eprintln!("Open this URL in a browser and approve the requested permissions:");
        eprintln!();
        eprintln!("  {}", dialog_url);
        eprintln!();
        eprintln!("Then paste the address you were redirected to (or just the token).");
        eprintln!("Leave empty to cancel.");
        eprint!("> ");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| HeraldError::io(format!("Failed to read login response: {}", e)))?;

        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }
}

//! Settings loading and validation.
//!
//! Settings come from a JSON file (`settings.json` by default) with the same
//! keys the original batch uploader used; `UPLINK_OAUTH_TOKEN` overrides the
//! token from the environment so the secret can stay out of the file.

use std::env;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::SortStrategy;

/// Environment variable that overrides the settings file's OAuth token.
pub const OAUTH_TOKEN_ENV: &str = "UPLINK_OAUTH_TOKEN";

const DEFAULT_MAX_PARALLEL_UPLOADS: usize = 4;

/// Batch uploader configuration, consumed read-only by the rest of the system.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    pub source_folder: String,
    pub target_disk_folder: String,
    #[serde(default)]
    pub sort_strategy: SortStrategy,
    #[serde(rename = "OAuthToken", default)]
    pub oauth_token: String,
    #[serde(default = "default_max_parallel_uploads")]
    pub max_parallel_uploads: usize,
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}

fn default_max_parallel_uploads() -> usize {
    DEFAULT_MAX_PARALLEL_UPLOADS
}

impl Settings {
    /// Load settings from a JSON file, apply environment overrides, and
    /// validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        override_token(&mut settings, env::var(OAUTH_TOKEN_ENV).ok());

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.source_folder.trim().is_empty() {
            return Err(anyhow::anyhow!("SourceFolder cannot be empty"));
        }

        let target = self.target_disk_folder.trim();
        if target.is_empty() || target == "/" || target == "." {
            return Err(anyhow::anyhow!(
                "TargetDiskFolder is mandatory and cannot be '/', '.', or blank"
            ));
        }

        if self.oauth_token.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "OAuthToken cannot be empty. Set it in the settings file or via {}",
                OAUTH_TOKEN_ENV
            ));
        }

        if self.max_parallel_uploads < 1 {
            return Err(anyhow::anyhow!("MaxParallelUploads must be at least 1"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("AllowedExtensions cannot be empty"));
        }

        Ok(())
    }
}

/// Apply the environment token override; blank values are ignored.
fn override_token(settings: &mut Settings, token: Option<String>) {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        settings.oauth_token = token;
    }
}

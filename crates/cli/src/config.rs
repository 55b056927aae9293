//! CLI configuration utilities

use anyhow::{Context, Result};
use std::path::PathBuf;
use taskpad_core::FileTokenStore;

/// Base URL used when neither the flag nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Resolved CLI settings
pub struct Settings {
    pub api_url: String,
    pub token_file: PathBuf,
}

impl Settings {
    /// Resolve settings: flag, then `TASKPAD_API_URL`, then the default
    pub fn resolve(api_url: Option<String>, token_file: Option<PathBuf>) -> Result<Self> {
        let api_url = api_url
            .or_else(|| std::env::var("TASKPAD_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token_file = match token_file {
            Some(path) => path,
            None => FileTokenStore::default_path()
                .context("could not determine a data directory for the token file")?,
        };

        Ok(Self {
            api_url,
            token_file,
        })
    }
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::matching::engine::DEFAULT_TOPN;

const DEFAULT_CATALOG_PATH: &str = "data/careers.json";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
    /// Result count for recommend requests that omit `topn`.
    pub default_topn: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            catalog_path: std::env::var("CATALOG_PATH")
                .unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
                .into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_topn: parse_default_topn(std::env::var("DEFAULT_TOPN").ok())?,
        })
    }
}

fn parse_default_topn(raw: Option<String>) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TOPN);
    };
    let n = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("DEFAULT_TOPN must be a positive integer, got '{raw}'"))?;
    if n == 0 {
        bail!("DEFAULT_TOPN must be at least 1");
    }
    Ok(n)
}

//! Application configuration
//!
//! Loaded once at startup from a JSON file (`RATEDESK_CONFIG` env var or
//! `ratedesk.json` in the working directory), with secrets overridable from
//! the environment. Nothing is persisted back.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Worksheet selector: the upstream sheet is addressed either by its numeric
/// worksheet id or by its display name, depending on the deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorksheetSelector {
    ById(i64),
    ByName(String),
}

/// Which formula produces the recommended price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingVariant {
    /// Display the upstream-computed recommendation verbatim.
    #[default]
    Upstream,
    /// Recompute as a flat 3% undercut of the competitor average.
    Undercut,
}

fn default_price_column() -> String {
    "Final_Recommended".to_string()
}

fn default_override_column() -> u32 {
    9 // Col I = Manual_Override
}

fn default_pushed_flag_column() -> u32 {
    10 // Col J = Push_to_NB
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// Spreadsheet backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    /// Full document URL, e.g. `https://docs.google.com/spreadsheets/d/{id}`
    pub document_url: String,
    pub worksheet: WorksheetSelector,
    /// Token exchange endpoint for the service-account credentials.
    pub token_uri: String,
    /// Path to the service-account credentials JSON. Absence is not fatal at
    /// startup; it fails the refresh action only.
    #[serde(default)]
    pub credentials_path: Option<String>,
    /// Backend API base URL. Overridable for tests.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Header name of the column holding the authoritative recommended price.
    #[serde(default = "default_price_column")]
    pub price_column: String,
    /// 1-based column number of Manual_Override.
    #[serde(default = "default_override_column")]
    pub override_column: u32,
    /// 1-based column number of the Push_to_NB flag.
    #[serde(default = "default_pushed_flag_column")]
    pub pushed_flag_column: u32,
}

/// Channel manager configuration. The whole section is optional; without it
/// (or without a token) the push feature is disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelManagerConfig {
    pub api_base: String,
    pub property_id: String,
    /// Bearer token. `CHANNEL_MANAGER_TOKEN` in the environment wins.
    #[serde(default)]
    pub token: Option<String>,
}

impl ChannelManagerConfig {
    /// Resolve the bearer token, preferring the environment.
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var("CHANNEL_MANAGER_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone().filter(|t| !t.is_empty()))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Local API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub spreadsheet: SpreadsheetConfig,
    #[serde(default)]
    pub channel_manager: Option<ChannelManagerConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pricing_variant: PricingVariant,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid config: {}", e)))?;
        Ok(config)
    }

    /// Resolve the config path from the environment, falling back to
    /// `ratedesk.json` in the working directory.
    pub fn default_path() -> std::path::PathBuf {
        std::env::var("RATEDESK_CONFIG")
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|_| std::path::PathBuf::from("ratedesk.json"))
    }
}

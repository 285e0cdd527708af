//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Weights blending the performance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_win_rate_weight")]
    pub win_rate: f64,

    #[serde(default = "default_meta_share_weight")]
    pub meta_share: f64,

    /// Points per favorable matchup
    #[serde(default = "default_favorable_weight")]
    pub favorable_matchup: f64,
}

fn default_win_rate_weight() -> f64 {
    0.5
}

fn default_meta_share_weight() -> f64 {
    0.3
}

fn default_favorable_weight() -> f64 {
    2.0
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            win_rate: default_win_rate_weight(),
            meta_share: default_meta_share_weight(),
            favorable_matchup: default_favorable_weight(),
        }
    }
}

/// Aggregation thresholds and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Records with fewer games are left out of statistics and matchups
    #[serde(default = "default_min_matchup_games")]
    pub min_matchup_games: u32,

    /// Decks with fewer attributed games are left out of the ranking
    #[serde(default = "default_min_deck_games")]
    pub min_deck_games: u64,

    /// A matchup win rate strictly above this is favorable for deck A
    #[serde(default = "default_favorable_above")]
    pub favorable_above: f64,

    /// A matchup win rate strictly below this is favorable for deck B
    #[serde(default = "default_favorable_below")]
    pub favorable_below: f64,

    /// Length of the best and worst matchup lists
    #[serde(default = "default_matchup_list_len")]
    pub matchup_list_len: usize,

    /// Abort on the first malformed record instead of skipping it
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_min_matchup_games() -> u32 {
    10
}

fn default_min_deck_games() -> u64 {
    50
}

fn default_favorable_above() -> f64 {
    52.0
}

fn default_favorable_below() -> f64 {
    48.0
}

fn default_matchup_list_len() -> usize {
    5
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_matchup_games: default_min_matchup_games(),
            min_deck_games: default_min_deck_games(),
            favorable_above: default_favorable_above(),
            favorable_below: default_favorable_below(),
            matchup_list_len: default_matchup_list_len(),
            strict: false,
            weights: ScoreWeights::default(),
        }
    }
}

impl AggregationConfig {
    /// Validate thresholds, band and weights.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let band = [self.favorable_below, self.favorable_above];
        if band.iter().any(|v| !v.is_finite() || !(0.0..=100.0).contains(v)) {
            return Err(ConfigError::ValidationError(
                "Favorability band must lie within 0-100".to_string(),
            ));
        }

        if self.favorable_below > self.favorable_above {
            return Err(ConfigError::ValidationError(format!(
                "favorable_below ({}) must not exceed favorable_above ({})",
                self.favorable_below, self.favorable_above
            )));
        }

        let weights = [
            self.weights.win_rate,
            self.weights.meta_share,
            self.weights.favorable_matchup,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::ValidationError(
                "Score weights must be finite and non-negative".to_string(),
            ));
        }

        if self.matchup_list_len == 0 {
            return Err(ConfigError::ValidationError(
                "matchup_list_len must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Reload cadence for the dataset (e.g. "10m"); unset disables it
    #[serde(default)]
    pub refresh_interval: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            refresh_interval: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Matchup export file name inside the raw data directory
    #[serde(default = "default_dataset")]
    pub dataset: String,

    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dataset() -> String {
    "matchups.csv".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            dataset: default_dataset(),
            aggregation: AggregationConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line bind overrides and re-validate.
    pub fn with_server_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregation.validate()?;

        if self.dataset.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Dataset file name must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if let Some(ref interval) = self.server.refresh_interval {
            if crate::parse_duration(interval).map_or(true, |d| d.is_zero()) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid refresh interval: {}",
                    interval
                )));
            }
        }

        Ok(())
    }
}

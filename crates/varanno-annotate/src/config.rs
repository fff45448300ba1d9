//! Annotation run configuration
//!
//! Defaults, `VARANNO_*` environment overrides and validation for the VEP
//! client and the batch annotator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use varanno_common::{Result, VarannoError};

// ============================================================================
// Defaults
// ============================================================================

/// Ensembl REST server for GRCh37
pub const DEFAULT_SERVER_URL: &str = "https://grch37.rest.ensembl.org";

/// VEP endpoint taking a batch of HGVS notations
pub const DEFAULT_ENDPOINT_PATH: &str = "/vep/human/hgvs";

/// Notations per request; the Ensembl POST endpoint accepts up to 300
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Delay between attempts of a failed batch, in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// How response payloads are matched to the notations of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Payload `i` answers notation `i`
    #[default]
    Positional,
    /// Payloads are matched on the notation echoed in their `input` field
    Echo,
}

impl std::str::FromStr for Alignment {
    type Err = VarannoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positional" | "position" => Ok(Alignment::Positional),
            "echo" | "input" => Ok(Alignment::Echo),
            _ => Err(VarannoError::config(format!(
                "invalid alignment '{s}', expected 'positional' or 'echo'"
            ))),
        }
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alignment::Positional => write!(f, "positional"),
            Alignment::Echo => write!(f, "echo"),
        }
    }
}

/// Settings of one annotation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateConfig {
    /// Annotation server base URL
    pub server_url: String,

    /// Path of the batch endpoint on the server
    pub endpoint_path: String,

    /// Maximum records per request
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts for a failed batch
    #[serde(default)]
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub alignment: Alignment,

    /// Draw a progress bar over batches
    #[serde(default)]
    pub show_progress: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 0,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            alignment: Alignment::Positional,
            show_progress: false,
        }
    }
}

impl AnnotateConfig {
    /// Load config from environment variables on top of the defaults
    ///
    /// - `VARANNO_SERVER_URL`
    /// - `VARANNO_ENDPOINT_PATH`
    /// - `VARANNO_BATCH_SIZE`
    /// - `VARANNO_TIMEOUT_SECS`
    /// - `VARANNO_MAX_RETRIES`
    /// - `VARANNO_RETRY_DELAY_MS`
    /// - `VARANNO_ALIGNMENT` (positional, echo)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VARANNO_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(path) = std::env::var("VARANNO_ENDPOINT_PATH") {
            config.endpoint_path = path;
        }
        if let Some(size) = env_number("VARANNO_BATCH_SIZE")? {
            config.batch_size = size;
        }
        if let Some(secs) = env_number("VARANNO_TIMEOUT_SECS")? {
            config.timeout_secs = secs;
        }
        if let Some(retries) = env_number("VARANNO_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(delay) = env_number("VARANNO_RETRY_DELAY_MS")? {
            config.retry_delay_ms = delay;
        }
        if let Ok(alignment) = std::env::var("VARANNO_ALIGNMENT") {
            config.alignment = alignment.parse()?;
        }

        Ok(config)
    }

    /// Reject settings the annotator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(VarannoError::config("batch size must be greater than zero"));
        }
        if self.timeout_secs == 0 {
            return Err(VarannoError::config("timeout must be greater than zero"));
        }
        if self.server_url.trim().is_empty() {
            return Err(VarannoError::config("server URL is empty"));
        }
        Ok(())
    }

    /// Full URL of the batch endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| VarannoError::config(format!("{key} is not a valid number: '{value}'"))),
        Err(_) => Ok(None),
    }
}

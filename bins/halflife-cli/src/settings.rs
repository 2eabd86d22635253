//! Defaults taken from environment variables. Command-line flags override them.

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// `HALFLIFE_LOG_LEVEL`, default `info`.
    pub log_level: String,
    /// `HALFLIFE_LOG_FORMAT`, `text` or `json`, default `text`.
    pub log_format: LogFormat,
    /// `HALFLIFE_THREADS`; unset means the global rayon pool.
    pub threads: Option<usize>,
    /// `HALFLIFE_SEED`; unset means a fresh seed per run.
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let log_level = var("HALFLIFE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = var("HALFLIFE_LOG_FORMAT")
            .map(|s| LogFormat::from_str(&s, true).map_err(|e| anyhow!(e)))
            .transpose()
            .context("HALFLIFE_LOG_FORMAT must be \"text\" or \"json\"")?
            .unwrap_or_default();

        let threads = var("HALFLIFE_THREADS")
            .map(|s| s.parse::<usize>())
            .transpose()
            .context("HALFLIFE_THREADS must be a non-negative integer")?;

        let seed = var("HALFLIFE_SEED")
            .map(|s| s.parse::<u64>())
            .transpose()
            .context("HALFLIFE_SEED must be an unsigned 64-bit integer")?;

        Ok(Settings {
            log_level,
            log_format,
            threads,
            seed,
        })
    }
}

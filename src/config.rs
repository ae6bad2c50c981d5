//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::store::Retention;

/// Default maximum content size: 5 MiB
const DEFAULT_MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Default retention selectors, as day counts (0 = indefinite)
const DEFAULT_RETENTION_DAYS: [i64; 4] = [1, 7, 30, 0];

/// Accepted retention selectors and what they resolve to.
///
/// A selector is the decimal day count as a string, e.g. `"7"` or `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionOptions {
    options: Vec<(String, Retention)>,
}

impl RetentionOptions {
    /// Builds the option set from day counts. Zero or negative means indefinite.
    pub fn from_days(days: &[i64]) -> Self {
        let mut options: Vec<(String, Retention)> = Vec::with_capacity(days.len());
        for &d in days {
            let selector = d.to_string();
            if !options.iter().any(|(s, _)| *s == selector) {
                options.push((selector, Retention::from_days(d)));
            }
        }
        Self { options }
    }

    /// Parses a comma-separated list of day counts, e.g. `"1,7,30,0"`.
    pub fn parse(list: &str) -> Option<Self> {
        let days: Vec<i64> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;

        if days.is_empty() {
            None
        } else {
            Some(Self::from_days(&days))
        }
    }

    /// Resolves a selector to its retention window.
    pub fn resolve(&self, selector: &str) -> Option<Retention> {
        let selector = selector.trim();
        self.options
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, retention)| *retention)
    }

    /// Selectors in configured order.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(s, _)| s.as_str())
    }
}

impl Default for RetentionOptions {
    fn default() -> Self {
        Self::from_days(&DEFAULT_RETENTION_DAYS)
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Public URL prefix used to build page links
    pub base_url: String,
    /// Maximum accepted content size in bytes
    pub max_upload_size: usize,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Accepted retention selectors
    pub retention_options: RetentionOptions,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BASE_URL` - Link prefix (default: http://localhost:8000)
    /// - `MAX_UPLOAD_SIZE` - Maximum content size in bytes (default: 5 MiB)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 3600)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `DATABASE_URL` - SQLite database (default: sqlite://html_drop.db)
    /// - `RETENTION_OPTIONS` - Comma-separated day counts (default: 1,7,30,0)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.base_url),
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &usize| v > 0)
                .unwrap_or(defaults.max_upload_size),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &u64| v > 0)
                .unwrap_or(defaults.sweep_interval),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.database_url),
            retention_options: env::var("RETENTION_OPTIONS")
                .ok()
                .and_then(|v| RetentionOptions::parse(&v))
                .unwrap_or(defaults.retention_options),
        }
    }

    /// Sweep interval as a Duration.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    /// Maximum content size in megabytes, for display.
    pub fn max_upload_size_mb(&self) -> f64 {
        self.max_upload_size as f64 / (1024.0 * 1024.0)
    }

    /// Public link for a page id.
    pub fn page_link(&self, id: &str) -> String {
        format!("{}/link/{}", self.base_url, id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            sweep_interval: 3600,
            server_port: 8000,
            database_url: "sqlite://html_drop.db".to_string(),
            retention_options: RetentionOptions::default(),
        }
    }
}

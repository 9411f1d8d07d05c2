//! Run configuration
//!
//! Defaults reproduce the reference chaos client: local target, `books`
//! collection, 75% valid traffic, three warm-up creates, a progress line
//! every 20 requests, and 0.5-2s jittered pacing.

use crate::endpoint::{Endpoint, DEFAULT_COLLECTION};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default target base address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default share of iterations drawn from the valid catalogue
pub const DEFAULT_VALID_RATIO: f64 = 0.75;

/// Chaos client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChaosConfig {
    /// Target base address, e.g. `http://localhost:8080`
    pub base_url: String,
    /// Resource collection path segment
    pub collection: String,
    /// Probability of picking from the valid catalogue
    pub valid_ratio: f64,
    /// Valid creates issued before the loop starts
    pub warmup_creates: u32,
    /// Progress line every N iterations
    pub report_every: u64,
    /// Lower pacing bound in milliseconds
    pub min_delay_ms: u64,
    /// Upper pacing bound in milliseconds
    pub max_delay_ms: u64,
    /// Per-request transport deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
    /// Stop after this many iterations; unbounded when absent
    pub max_requests: Option<u64>,
}

impl ChaosConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys take defaults
    ///
    /// # Errors
    /// `ConfigError::Parse` on invalid TOML or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if unreadable, `ConfigError::Parse` if invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    #[must_use]
    pub fn with_valid_ratio(mut self, ratio: f64) -> Self {
        self.valid_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_warmup_creates(mut self, count: u32) -> Self {
        self.warmup_creates = count;
        self
    }

    #[must_use]
    pub fn with_report_every(mut self, every: u64) -> Self {
        self.report_every = every;
        self
    }

    /// Pacing range in milliseconds
    #[must_use]
    pub fn with_delay_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms;
        self.max_delay_ms = max_ms;
        self
    }

    #[must_use]
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_max_requests(mut self, max: u64) -> Self {
        self.max_requests = Some(max);
        self
    }

    /// Check invariants the run loop relies on
    ///
    /// # Errors
    /// The first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.valid_ratio) {
            return Err(ConfigError::InvalidRatio(self.valid_ratio));
        }
        if self.min_delay_ms > self.max_delay_ms {
            return Err(ConfigError::InvertedDelay {
                min_ms: self.min_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
        if self.report_every == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        if self.collection.is_empty()
            || self
                .collection
                .contains(|c: char| c == '/' || c == '?' || c == '#' || c.is_whitespace())
        {
            return Err(ConfigError::InvalidCollection(self.collection.clone()));
        }
        validate_base_url(&self.base_url)
    }

    /// Resource paths for the configured collection
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.collection.clone())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    #[must_use]
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            valid_ratio: DEFAULT_VALID_RATIO,
            warmup_creates: 3,
            report_every: 20,
            min_delay_ms: 500,
            max_delay_ms: 2000,
            request_timeout_ms: 10_000,
            seed: None,
            max_requests: None,
        }
    }
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed".to_string()));
    }
    Ok(())
}

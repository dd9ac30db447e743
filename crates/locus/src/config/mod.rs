use std::time::Duration;

use crate::error::{LocusError, Result};

/// Default quiet period before a typed query is dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);
/// Default transport timeout for a single lookup.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your internet connection and try again.";

/// Tuning knobs for a [`SearchController`](crate::SearchController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchControllerConfig {
    /// How long the query must stay unchanged before a search is dispatched
    pub debounce: Duration,
    /// Upper bound on a single lookup; elapsing counts as an ordinary failure
    pub request_timeout: Duration,
    /// Result sets are truncated to this many records
    pub max_results: usize,
    /// Shown instead of the raw error when a failure looks network related
    pub connectivity_message: String,
}

impl Default for SearchControllerConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_results: DEFAULT_MAX_RESULTS,
            connectivity_message: DEFAULT_CONNECTIVITY_MESSAGE.to_string(),
        }
    }
}

impl SearchControllerConfig {
    pub fn builder() -> SearchControllerConfigBuilder {
        SearchControllerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(LocusError::ConfigError(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(LocusError::ConfigError(
                "max_results must be at least 1".to_string(),
            ));
        }
        if self.connectivity_message.trim().is_empty() {
            return Err(LocusError::ConfigError(
                "connectivity_message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating controller configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchControllerConfigBuilder {
    config: SearchControllerConfig,
}

impl SearchControllerConfigBuilder {
    /// Create a new builder with the defaults (800ms debounce, 20s timeout)
    pub fn new() -> Self {
        Self {
            config: SearchControllerConfig::default(),
        }
    }

    /// Short debounce and timeout, for fast connections and local providers
    pub fn responsive() -> Self {
        let mut builder = Self::new();
        builder.config.debounce = Duration::from_millis(300);
        builder.config.request_timeout = Duration::from_secs(15);
        builder
    }

    /// Longer debounce and timeout, for slow or metered connections
    pub fn patient() -> Self {
        let mut builder = Self::new();
        builder.config.debounce = Duration::from_millis(1200);
        builder.config.request_timeout = Duration::from_secs(30);
        builder
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.config.debounce = debounce;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn connectivity_message(mut self, message: impl Into<String>) -> Self {
        self.config.connectivity_message = message.into();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SearchControllerConfig {
        self.config
    }
}

//! Configuration types for the capture analyzer

use crate::collector::histogram::{DEFAULT_INTERVAL_SECS, DEFAULT_THRESHOLD_SIGMA};
use crate::collector::image::DEFAULT_URI_DISPLAY_MAX;
use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `PCAPLENS_THRESHOLD_SIGMA=3`
pub const ENV_PREFIX: &str = "PCAPLENS";

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Width of one histogram bucket in seconds
    pub histogram_interval_secs: f64,

    /// Standard deviations above the mean for the anomaly threshold
    pub threshold_sigma: f64,

    /// Characters of an image URI kept for display
    pub uri_display_max: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            histogram_interval_secs: DEFAULT_INTERVAL_SECS,
            threshold_sigma: DEFAULT_THRESHOLD_SIGMA,
            uri_display_max: DEFAULT_URI_DISPLAY_MAX,
        }
    }
}

impl AnalyzerConfig {
    /// Defaults, then the optional TOML file, then `PCAPLENS_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true));

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .with_context(|| match path {
                Some(p) => format!("Failed to load configuration from {}", p.display()),
                None => "Failed to load configuration".to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.histogram_interval_secs.is_finite() || self.histogram_interval_secs <= 0.0 {
            anyhow::bail!(
                "Histogram interval must be a positive number of seconds, got {}",
                self.histogram_interval_secs
            );
        }

        if !self.threshold_sigma.is_finite() || self.threshold_sigma < 0.0 {
            anyhow::bail!(
                "Threshold sigma must be finite and non-negative, got {}",
                self.threshold_sigma
            );
        }

        if self.uri_display_max == 0 {
            anyhow::bail!("URI display width must be greater than 0");
        }

        Ok(())
    }
}

//! Layered settings for the aggregator.
//!
//! Precedence, lowest first: built-in defaults, an optional config file,
//! `TOPOWATCH_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;

/// Aggregator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// How long a collected report is retained, e.g. "15s".
    pub window: String,
    /// How often file sources are polled, e.g. "1s".
    pub refresh: String,
    pub log_level: String,
    /// The view printed when none is requested.
    pub topology: String,
    /// Capacity of the render cache.
    pub cache_size: usize,
}

impl Settings {
    /// Load settings, reading `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("window", "15s")?
            .set_default("refresh", "1s")?
            .set_default("log_level", "info")?
            .set_default("topology", "containers")?
            .set_default("cache_size", 100)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("TOPOWATCH").try_parsing(true))
            .build()?
            .try_deserialize()?;

        // Surface bad durations at load time rather than on first use
        settings.window()?;
        settings.refresh()?;
        Ok(settings)
    }

    /// The retention window. It must be longer than zero.
    pub fn window(&self) -> Result<Duration> {
        let window = parse_duration(&self.window)
            .with_context(|| format!("invalid window {:?}", self.window))?;
        if window.is_zero() {
            bail!("invalid window {:?}: must be longer than zero", self.window);
        }
        Ok(window)
    }

    /// The polling interval. It must be longer than zero.
    pub fn refresh(&self) -> Result<Duration> {
        let refresh = parse_duration(&self.refresh)
            .with_context(|| format!("invalid refresh {:?}", self.refresh))?;
        if refresh.is_zero() {
            bail!("invalid refresh {:?}: must be longer than zero", self.refresh);
        }
        Ok(refresh)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: "15s".to_string(),
            refresh: "1s".to_string(),
            log_level: "info".to_string(),
            topology: "containers".to_string(),
            cache_size: 100,
        }
    }
}

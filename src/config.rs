//! Run configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Stock defaults ([`TidyConfig::default`])
//! 2. An optional TOML file passed with `--config`
//! 3. Command-line flags
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! max_size = 1600     # Longest allowed edge in pixels
//! quality = 85        # JPEG/WebP quality (1-100)
//! optimize = true     # Optimized Huffman tables, PNG re-optimization
//! progressive = true  # Progressive JPEG
//! recursive = false   # Descend into subdirectories
//! ```
//!
//! Unknown keys are rejected to catch typos early. Unlike the CLI, which clamps
//! out-of-range numbers, a config file with `max_size = 0` or a quality outside
//! 1-100 is refused.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings shared by every file of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TidyConfig {
    /// Longest allowed edge in pixels. Larger images are shrunk to fit.
    pub max_size: u32,
    /// JPEG/WebP encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Encoder-level optimization (JPEG Huffman tables, PNG recompression).
    pub optimize: bool,
    /// Write progressive JPEGs.
    pub progressive: bool,
    /// Process subdirectories too.
    pub recursive: bool,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            max_size: 1600,
            quality: 85,
            optimize: true,
            progressive: true,
            recursive: false,
        }
    }
}

impl TidyConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size == 0 {
            return Err(ConfigError::Validation("max_size must be at least 1".into()));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        Ok(())
    }
}

/// Load and validate a config file. Keys it leaves out keep their defaults.
pub fn load_config(path: &Path) -> Result<TidyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: TidyConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# imgtidy configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Longest allowed edge in pixels. Images larger than this in either
# dimension are shrunk to fit, keeping their aspect ratio. Never upscales.
max_size = 1600

# JPEG/WebP encoding quality (1 = worst, 100 = best). Ignored for PNG.
quality = 85

# Encoder-level optimization: optimized Huffman tables for JPEG,
# maximum compression plus lossless re-optimization for PNG.
optimize = true

# Write progressive JPEGs, which render in passes of increasing detail.
progressive = true

# Also process images in subdirectories.
recursive = false
"##
}

// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session configuration.
//!
//! Loaded from YAML or TOML depending on the file extension. Every field
//! has a default, so an empty file is a valid configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::export::ExportSettings;
use crate::history::DEFAULT_DEPTH;
use crate::timeline::section::{parse_time_signature, MAX_TEMPO, MIN_TEMPO};

/// Highest tick resolution; the top bit of the header division selects SMPTE timing
pub const MAX_TICKS_PER_BEAT: u16 = 0x7FFF;

/// Settings for one editing session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Undo steps retained
    pub history_depth: usize,
    /// Export tick resolution per beat
    pub ticks_per_beat: u16,
    /// Note-on velocity in exported files
    pub velocity: u8,
    /// Export tempo when the piece has no sections
    pub default_tempo: u32,
    /// Export time signature when the piece has no sections
    pub default_time_signature: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_DEPTH,
            ticks_per_beat: 480,
            velocity: 64,
            default_tempo: 120,
            default_time_signature: "4/4".to_string(),
        }
    }
}

impl SessionConfig {
    /// Load a configuration file, choosing the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let config = match extension.as_deref() {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => bail!("Unsupported config format: {:?} (expected .yaml, .yml or .toml)", path),
        }
        .with_context(|| format!("Invalid config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse from TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.history_depth == 0 {
            bail!("history_depth must be at least 1");
        }
        if !(1..=MAX_TICKS_PER_BEAT).contains(&self.ticks_per_beat) {
            bail!(
                "ticks_per_beat must be between 1 and {}, got {}",
                MAX_TICKS_PER_BEAT,
                self.ticks_per_beat
            );
        }
        if !(1..=127).contains(&self.velocity) {
            bail!("velocity must be between 1 and 127, got {}", self.velocity);
        }
        if !(MIN_TEMPO..=MAX_TEMPO).contains(&self.default_tempo) {
            bail!(
                "default_tempo must be between {} and {} BPM, got {}",
                MIN_TEMPO,
                MAX_TEMPO,
                self.default_tempo
            );
        }
        parse_time_signature(&self.default_time_signature)
            .context("Invalid default_time_signature")?;
        Ok(())
    }

    /// Export parameters derived from this configuration
    pub fn export_settings(&self) -> Result<ExportSettings> {
        let time_signature = parse_time_signature(&self.default_time_signature)
            .context("Invalid default_time_signature")?;
        Ok(ExportSettings {
            ticks_per_beat: self.ticks_per_beat,
            velocity: self.velocity,
            default_tempo: self.default_tempo,
            default_time_signature: time_signature,
        })
    }
}

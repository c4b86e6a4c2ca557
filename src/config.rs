// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Review session configuration.
//!
//! Settings load from an optional YAML file; every field has a default so
//! an empty file (or none at all) yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote feedback endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    /// Opaque bearer token.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on the number of reviewable seconds.
    pub max_review_seconds: u32,
    pub autosave_interval_secs: u64,
    pub store_dir: PathBuf,
    pub endpoint: Option<EndpointConfig>,
    /// Pointer samples closer than this (surface pixels) to the previous
    /// point are not added to a stroke.
    pub min_sample_distance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_review_seconds: 5,
            autosave_interval_secs: 10,
            store_dir: PathBuf::from(".crease/store"),
            endpoint: None,
            min_sample_distance: 1.5,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config.sanitized())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    fn sanitized(mut self) -> Self {
        if self.max_review_seconds == 0 {
            log::warn!("max_review_seconds must be at least 1, using 1");
            self.max_review_seconds = 1;
        }
        if self.autosave_interval_secs == 0 {
            log::warn!("autosave_interval_secs must be at least 1, using 1");
            self.autosave_interval_secs = 1;
        }
        if !self.min_sample_distance.is_finite() || self.min_sample_distance < 0.0 {
            self.min_sample_distance = 0.0;
        }
        self
    }
}

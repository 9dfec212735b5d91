// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Cached hardware profiling
//!
//! The profile is stored as a JSON object at a single fixed path. A missing,
//! unreadable or inconsistent cache file is treated as a cache miss.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;

use super::detector::{HardwareProbe, HardwareProfile, SystemProbe};
use super::tier::ModelCategory;

/// Detects and caches the host [`HardwareProfile`]
#[derive(Clone)]
pub struct HardwareProfiler {
    cache_path: PathBuf,
    probe: Arc<dyn HardwareProbe>,
}

impl Default for HardwareProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProfiler {
    /// Profiler using the real host probes and the default cache location
    pub fn new() -> Self {
        Self::with_cache_path(Settings::hardware_cache_path())
    }

    pub fn with_cache_path(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            probe: Arc::new(SystemProbe),
        }
    }

    /// Replace the probe used for fresh detections
    pub fn with_probe(mut self, probe: Arc<dyn HardwareProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Run a fresh detection without touching the cache
    pub async fn detect(&self) -> HardwareProfile {
        self.probe.detect().await
    }

    /// Return the cached profile, re-detecting when forced or when the cache
    /// cannot be used.
    pub async fn get_profile(&self, force_refresh: bool) -> HardwareProfile {
        if !force_refresh {
            if let Some(profile) = self.load_cached() {
                tracing::debug!("Using cached hardware profile from {:?}", self.cache_path);
                return profile;
            }
        }

        let profile = self.detect().await;
        if let Err(e) = self.store(&profile) {
            tracing::warn!(
                "Failed to write hardware profile cache {:?}: {}",
                self.cache_path,
                e
            );
        }
        profile
    }

    /// Pure lookup of recommended runtime models for the profile's tier
    pub fn recommend_models(profile: &HardwareProfile) -> BTreeMap<ModelCategory, &'static str> {
        profile.tier().recommended_models().into_iter().collect()
    }

    fn load_cached(&self) -> Option<HardwareProfile> {
        let content = match std::fs::read_to_string(&self.cache_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No hardware profile cache: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<HardwareProfile>(&content) {
            Ok(profile) if profile.is_consistent() => Some(profile),
            Ok(_) => {
                tracing::warn!("Cached hardware profile has a mismatched tier, re-detecting");
                None
            }
            Err(e) => {
                tracing::warn!("Corrupt hardware profile cache ({}), re-detecting", e);
                None
            }
        }
    }

    fn store(&self, profile: &HardwareProfile) -> crate::error::Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.cache_path, serde_json::to_string_pretty(profile)?)?;
        Ok(())
    }
}

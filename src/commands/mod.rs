// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Subcommand handlers
//!
//! [`AppContext`] is built once by the entry point and hands each command
//! the settings, hardware profile and collaborators it needs.

pub mod curate;
pub mod models;
pub mod system;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Settings;
use crate::curator::CuratorStore;
use crate::error::Result;
use crate::hardware::{HardwareProfile, HardwareProfiler};
use crate::models::ModelRegistry;
use crate::orchestrator::ModelOrchestrator;
use crate::runtime::{OllamaCli, RuntimeClient};

/// Everything a command needs, resolved from settings
pub struct AppContext {
    pub settings: Settings,
    profiler: HardwareProfiler,
    models_path: PathBuf,
    curator_dir: PathBuf,
    runtime: Arc<dyn RuntimeClient>,
}

impl AppContext {
    /// Load settings from `config` (or the default path) and wire up the
    /// runtime CLI
    pub fn load(config: Option<&Path>) -> Result<Self> {
        let settings = match config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load()?,
        };
        let runtime: Arc<dyn RuntimeClient> = Arc::new(OllamaCli::from_config(&settings.runtime));
        Ok(Self::new(settings, HardwareProfiler::new(), runtime))
    }

    pub fn new(settings: Settings, profiler: HardwareProfiler, runtime: Arc<dyn RuntimeClient>) -> Self {
        Self {
            settings,
            profiler,
            models_path: Settings::models_path(),
            curator_dir: Settings::curator_dir(),
            runtime,
        }
    }

    /// Read registry overrides from `path` instead of `$LUMINOUS_HOME/models.toml`
    pub fn with_models_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.models_path = path.into();
        self
    }

    /// Keep curator state under `dir` instead of `$LUMINOUS_HOME/model-curator`
    pub fn with_curator_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.curator_dir = dir.into();
        self
    }

    pub fn curator_store(&self) -> CuratorStore {
        CuratorStore::new(self.curator_dir.clone())
    }

    pub fn profiler(&self) -> &HardwareProfiler {
        &self.profiler
    }

    pub async fn profile(&self, refresh: bool) -> HardwareProfile {
        self.profiler.get_profile(refresh).await
    }

    /// Built-in registry, then models the curator integrated in earlier
    /// runs, then the overrides file
    pub fn registry(&self) -> Result<ModelRegistry> {
        let mut registry = ModelRegistry::with_defaults();
        for (key, spec) in self.curator_store().integrated_specs() {
            if let Err(e) = registry.insert(key.as_str(), spec) {
                tracing::warn!("Skipping integrated model {}: {}", key, e);
            }
        }
        registry.load_overrides(&self.models_path)?;
        Ok(registry)
    }

    /// Orchestrator for the cached hardware profile, council convened
    pub async fn orchestrator(&self) -> Result<ModelOrchestrator> {
        let profile = self.profile(false).await;
        let registry = self.registry()?;
        Ok(ModelOrchestrator::new(
            profile,
            registry,
            Arc::clone(&self.runtime),
            &self.settings.orchestrator,
        )
        .await)
    }
}

/// Print a titled section header in text output
pub(crate) fn section(title: &str) {
    println!("\n=== {} ===", title);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::HardwareProbe;
    use crate::models::TaskType;
    use crate::runtime::MockRuntime;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct Fixed(f64);

    #[async_trait]
    impl HardwareProbe for Fixed {
        async fn detect(&self) -> HardwareProfile {
            HardwareProfile::new(self.0, 16.0, 8)
        }
    }

    fn context(dir: &TempDir, vram: f64, mock: &MockRuntime) -> AppContext {
        let profiler = HardwareProfiler::with_cache_path(dir.path().join("hw.json"))
            .with_probe(Arc::new(Fixed(vram)));
        AppContext::new(Settings::default(), profiler, Arc::new(mock.clone()))
            .with_models_path(dir.path().join("models.toml"))
            .with_curator_dir(dir.path().join("curator"))
    }

    #[tokio::test]
    async fn test_orchestrator_uses_profile_and_overrides() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("models.toml"),
            r#"
[[models]]
key = "nix-expert"
name = "Nix Expert"
ollama_tag = "nix-expert:latest"
min_tier = "sage"
task_types = ["search"]
"#,
        )
        .unwrap();
        let mock = MockRuntime::new().with_installed(&["gemma3:1b"]);
        let ctx = context(&dir, 32.0, &mock);

        let mut orchestrator = ctx.orchestrator().await.unwrap();
        assert_eq!(orchestrator.profile().vram_gb(), 32.0);
        assert_eq!(
            orchestrator.select_model_for_task(TaskType::Search),
            "nix-expert:latest"
        );
        assert_eq!(
            orchestrator.council().get(crate::orchestrator::CouncilRole::Reflex),
            Some("gemma3-1b")
        );
    }

    #[tokio::test]
    async fn test_invalid_overrides_surface_as_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("models.toml"), "[[models]]\nkey = 1").unwrap();
        let ctx = context(&dir, 8.0, &MockRuntime::new());
        assert!(ctx.registry().is_err());
        assert!(ctx.orchestrator().await.is_err());
    }

    #[test]
    fn test_load_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(ctx.settings, Settings::default());
    }
}

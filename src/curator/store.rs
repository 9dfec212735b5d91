// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Curator state on disk
//!
//! - `discoveries.json`: every discovery ever made, updated in place
//! - `benchmarks.json`: latest benchmark per model id
//! - `evolution.log`: append-only event log, one line per event

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::Result;
use crate::models::{ModelSpec, TaskType};

use super::benchmark::BenchmarkResult;
use super::discovery::{EvaluationStatus, ModelDiscovery};

/// One task's line in `benchmarks.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub task_type: TaskType,
    pub accuracy: f64,
    pub speed: f64,
    pub quality_score: f64,
    pub overall_score: f64,
}

impl From<&BenchmarkResult> for BenchmarkSummary {
    fn from(result: &BenchmarkResult) -> Self {
        Self {
            task_type: result.task_type,
            accuracy: result.accuracy,
            speed: result.speed,
            quality_score: result.quality_score,
            overall_score: result.overall_score(),
        }
    }
}

/// A model's entry in `benchmarks.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub evaluated_at: DateTime<Utc>,
    pub evaluation_score: Option<f64>,
    pub benchmarks: Vec<BenchmarkSummary>,
}

/// Files under the curator state directory
#[derive(Debug, Clone)]
pub struct CuratorStore {
    dir: PathBuf,
}

impl CuratorStore {
    /// Store rooted at `$LUMINOUS_HOME/model-curator`
    pub fn open_default() -> Self {
        Self::new(Settings::curator_dir())
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn discoveries_path(&self) -> PathBuf {
        self.dir.join("discoveries.json")
    }

    pub fn benchmarks_path(&self) -> PathBuf {
        self.dir.join("benchmarks.json")
    }

    pub fn evolution_log_path(&self) -> PathBuf {
        self.dir.join("evolution.log")
    }

    /// All stored discoveries. Missing file means none.
    pub fn load_discoveries(&self) -> Result<Vec<ModelDiscovery>> {
        let path = self.discoveries_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Registry entries for every integrated discovery. An unreadable
    /// store yields none.
    pub fn integrated_specs(&self) -> Vec<(String, ModelSpec)> {
        let discoveries = match self.load_discoveries() {
            Ok(discoveries) => discoveries,
            Err(e) => {
                tracing::warn!("Could not read stored discoveries: {}", e);
                return Vec::new();
            }
        };
        discoveries
            .into_iter()
            .filter(|d| d.status() == EvaluationStatus::Integrated)
            .map(|d| (d.model_id.clone(), d.to_spec()))
            .collect()
    }

    /// Insert or update discoveries by model id. A corrupt file is set
    /// aside and replaced.
    pub fn upsert_discoveries(&self, discoveries: &[ModelDiscovery]) -> Result<()> {
        if discoveries.is_empty() {
            return Ok(());
        }
        let mut existing: Vec<ModelDiscovery> = self.read_or_reset(&self.discoveries_path())?;
        for discovery in discoveries {
            match existing.iter_mut().find(|d| d.model_id == discovery.model_id) {
                Some(slot) => *slot = discovery.clone(),
                None => existing.push(discovery.clone()),
            }
        }
        self.write_json(&self.discoveries_path(), &existing)
    }

    pub fn load_benchmarks(&self) -> Result<BTreeMap<String, BenchmarkRecord>> {
        let path = self.benchmarks_path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the benchmark record for `discovery`. A corrupt file is set
    /// aside and replaced.
    pub fn save_benchmarks(&self, discovery: &ModelDiscovery, results: &[BenchmarkResult]) -> Result<()> {
        let mut records: BTreeMap<String, BenchmarkRecord> = self.read_or_reset(&self.benchmarks_path())?;
        records.insert(
            discovery.model_id.clone(),
            BenchmarkRecord {
                evaluated_at: Utc::now(),
                evaluation_score: discovery.evaluation_score,
                benchmarks: results.iter().map(BenchmarkSummary::from).collect(),
            },
        );
        self.write_json(&self.benchmarks_path(), &records)
    }

    /// Append `<timestamp> - EVENT: model_id` and an optional notes line
    pub fn log_event(&self, discovery: &ModelDiscovery, event: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.evolution_log_path())?;
        writeln!(file, "{} - {}: {}", Utc::now().to_rfc3339(), event, discovery.model_id)?;
        if let Some(notes) = &discovery.notes {
            writeln!(file, "  Notes: {}", notes)?;
        }
        Ok(())
    }

    /// Parse `path`, or start empty when it is missing or corrupt. A
    /// corrupt file is renamed to `<name>.corrupt`.
    fn read_or_reset<T: DeserializeOwned + Default>(&self, path: &Path) -> Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(value) => Ok(value),
            Err(e) => {
                let aside = path.with_extension("json.corrupt");
                tracing::warn!("Corrupt {:?} ({}), moving it to {:?}", path, e, aside);
                std::fs::rename(path, &aside)?;
                Ok(T::default())
            }
        }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

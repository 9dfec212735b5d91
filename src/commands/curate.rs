// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model curator commands

use crate::cli::args::{EvolveArgs, OutputFormat};
use crate::curator::{EvolutionReport, EvolutionStatus, ModelCurator};
use crate::error::Result;

use super::{section, AppContext};

/// Execute the evolve command
pub async fn evolve(ctx: &AppContext, args: &EvolveArgs, format: &OutputFormat) -> Result<()> {
    let mut orchestrator = ctx.orchestrator().await?;
    let auto_integrate = args.auto_integrate || ctx.settings.curator.auto_integrate;
    let mut curator = ModelCurator::new(
        &orchestrator,
        ctx.curator_store(),
        ctx.settings.curator.clone(),
    )
    .with_auto_integrate(auto_integrate);

    let report = curator.evolve(&mut orchestrator).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Execute the curator command
pub async fn curator(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let orchestrator = ctx.orchestrator().await?;
    let curator = ModelCurator::new(
        &orchestrator,
        ctx.curator_store(),
        ctx.settings.curator.clone(),
    );
    let status = curator.get_evolution_status(&orchestrator);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => print_status(&status),
    }
    Ok(())
}

fn print_report(report: &EvolutionReport) {
    section("Evolution Cycle");
    println!("Duration: {:.1}s", report.duration_secs);

    if report.discoveries.is_empty() {
        println!("No new models discovered");
    } else {
        println!("Discovered: {}", report.discoveries.join(", "));
    }

    if !report.evaluations.is_empty() {
        section("Evaluations");
        for evaluation in &report.evaluations {
            let score = evaluation
                .score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<28} {:>5}  {}", evaluation.model, score, evaluation.status);
        }
    }

    if !report.integrations.is_empty() {
        section("Integrated");
        for model in &report.integrations {
            println!("  • {}", model);
        }
        if !report.new_capabilities.is_empty() {
            println!("New capabilities: {}", report.new_capabilities.join(", "));
        }
    }
    println!();
}

fn print_status(status: &EvolutionStatus) {
    section("Model Curator");
    println!("Known models: {}", status.known_models);
    println!("Registry size: {}", status.integrated_models);
    println!("Queued: {}", status.discovery_queue);
    println!("  pending evaluation: {}", status.pending_evaluation);
    println!("  approved: {}", status.approved_models);

    if !status.recent_discoveries.is_empty() {
        section("Recent Discoveries");
        for recent in &status.recent_discoveries {
            println!("  {:<28} {:<7} {}", recent.model, recent.source.as_str(), recent.status);
        }
    }

    let tasks: Vec<String> = status.available_tasks.iter().map(|t| t.to_string()).collect();
    println!("\nCovered tasks: {}", tasks.join(", "));
    println!();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::config::Settings;
    use crate::curator::{CuratorStore, EvaluationStatus};
    use crate::hardware::{HardwareProbe, HardwareProfile, HardwareProfiler};
    use crate::models::TaskType;
    use crate::runtime::{MockOutcome, MockRuntime, ModelDetails};

    struct Workstation;

    #[async_trait]
    impl HardwareProbe for Workstation {
        async fn detect(&self) -> HardwareProfile {
            HardwareProfile::new(12.0, 32.0, 8)
        }
    }

    fn context(dir: &TempDir, mock: &MockRuntime) -> AppContext {
        let profiler = HardwareProfiler::with_cache_path(dir.path().join("hw.json"))
            .with_probe(Arc::new(Workstation));
        AppContext::new(Settings::default(), profiler, Arc::new(mock.clone()))
            .with_models_path(dir.path().join("models.toml"))
            .with_curator_dir(dir.path().join("curator"))
    }

    #[tokio::test]
    async fn test_evolve_persists_discoveries() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new()
            .with_installed(&["fresh:1b"])
            .with_fallback(MockOutcome::Fail);
        let ctx = context(&dir, &mock);

        let args = EvolveArgs {
            auto_integrate: false,
        };
        evolve(&ctx, &args, &OutputFormat::Json).await.unwrap();

        let stored = CuratorStore::new(dir.path().join("curator"))
            .load_discoveries()
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].model_id, "fresh-1b");
        assert_eq!(stored[0].status(), EvaluationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_integrated_model_survives_into_next_run() {
        let dir = TempDir::new().unwrap();
        let answer = format!(
            "```\ndef solve():\n    pass\n```\nThis happens because of a missing fix!\n{}",
            "detail ".repeat(400)
        );
        let mock = MockRuntime::new()
            .with_installed(&["great:1b"])
            .with_details(
                "great:1b",
                ModelDetails {
                    size_gb: Some(1.0),
                    capabilities: vec!["code".to_string()],
                },
            )
            .with_fallback(MockOutcome::Respond(answer));

        let args = EvolveArgs {
            auto_integrate: true,
        };
        evolve(&context(&dir, &mock), &args, &OutputFormat::Json)
            .await
            .unwrap();

        let next = context(&dir, &mock);
        let registry = next.registry().unwrap();
        let spec = registry.get("great-1b").unwrap();
        assert_eq!(spec.ollama_tag(), "great:1b");
        assert!(spec.supports(TaskType::CodeGeneration));

        let orchestrator = next.orchestrator().await.unwrap();
        assert!(orchestrator.registry().contains_key("great-1b"));
        let mut curator = ModelCurator::new(
            &orchestrator,
            next.curator_store(),
            next.settings.curator.clone(),
        );
        assert!(curator.scan_registry().await.is_empty());
    }

    #[tokio::test]
    async fn test_curator_status_without_runtime() {
        let dir = TempDir::new().unwrap();
        let mock = MockRuntime::new().with_list_failure();
        let ctx = context(&dir, &mock);

        curator(&ctx, &OutputFormat::Text).await.unwrap();
        curator(&ctx, &OutputFormat::Json).await.unwrap();
        assert!(!dir.path().join("curator").join("discoveries.json").exists());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model selection and execution commands

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

use crate::cli::args::{OutputFormat, RunArgs, SelectArgs};
use crate::error::{LuminousError, Result};
use crate::hardware::HardwareTier;
use crate::models::TaskType;
use crate::orchestrator::{
    estimate_confidence, CouncilRole, ExecuteOptions, ExecutionResult, ModelOrchestrator,
    PromptExecutor, PromptMetadata,
};

use super::{section, AppContext};

#[derive(Serialize)]
struct Selection<'a> {
    task: TaskType,
    tier: HardwareTier,
    model: &'a str,
}

/// Execute the select command
pub async fn select(ctx: &AppContext, args: &SelectArgs, format: &OutputFormat) -> Result<()> {
    // Unknown task names are a caller mistake here, not a routing hint
    let task: TaskType = args.task.parse()?;
    let mut orchestrator = ctx.orchestrator().await?;
    let model = orchestrator.select_model_for_task(task);

    let selection = Selection {
        task,
        tier: orchestrator.profile().tier(),
        model: &model,
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selection)?),
        OutputFormat::Text => println!("{} ({} tier): {}", task, selection.tier, model),
    }
    Ok(())
}

/// Execute the run command
pub async fn run(ctx: &AppContext, args: &RunArgs, format: &OutputFormat) -> Result<()> {
    let metadata = PromptMetadata {
        task_type: args.task.clone(),
        requires_speed: args.fast,
        temperature: args.temperature,
        persona: args.persona.clone(),
    };
    let orchestrator = ctx.orchestrator().await?;

    let result = match &args.model {
        Some(model) => run_on_model(orchestrator, model, &args.prompt, &metadata).await,
        None => {
            let mut executor = PromptExecutor::new(orchestrator, ctx.settings.history.capacity);
            executor.execute(&args.prompt, &metadata).await
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            if result.success {
                println!("{}", result.response.trim_end());
                tracing::info!(
                    "{} answered at {:.1} tokens/sec (confidence {:.2})",
                    result.model_used,
                    result.tokens_per_sec,
                    result.confidence
                );
            }
        }
    }

    if result.success {
        Ok(())
    } else {
        Err(LuminousError::NoResponse(format!(
            "{} ({})",
            result.model_used,
            result.error.as_deref().unwrap_or("unknown error")
        )))
    }
}

/// Run directly on an explicit model, bypassing selection
async fn run_on_model(
    mut orchestrator: ModelOrchestrator,
    model: &str,
    prompt: &str,
    metadata: &PromptMetadata,
) -> ExecutionResult {
    let options = ExecuteOptions {
        temperature: metadata.temperature(),
        ..Default::default()
    };
    let started = Instant::now();
    match orchestrator.execute(model, prompt, options).await {
        Some(response) => {
            let elapsed = started.elapsed().as_secs_f64().max(0.001);
            ExecutionResult {
                success: true,
                tokens_per_sec: response.split_whitespace().count() as f64 / elapsed,
                confidence: estimate_confidence(&response),
                response,
                model_used: model.to_string(),
                error: None,
            }
        }
        None => ExecutionResult {
            success: false,
            response: String::new(),
            model_used: model.to_string(),
            tokens_per_sec: 0.0,
            confidence: 0.0,
            error: Some("execution_failed".to_string()),
        },
    }
}

/// Execute the council command
pub async fn council(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let orchestrator = ctx.orchestrator().await?;

    if matches!(format, OutputFormat::Json) {
        let roles: BTreeMap<_, _> = CouncilRole::ALL
            .into_iter()
            .map(|role| (role, orchestrator.council_model(role)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    section("Sacred Council");
    for (role, key) in orchestrator.council().assignments() {
        let binding = key
            .and_then(|k| orchestrator.registry().get(k))
            .map(|spec| format!("{} ({})", spec.name(), spec.ollama_tag()))
            .unwrap_or_else(|| "vacant".to_string());
        println!("  {:<11} {}", role.to_string(), binding);
    }
    println!();
    Ok(())
}

/// Execute the status command
pub async fn status(ctx: &AppContext, format: &OutputFormat) -> Result<()> {
    let mut orchestrator = ctx.orchestrator().await?;
    let status = orchestrator.orchestra_status();

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    section(&format!("Model Orchestra ({} tier)", status.hardware_tier));
    for (task, model) in &status.assignments {
        println!("  {:<22} {}", task.to_string(), model);
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::OrchestratorConfig;
    use crate::hardware::HardwareProfile;
    use crate::models::ModelRegistry;
    use crate::orchestrator::{ExecutionPolicy, SacredCouncil};
    use crate::runtime::{MockOutcome, MockRuntime};

    fn orchestrator(mock: &MockRuntime) -> ModelOrchestrator {
        ModelOrchestrator::with_council(
            HardwareProfile::new(8.0, 16.0, 8),
            ModelRegistry::with_defaults(),
            Arc::new(mock.clone()),
            &OrchestratorConfig::default(),
            SacredCouncil::vacant(),
        )
        .with_policy(ExecutionPolicy::default().without_delay())
    }

    #[tokio::test]
    async fn test_run_on_explicit_model() {
        let mock = MockRuntime::new()
            .with_installed(&["custom:1b"])
            .with_fallback(MockOutcome::Respond("clearly fine".to_string()));
        let meta = PromptMetadata::for_task(TaskType::Configuration);

        let result = run_on_model(orchestrator(&mock), "custom:1b", "hi", &meta).await;
        assert!(result.success);
        assert_eq!(result.model_used, "custom:1b");
        assert_eq!(mock.runs()[0].temperature, 0.2);
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_on_explicit_model_failure() {
        let mock = MockRuntime::new()
            .with_installed(&["custom:1b"])
            .with_fallback(MockOutcome::Fail);
        let result = run_on_model(orchestrator(&mock), "custom:1b", "hi", &PromptMetadata::default()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("execution_failed"));
    }

    #[test]
    fn test_selection_json() {
        let selection = Selection {
            task: TaskType::CodeGeneration,
            tier: HardwareTier::Master,
            model: "qwen2:32b",
        };
        let json = serde_json::to_value(&selection).unwrap();
        assert_eq!(json["task"], "code_generation");
        assert_eq!(json["tier"], "master");
        assert_eq!(json["model"], "qwen2:32b");
    }
}

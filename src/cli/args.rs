// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for luminous.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Luminous - hardware-aware local model orchestration
#[derive(Parser, Debug)]
#[command(name = "luminous")]
#[command(version, about = "Hardware-aware local model orchestration")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to $LUMINOUS_HOME/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show hardware profile, tier and recommended models
    #[command(alias = "hw")]
    System(SystemArgs),

    /// Show which model would handle a task
    Select(SelectArgs),

    /// Run a prompt on the best model for its task
    Run(RunArgs),

    /// Show Sacred Council role assignments
    Council,

    /// Show the selected model for every task type
    Status,

    /// Run one model discovery and evaluation cycle
    Evolve(EvolveArgs),

    /// Show model curator state
    Curator,
}

/// Arguments for the system subcommand
#[derive(clap::Args, Debug)]
pub struct SystemArgs {
    /// Re-detect hardware instead of using the cached profile
    #[arg(short, long)]
    pub refresh: bool,
}

/// Arguments for the select subcommand
#[derive(clap::Args, Debug)]
pub struct SelectArgs {
    /// Task type (e.g. conversation, code_generation, search)
    pub task: String,
}

/// Arguments for the run subcommand
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// The prompt to run
    pub prompt: String,

    /// Task type used for model routing
    #[arg(short, long)]
    pub task: Option<String>,

    /// Run on this runtime model instead of selecting one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (defaults per task type)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Prefer the fastest model
    #[arg(long)]
    pub fast: bool,

    /// Persona tag recorded with the execution
    #[arg(long)]
    pub persona: Option<String>,
}

/// Arguments for the evolve subcommand
#[derive(clap::Args, Debug)]
pub struct EvolveArgs {
    /// Integrate approved models into the registry
    #[arg(long)]
    pub auto_integrate: bool,
}

/// Output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,

    /// JSON output
    Json,
}

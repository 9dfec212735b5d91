// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Luminous - hardware-aware orchestration of local language models.
//!
//! This crate exposes the runtime used by the `luminous` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `hardware`: VRAM-based tier classification, detection and profile caching
//! - `models`: task types, model specs and the ordered model registry
//! - `runtime`: the local model runtime seam (`ollama` CLI plus a scripted mock)
//! - `orchestrator`: per-task model selection, execution with retries,
//!   the Sacred Council role assignments and prompt execution history
//! - `curator`: discovery, benchmarking and integration of new models
//! - `commands`, `cli`: the command-line surface

pub mod cli;
pub mod commands;
pub mod config;
pub mod curator;
pub mod error;
pub mod hardware;
pub mod models;
pub mod orchestrator;
pub mod runtime;

pub use error::{LuminousError, Result};

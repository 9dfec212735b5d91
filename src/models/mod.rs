// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model registry system
//!
//! A registry of capability-tagged models. Each entry declares the tasks it
//! handles, the minimum hardware tier it needs, and the tag the external
//! runtime knows it by.
//!
//! ## Configuration
//!
//! Models are loaded from:
//! 1. Built-in defaults (always available)
//! 2. `$LUMINOUS_HOME/models.toml` for user customization
//!
//! ## Example Configuration
//!
//! ```toml
//! [[models]]
//! key = "phi3-mini"
//! name = "Phi 3 Mini"
//! ollama_tag = "phi3:mini"
//! min_tier = "apprentice"
//! task_types = ["conversation", "search"]
//! context_window = 4096
//! ```

pub mod registry;
pub mod schema;

pub use registry::ModelRegistry;
pub use schema::{ModelOverride, ModelSpec, ModelsConfig, TaskType};

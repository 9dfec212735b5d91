// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Configuration module for Luminous
//!
//! Handles loading, saving, and locating user settings and state files.

pub mod settings;

pub use settings::*;

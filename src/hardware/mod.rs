// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Hardware detection and tier classification
//!
//! Host capability is reduced to a [`HardwareTier`] derived from VRAM, which
//! drives which registry models are eligible for selection.

pub mod detector;
pub mod profiler;
pub mod tier;

pub use detector::*;
pub use profiler::*;
pub use tier::*;

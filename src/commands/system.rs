// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System hardware information command

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::args::{OutputFormat, SystemArgs};
use crate::error::Result;
use crate::hardware::{HardwareProfile, HardwareProfiler, HardwareTier, ModelCategory};

use super::{section, AppContext};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HardwareInfo<'a> {
    tier: HardwareTier,
    tier_description: &'static str,
    vram_gb: f64,
    ram_gb: f64,
    cpu_cores: u32,
    gpu_name: Option<&'a str>,
    cuda: bool,
    rocm: bool,
    metal: bool,
    estimated_tokens_per_sec: u32,
    recommended_models: BTreeMap<ModelCategory, &'static str>,
}

impl<'a> HardwareInfo<'a> {
    fn from_profile(profile: &'a HardwareProfile) -> Self {
        let accelerators = profile.accelerators();
        Self {
            tier: profile.tier(),
            tier_description: profile.tier().description(),
            vram_gb: profile.vram_gb(),
            ram_gb: profile.ram_gb(),
            cpu_cores: profile.cpu_cores(),
            gpu_name: profile.gpu_name(),
            cuda: accelerators.cuda,
            rocm: accelerators.rocm,
            metal: accelerators.metal,
            estimated_tokens_per_sec: profile.estimated_tokens_per_sec(),
            recommended_models: HardwareProfiler::recommend_models(profile),
        }
    }
}

/// Execute the system command
pub async fn execute(ctx: &AppContext, args: &SystemArgs, format: &OutputFormat) -> Result<()> {
    let profile = ctx.profile(args.refresh).await;
    let info = HardwareInfo::from_profile(&profile);

    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    section("Luminous Hardware Profile");
    println!();
    println!("Tier: {} ({})", info.tier, info.tier_description);
    println!("GPU: {}", info.gpu_name.unwrap_or("none detected"));
    println!("VRAM: {:.1}GB", info.vram_gb);
    println!("RAM: {:.1}GB", info.ram_gb);
    println!("CPU cores: {}", info.cpu_cores);

    let mut accelerators = Vec::new();
    if info.cuda {
        accelerators.push("CUDA");
    }
    if info.rocm {
        accelerators.push("ROCm");
    }
    if info.metal {
        accelerators.push("Metal");
    }
    if accelerators.is_empty() {
        println!("Acceleration: CPU only");
    } else {
        println!("Acceleration: {}", accelerators.join(", "));
    }

    section("Recommended Models");
    for (category, model) in &info.recommended_models {
        println!("  • {:<13} {}", category.to_string(), model);
    }

    section("Expected Performance");
    println!("~{} tokens/sec", info.estimated_tokens_per_sec);

    if !args.refresh {
        println!(
            "\nProfile cached at {}. Run 'luminous system --refresh' to re-detect.",
            ctx.profiler().cache_path().display()
        );
    }
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::Accelerators;

    #[test]
    fn test_hardware_info_json_shape() {
        let profile = HardwareProfile::new(12.0, 32.0, 16).with_gpu(
            Some("NVIDIA GeForce RTX 4070".to_string()),
            Accelerators {
                cuda: true,
                rocm: false,
                metal: false,
            },
        );
        let json = serde_json::to_value(HardwareInfo::from_profile(&profile)).unwrap();

        assert_eq!(json["tier"], "journeyman");
        assert_eq!(json["vramGb"], 12.0);
        assert_eq!(json["cpuCores"], 16);
        assert_eq!(json["gpuName"], "NVIDIA GeForce RTX 4070");
        assert_eq!(json["cuda"], true);
        assert!(json["recommendedModels"]["coding"].is_string());
        assert!(json["recommendedModels"]["vision"].is_string());
    }

    #[test]
    fn test_hardware_info_without_gpu() {
        let profile = HardwareProfile::new(0.0, 8.0, 4);
        let info = HardwareInfo::from_profile(&profile);
        assert_eq!(info.tier, HardwareTier::Novice);
        assert!(info.gpu_name.is_none());
        assert!(!info.cuda && !info.rocm && !info.metal);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System hardware detection and profiling
//!
//! Every probe is best-effort: a missing tool, a timeout or unparseable
//! output falls through to the next probe and finally to conservative
//! defaults. Detection never fails.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sysinfo::System;
use tokio::process::Command;

use super::tier::HardwareTier;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RAM_GB: f64 = 8.0;
const DEFAULT_CPU_CORES: u32 = 4;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Accelerator backends found on the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerators {
    pub cuda: bool,
    pub rocm: bool,
    pub metal: bool,
}

impl Accelerators {
    pub fn any(&self) -> bool {
        self.cuda || self.rocm || self.metal
    }
}

/// Immutable snapshot of host capability.
///
/// `tier` is always the tier implied by `vram_gb`; the only way to build a
/// profile is through [`HardwareProfile::new`], which derives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    tier: HardwareTier,
    vram_gb: f64,
    ram_gb: f64,
    cpu_cores: u32,
    gpu_name: Option<String>,
    has_cuda: bool,
    has_rocm: bool,
    has_metal: bool,
    estimated_tokens_per_sec: u32,
}

impl HardwareProfile {
    /// Build a CPU-only profile; negative or non-finite sizes clamp to zero
    pub fn new(vram_gb: f64, ram_gb: f64, cpu_cores: u32) -> Self {
        let vram_gb = sanitize_gb(vram_gb);
        let tier = HardwareTier::for_vram(vram_gb);
        let mut profile = Self {
            tier,
            vram_gb,
            ram_gb: sanitize_gb(ram_gb),
            cpu_cores: cpu_cores.max(1),
            gpu_name: None,
            has_cuda: false,
            has_rocm: false,
            has_metal: false,
            estimated_tokens_per_sec: 0,
        };
        profile.estimated_tokens_per_sec = profile.estimate_tokens_per_sec();
        profile
    }

    /// Attach GPU identity and accelerator flags
    pub fn with_gpu(mut self, gpu_name: Option<String>, accelerators: Accelerators) -> Self {
        self.gpu_name = gpu_name;
        self.has_cuda = accelerators.cuda;
        self.has_rocm = accelerators.rocm;
        self.has_metal = accelerators.metal;
        self.estimated_tokens_per_sec = self.estimate_tokens_per_sec();
        self
    }

    pub fn tier(&self) -> HardwareTier {
        self.tier
    }

    pub fn vram_gb(&self) -> f64 {
        self.vram_gb
    }

    pub fn ram_gb(&self) -> f64 {
        self.ram_gb
    }

    pub fn cpu_cores(&self) -> u32 {
        self.cpu_cores
    }

    pub fn gpu_name(&self) -> Option<&str> {
        self.gpu_name.as_deref()
    }

    pub fn accelerators(&self) -> Accelerators {
        Accelerators {
            cuda: self.has_cuda,
            rocm: self.has_rocm,
            metal: self.has_metal,
        }
    }

    pub fn estimated_tokens_per_sec(&self) -> u32 {
        self.estimated_tokens_per_sec
    }

    /// Whether the stored tier matches the one implied by `vram_gb`.
    ///
    /// Deserialized profiles can violate this if the file was edited by hand.
    pub fn is_consistent(&self) -> bool {
        self.vram_gb.is_finite()
            && self.vram_gb >= 0.0
            && self.ram_gb >= 0.0
            && self.cpu_cores >= 1
            && HardwareTier::for_vram(self.vram_gb) == self.tier
    }

    fn estimate_tokens_per_sec(&self) -> u32 {
        let baseline = self.tier.baseline_tokens_per_sec();
        if self.accelerators().any() {
            baseline
        } else {
            // CPU inference scales roughly with core count
            baseline.min(self.cpu_cores.saturating_mul(2))
        }
    }
}

fn sanitize_gb(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Source of fresh hardware profiles
#[async_trait]
pub trait HardwareProbe: Send + Sync {
    /// Detect the host profile. Must not fail.
    async fn detect(&self) -> HardwareProfile;
}

/// Probes the real host using sysinfo and vendor GPU tools
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

#[async_trait]
impl HardwareProbe for SystemProbe {
    async fn detect(&self) -> HardwareProfile {
        let (ram_gb, cpu_cores) = detect_memory_and_cpu();
        let gpu = detect_gpu(ram_gb).await;

        let profile = match gpu {
            Some(gpu) => HardwareProfile::new(gpu.vram_gb, ram_gb, cpu_cores)
                .with_gpu(gpu.name, gpu.accelerators),
            None => HardwareProfile::new(0.0, ram_gb, cpu_cores),
        };

        tracing::info!(
            "Detected hardware: tier={} vram={:.1}GB ram={:.1}GB cores={}",
            profile.tier(),
            profile.vram_gb(),
            profile.ram_gb(),
            profile.cpu_cores()
        );
        profile
    }
}

fn detect_memory_and_cpu() -> (f64, u32) {
    let mut sys = System::new_all();
    sys.refresh_all();

    let ram_bytes = sys.total_memory();
    let ram_gb = if ram_bytes == 0 {
        tracing::debug!("Total memory unreadable, assuming {}GB", DEFAULT_RAM_GB);
        DEFAULT_RAM_GB
    } else {
        ram_bytes as f64 / BYTES_PER_GB
    };

    let cpu_cores = match sys.cpus().len() {
        0 => DEFAULT_CPU_CORES,
        n => n as u32,
    };

    (ram_gb, cpu_cores)
}

/// GPU facts extracted from a single probe
#[derive(Debug, Clone, PartialEq)]
pub struct GpuProbe {
    pub name: Option<String>,
    pub vram_gb: f64,
    pub accelerators: Accelerators,
}

async fn detect_gpu(ram_gb: f64) -> Option<GpuProbe> {
    if let Some(out) = probe_output(
        "nvidia-smi",
        &[
            "--query-gpu=name,memory.total",
            "--format=csv,noheader,nounits",
        ],
    )
    .await
    {
        if let Some(gpu) = parse_nvidia_smi(&out) {
            return Some(gpu);
        }
    }

    if let Some(out) = probe_output("rocm-smi", &["--showmeminfo", "vram", "--csv"]).await {
        if let Some(gpu) = parse_rocm_smi(&out) {
            return Some(gpu);
        }
    }

    if cfg!(target_os = "macos") {
        if let Some(out) = probe_output("system_profiler", &["SPDisplaysDataType"]).await {
            if let Some(gpu) = parse_system_profiler(&out, ram_gb) {
                return Some(gpu);
            }
        }
    }

    tracing::debug!("No GPU probe succeeded, assuming 0GB VRAM");
    None
}

/// Run a probe command, returning stdout only on a clean, timely exit
async fn probe_output(program: &str, args: &[&str]) -> Option<String> {
    let child = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(PROBE_TIMEOUT, child).await {
        Ok(Ok(output)) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(output)) => {
            tracing::debug!("{} exited with {}", program, output.status);
            None
        }
        Ok(Err(e)) => {
            tracing::debug!("{} unavailable: {}", program, e);
            None
        }
        Err(_) => {
            tracing::debug!("{} timed out", program);
            None
        }
    }
}

/// Parse `nvidia-smi --query-gpu=name,memory.total --format=csv,noheader,nounits`.
///
/// Memory is reported in MiB. With several GPUs the largest one wins, since
/// a model has to fit on a single card.
pub fn parse_nvidia_smi(output: &str) -> Option<GpuProbe> {
    let mut best: Option<(String, f64)> = None;

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.rsplitn(2, ',');
        let mem = parts.next()?.trim().parse::<f64>().ok()?;
        let name = parts.next()?.trim().to_string();
        let vram_gb = mem / 1024.0;
        if best.as_ref().map_or(true, |(_, v)| vram_gb > *v) {
            best = Some((name, vram_gb));
        }
    }

    best.map(|(name, vram_gb)| GpuProbe {
        name: Some(name),
        vram_gb,
        accelerators: Accelerators {
            cuda: true,
            ..Default::default()
        },
    })
}

/// Parse `rocm-smi --showmeminfo vram --csv`.
pub fn parse_rocm_smi(output: &str) -> Option<GpuProbe> {
    let mut lines = output.lines().filter(|l| !l.trim().is_empty());
    let header = lines.next()?;
    let column = header
        .split(',')
        .position(|h| h.contains("Total Memory") && !h.contains("Used"))?;

    let vram_bytes = lines
        .filter_map(|line| line.split(',').nth(column)?.trim().parse::<f64>().ok())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))?;

    Some(GpuProbe {
        name: None,
        vram_gb: vram_bytes / BYTES_PER_GB,
        accelerators: Accelerators {
            rocm: true,
            ..Default::default()
        },
    })
}

/// Parse `system_profiler SPDisplaysDataType` output.
///
/// Apple Silicon reports no dedicated VRAM; three quarters of unified
/// memory is treated as usable for models.
pub fn parse_system_profiler(output: &str, ram_gb: f64) -> Option<GpuProbe> {
    let mut name = None;
    let mut vram_gb = None;
    let mut metal = false;

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Chipset Model:") {
            name = Some(value.trim().to_string());
        } else if line.starts_with("VRAM") {
            if let Some((_, value)) = line.split_once(':') {
                vram_gb = parse_size_gb(value);
            }
        } else if line.starts_with("Metal") {
            metal = true;
        }
    }

    let name = name?;
    let vram_gb = match vram_gb {
        Some(v) => v,
        None if name.contains("Apple") => ram_gb * 0.75,
        None => 0.0,
    };

    Some(GpuProbe {
        name: Some(name),
        vram_gb,
        accelerators: Accelerators {
            metal,
            ..Default::default()
        },
    })
}

fn parse_size_gb(value: &str) -> Option<f64> {
    let mut parts = value.split_whitespace();
    let amount = parts.next()?.parse::<f64>().ok()?;
    match parts.next().map(str::to_ascii_uppercase).as_deref() {
        Some("GB") => Some(amount),
        Some("MB") => Some(amount / 1024.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== HardwareProfile tests =====

    #[test]
    fn test_profile_tier_follows_vram() {
        assert_eq!(
            HardwareProfile::new(10.0, 32.0, 8).tier(),
            HardwareTier::Journeyman
        );
        assert_eq!(
            HardwareProfile::new(20.0, 32.0, 8).tier(),
            HardwareTier::Master
        );
        assert_eq!(HardwareProfile::new(0.0, 8.0, 4).tier(), HardwareTier::Novice);
    }

    #[test]
    fn test_profile_clamps_invalid_values() {
        let profile = HardwareProfile::new(-3.0, f64::NAN, 0);
        assert_eq!(profile.vram_gb(), 0.0);
        assert_eq!(profile.ram_gb(), 0.0);
        assert_eq!(profile.cpu_cores(), 1);
        assert!(profile.is_consistent());
    }

    #[test]
    fn test_cpu_only_speed_limited_by_cores() {
        let profile = HardwareProfile::new(24.0, 64.0, 2);
        assert_eq!(profile.estimated_tokens_per_sec(), 4);

        let accelerated = profile.with_gpu(
            Some("RTX 4090".to_string()),
            Accelerators {
                cuda: true,
                ..Default::default()
            },
        );
        assert_eq!(accelerated.estimated_tokens_per_sec(), 80);
        assert_eq!(accelerated.gpu_name(), Some("RTX 4090"));
        assert!(accelerated.accelerators().cuda);
    }

    #[test]
    fn test_inconsistent_profile_detected() {
        let json = r#"{"tier":"sage","vram_gb":2.0,"ram_gb":8.0,"cpu_cores":4,
            "gpu_name":null,"has_cuda":false,"has_rocm":false,"has_metal":false,
            "estimated_tokens_per_sec":5}"#;
        let profile: HardwareProfile = serde_json::from_str(json).unwrap();
        assert!(!profile.is_consistent());
    }

    #[test]
    fn test_profile_serialization_roundtrip() {
        let profile = HardwareProfile::new(12.0, 32.0, 16).with_gpu(
            Some("RTX 3060".to_string()),
            Accelerators {
                cuda: true,
                ..Default::default()
            },
        );
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"vram_gb\":12.0"));
        let parsed: HardwareProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
        assert_eq!(HardwareTier::for_vram(parsed.vram_gb()), parsed.tier());
    }

    // ===== probe parser tests =====

    #[test]
    fn test_parse_nvidia_smi_single_gpu() {
        let gpu = parse_nvidia_smi("NVIDIA GeForce RTX 3080, 10240\n").unwrap();
        assert_eq!(gpu.name.as_deref(), Some("NVIDIA GeForce RTX 3080"));
        assert!((gpu.vram_gb - 10.0).abs() < 1e-9);
        assert!(gpu.accelerators.cuda);
    }

    #[test]
    fn test_parse_nvidia_smi_picks_largest() {
        let out = "Tesla T4, 15360\nNVIDIA A100-SXM4-40GB, 40960\n";
        let gpu = parse_nvidia_smi(out).unwrap();
        assert_eq!(gpu.name.as_deref(), Some("NVIDIA A100-SXM4-40GB"));
        assert!((gpu.vram_gb - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_nvidia_smi_garbage() {
        assert!(parse_nvidia_smi("").is_none());
        assert!(parse_nvidia_smi("NVIDIA-SMI has failed").is_none());
        assert!(parse_nvidia_smi("RTX, N/A").is_none());
    }

    #[test]
    fn test_parse_rocm_smi() {
        let out = "device,VRAM Total Memory (B),VRAM Total Used Memory (B)\n\
                   card0,17163091968,6156288\n";
        let gpu = parse_rocm_smi(out).unwrap();
        assert!((gpu.vram_gb - 15.984375).abs() < 1e-3);
        assert!(gpu.accelerators.rocm);
        assert_eq!(HardwareTier::for_vram(gpu.vram_gb), HardwareTier::Journeyman);
    }

    #[test]
    fn test_parse_rocm_smi_missing_column() {
        assert!(parse_rocm_smi("device,temperature\ncard0,40\n").is_none());
    }

    #[test]
    fn test_parse_system_profiler_discrete() {
        let out = "Graphics/Displays:\n\n    AMD Radeon Pro 5500M:\n\n      \
                   Chipset Model: AMD Radeon Pro 5500M\n      VRAM (Total): 8 GB\n      \
                   Metal Support: Metal 3\n";
        let gpu = parse_system_profiler(out, 32.0).unwrap();
        assert_eq!(gpu.name.as_deref(), Some("AMD Radeon Pro 5500M"));
        assert_eq!(gpu.vram_gb, 8.0);
        assert!(gpu.accelerators.metal);
    }

    #[test]
    fn test_parse_system_profiler_apple_silicon() {
        let out = "      Chipset Model: Apple M2 Pro\n      Type: GPU\n      \
                   Metal Support: Metal 3\n";
        let gpu = parse_system_profiler(out, 32.0).unwrap();
        assert_eq!(gpu.vram_gb, 24.0);
        assert_eq!(HardwareTier::for_vram(gpu.vram_gb), HardwareTier::Sage);
    }

    #[test]
    fn test_parse_size_gb_units() {
        assert_eq!(parse_size_gb(" 8 GB"), Some(8.0));
        assert_eq!(parse_size_gb("1536 MB"), Some(1.5));
        assert_eq!(parse_size_gb("lots"), None);
    }

    #[tokio::test]
    async fn test_system_probe_never_fails() {
        let profile = SystemProbe.detect().await;
        assert!(profile.is_consistent());
        assert!(profile.cpu_cores() >= 1);
    }
}

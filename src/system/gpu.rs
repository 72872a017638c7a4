use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::channel::CommandChannel;
use crate::system::parse::{section, split_sections};
use crate::system::units::UnitThresholds;

pub const EXYNOS_COMMAND: &str = concat!(
    "cat /sys/kernel/gpu/gpu_clock 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_min_clock 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_max_clock 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_governor 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_unlock 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_clklck 2>/dev/null; echo __SEP__; ",
    "cat /sys/kernel/gpu/gpu_model 2>/dev/null; true",
);

pub const ADRENO_COMMAND: &str = concat!(
    "D=/sys/devices/platform/soc/5900000.qcom,kgsl-3d0/devfreq/5900000.qcom,kgsl-3d0; ",
    "I=/sys/module/adreno_idler/parameters; ",
    "cat $D/cur_freq 2>/dev/null; echo __SEP__; ",
    "cat $D/min_freq 2>/dev/null; echo __SEP__; ",
    "cat $D/max_freq 2>/dev/null; echo __SEP__; ",
    "cat $D/governor 2>/dev/null; echo __SEP__; ",
    "cat /sys/class/kgsl/kgsl-3d0/gpu_model 2>/dev/null; echo __SEP__; ",
    "cat $D/adrenoboost 2>/dev/null || echo 0; echo __SEP__; ",
    "cat $I/adreno_idler_active 2>/dev/null || echo N; echo __SEP__; ",
    "cat $I/adreno_idler_downdifferential 2>/dev/null || echo 20; echo __SEP__; ",
    "cat $I/adreno_idler_idlewait 2>/dev/null || echo 15; echo __SEP__; ",
    "cat $I/adreno_idler_idleworkload 2>/dev/null || echo 5000",
);

/// Which sysfs layout to read the GPU from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuPlatform {
    /// Exynos first, Adreno as fallback (Adreno only on Trinket devices).
    #[default]
    Auto,
    Exynos,
    Adreno,
}

impl GpuPlatform {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "exynos" | "mali" => GpuPlatform::Exynos,
            "adreno" | "kgsl" => GpuPlatform::Adreno,
            _ => GpuPlatform::Auto,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpuClocks {
    pub cur_khz: Option<u64>,
    pub min_khz: Option<u64>,
    pub max_khz: Option<u64>,
    pub governor: String,
    pub model: String,
}

/// Exynos (Mali) reading. Feature fields are `None` when the node is missing,
/// which is different from a node reporting `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExynosGpu {
    #[serde(flatten)]
    pub clocks: GpuClocks,
    pub unlock: Option<String>,
    pub clock_lock: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdrenoIdler {
    pub active: Option<String>,
    pub down_differential: Option<String>,
    pub idle_wait: Option<String>,
    pub idle_workload: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdrenoGpu {
    #[serde(flatten)]
    pub clocks: GpuClocks,
    pub boost: Option<String>,
    pub idler: AdrenoIdler,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum GpuReading {
    Exynos(ExynosGpu),
    Adreno(AdrenoGpu),
}

impl GpuReading {
    pub fn clocks(&self) -> &GpuClocks {
        match self {
            GpuReading::Exynos(gpu) => &gpu.clocks,
            GpuReading::Adreno(gpu) => &gpu.clocks,
        }
    }

    pub fn platform(&self) -> GpuPlatform {
        match self {
            GpuReading::Exynos(_) => GpuPlatform::Exynos,
            GpuReading::Adreno(_) => GpuPlatform::Adreno,
        }
    }

    /// Platform specific rows for display, skipping features the platform
    /// does not expose.
    pub fn features(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        let mut push = |label: &'static str, value: &Option<String>, render: fn(&str) -> String| {
            if let Some(value) = value {
                rows.push((label, render(value)));
            }
        };
        match self {
            GpuReading::Exynos(gpu) => {
                push("Unlock", &gpu.unlock, on_off_label);
                push("Clock lock", &gpu.clock_lock, on_off_label);
            }
            GpuReading::Adreno(gpu) => {
                push("Adreno boost", &gpu.boost, boost_label);
                push("Idler", &gpu.idler.active, on_off_label);
                push("Idler down diff", &gpu.idler.down_differential, str::to_string);
                push("Idler idle wait", &gpu.idler.idle_wait, str::to_string);
                push("Idler workload", &gpu.idler.idle_workload, str::to_string);
            }
        }
        rows
    }
}

/// Adreno boost levels 0..=3.
pub fn boost_label(raw: &str) -> String {
    match raw.trim() {
        "0" => "Off".to_string(),
        "1" => "Low".to_string(),
        "2" => "Medium".to_string(),
        "3" => "High".to_string(),
        other => other.to_string(),
    }
}

fn on_off_label(raw: &str) -> String {
    match raw.trim() {
        "1" | "Y" | "y" => "On".to_string(),
        "0" | "N" | "n" => "Off".to_string(),
        other => other.to_string(),
    }
}

fn feature(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Accepts the Exynos reading only when the current clock node answered.
pub fn parse_exynos(output: &str, thresholds: &UnitThresholds) -> Option<GpuReading> {
    let parts = split_sections(output);
    let cur = section(&parts, 0);
    if cur.is_empty() {
        return None;
    }
    Some(GpuReading::Exynos(ExynosGpu {
        clocks: GpuClocks {
            cur_khz: thresholds.normalize_khz(cur, None),
            min_khz: thresholds.normalize_khz(section(&parts, 1), None),
            max_khz: thresholds.normalize_khz(section(&parts, 2), None),
            governor: section(&parts, 3).to_string(),
            model: section(&parts, 6).to_string(),
        },
        unlock: feature(section(&parts, 4)),
        clock_lock: feature(section(&parts, 5)),
    }))
}

pub fn parse_adreno(output: &str, thresholds: &UnitThresholds) -> GpuReading {
    let parts = split_sections(output);
    let model = match section(&parts, 4) {
        "" => "Adreno",
        model => model,
    };
    GpuReading::Adreno(AdrenoGpu {
        clocks: GpuClocks {
            cur_khz: thresholds.normalize_khz(section(&parts, 0), None),
            min_khz: thresholds.normalize_khz(section(&parts, 1), None),
            max_khz: thresholds.normalize_khz(section(&parts, 2), None),
            governor: section(&parts, 3).to_string(),
            model: model.to_string(),
        },
        boost: feature(section(&parts, 5)),
        idler: AdrenoIdler {
            active: feature(section(&parts, 6)),
            down_differential: feature(section(&parts, 7)),
            idle_wait: feature(section(&parts, 8)),
            idle_workload: feature(section(&parts, 9)),
        },
    })
}

/// How the collector should look for the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuProbe {
    pub platform: GpuPlatform,
    pub thresholds: UnitThresholds,
    /// Trinket devices have no Exynos nodes; skip the first attempt.
    pub skip_exynos: bool,
}

pub async fn fetch(channel: &dyn CommandChannel, probe: &GpuProbe) -> Option<GpuReading> {
    let try_exynos = probe.platform != GpuPlatform::Adreno && !probe.skip_exynos;
    if try_exynos {
        match channel.execute(EXYNOS_COMMAND).await {
            Ok(output) => {
                if let Some(reading) = parse_exynos(&output, &probe.thresholds) {
                    return Some(reading);
                }
                debug!("exynos gpu nodes empty");
            }
            Err(err) => debug!(error = %err, "exynos gpu read failed"),
        }
    }
    if probe.platform == GpuPlatform::Exynos {
        return None;
    }
    match channel.execute(ADRENO_COMMAND).await {
        Ok(output) if !output.is_empty() => Some(parse_adreno(&output, &probe.thresholds)),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "gpu fetch failed");
            None
        }
    }
}

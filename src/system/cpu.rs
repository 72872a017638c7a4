use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::channel::CommandChannel;
use crate::system::device::KernelFamily;
use crate::system::parse::{
    self, BootParams, parse_cmdline, parse_core_table, parse_policy_table, split_sections,
};

/// One policy row per cpufreq policy, one core row per online core, then the
/// boot command line.
pub const CPU_COMMAND: &str = concat!(
    "for p in /sys/devices/system/cpu/cpufreq/policy*; do ",
    "[ -d \"$p\" ] || continue; ",
    "id=$(basename \"$p\"); ",
    "cpus=$(cat \"$p/related_cpus\" 2>/dev/null); ",
    "cur=$(cat \"$p/scaling_cur_freq\" 2>/dev/null || cat \"$p/cpuinfo_cur_freq\" 2>/dev/null); ",
    "min=$(cat \"$p/scaling_min_freq\" 2>/dev/null); ",
    "max=$(cat \"$p/scaling_max_freq\" 2>/dev/null); ",
    "gov=$(cat \"$p/scaling_governor\" 2>/dev/null); ",
    "echo \"$id|$cpus|$cur|$min|$max|$gov\"; ",
    "done; echo __SEP__; ",
    "for c in /sys/devices/system/cpu/cpu[0-9]*; do ",
    "d=\"$c/cpufreq\"; [ -f \"$d/scaling_cur_freq\" ] || continue; ",
    "id=$(basename \"$c\"); ",
    "cur=$(cat \"$d/scaling_cur_freq\" 2>/dev/null || cat \"$d/cpuinfo_cur_freq\" 2>/dev/null); ",
    "echo \"$id|$cur\"; ",
    "done; echo __SEP__; ",
    "cat /proc/cmdline",
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuPolicyRow {
    pub policy_id: String,
    pub cpus: Vec<String>,
    pub cur_khz: Option<u64>,
    pub min_khz: Option<u64>,
    pub max_khz: Option<u64>,
    pub governor: String,
}

impl CpuPolicyRow {
    pub fn policy_number(&self) -> Option<u32> {
        numeric_suffix(&self.policy_id)
    }

    /// `cpu0-3` for a multi-core policy, `cpu4` for a single core.
    pub fn cpu_range(&self) -> Option<String> {
        let first = self.cpus.first()?;
        let last = self.cpus.last()?;
        if first == last {
            return Some(first.clone());
        }
        let last_num = last.strip_prefix("cpu").unwrap_or(last);
        Some(format!("{first}-{last_num}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuCoreRow {
    pub core_id: String,
    pub cur_khz: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterRole {
    Little,
    Mid,
    Big,
    Prime,
}

impl ClusterRole {
    pub fn label(self) -> &'static str {
        match self {
            ClusterRole::Little => "Little",
            ClusterRole::Mid => "Mid",
            ClusterRole::Big => "Big",
            ClusterRole::Prime => "Prime",
        }
    }
}

pub type ClusterRoleMap = BTreeMap<String, ClusterRole>;

/// Trailing decimal digits of an id: `policy4` -> 4.
pub fn numeric_suffix(id: &str) -> Option<u32> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    id[digits_start..].parse().ok()
}

/// Assigns roles by ascending policy number. Instantaneous frequencies are
/// never consulted since they move under thermal throttling.
pub fn classify_clusters(rows: &[CpuPolicyRow]) -> ClusterRoleMap {
    let mut numbered: Vec<(u32, &str)> = rows
        .iter()
        .filter_map(|row| Some((row.policy_number()?, row.policy_id.as_str())))
        .collect();
    numbered.sort_by_key(|(num, _)| *num);

    let count = numbered.len();
    numbered
        .into_iter()
        .enumerate()
        .map(|(idx, (_, id))| {
            let role = match (count, idx) {
                (1, _) => ClusterRole::Big,
                (2, 0) => ClusterRole::Little,
                (2, _) => ClusterRole::Big,
                (_, 0) => ClusterRole::Little,
                (n, i) if i == n - 1 => ClusterRole::Prime,
                _ => ClusterRole::Mid,
            };
            (id.to_string(), role)
        })
        .collect()
}

/// `"Big - 4 (cpu4-6)"`. Policies without a role fall back to `Cluster N`.
pub fn cluster_label(row: &CpuPolicyRow, roles: &ClusterRoleMap) -> String {
    let policy_num = row.policy_id.replace("policy", "");
    let base = match roles.get(&row.policy_id) {
        Some(role) => role.label().to_string(),
        None => format!("Cluster {policy_num}"),
    };
    match row.cpu_range() {
        Some(range) => format!("{base} - {policy_num} ({range})"),
        None => format!("{base} - {policy_num}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatusFlag {
    Enabled,
    Disabled,
    /// Unlock level reported by `superfloppy`.
    Level(String),
    Off,
    Unknown,
}

impl StatusFlag {
    pub fn label(&self) -> String {
        match self {
            StatusFlag::Enabled => "Enabled".to_string(),
            StatusFlag::Disabled => "Disabled".to_string(),
            StatusFlag::Level(level) => format!("Enabled ({level})"),
            StatusFlag::Off => "Off".to_string(),
            StatusFlag::Unknown => "--".to_string(),
        }
    }
}

pub fn is_enabled_value(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "on"
    )
}

/// Kernel feature switches read from the boot command line. `None` means the
/// row does not apply to this kernel and is hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CpuStatus {
    pub unlocked: Option<StatusFlag>,
    pub ems_efficient: Option<StatusFlag>,
    pub msm_perf_boost: Option<StatusFlag>,
}

impl CpuStatus {
    pub fn from_boot_params(params: &BootParams, family: KernelFamily) -> Self {
        let is_1280 = family == KernelFamily::Floppy1280;
        let is_trinket = family == KernelFamily::FloppyTrinketMi;

        let superfloppy = params.get("superfloppy");
        let unlocked = (superfloppy.is_some() || is_1280).then(|| match superfloppy {
            Some(level) if !level.is_empty() && level != "0" => StatusFlag::Level(level.clone()),
            _ => StatusFlag::Off,
        });

        let ems = params.get("ems_efficient");
        let ems_efficient = (ems.is_some() || is_1280).then(|| match ems {
            Some(value) if is_enabled_value(value) => StatusFlag::Enabled,
            Some(_) => StatusFlag::Disabled,
            None => StatusFlag::Unknown,
        });

        let no_boost = params.get("no_msm_perf_boost");
        let msm_perf_boost = (no_boost.is_some() || is_trinket).then(|| match no_boost {
            Some(value) if is_enabled_value(value) => StatusFlag::Disabled,
            Some(_) => StatusFlag::Enabled,
            None => StatusFlag::Unknown,
        });

        Self {
            unlocked,
            ems_efficient,
            msm_perf_boost,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_none() && self.ems_efficient.is_none() && self.msm_perf_boost.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CpuReport {
    pub policies: Vec<CpuPolicyRow>,
    pub cores: Vec<CpuCoreRow>,
    pub boot_params: BootParams,
}

impl CpuReport {
    pub fn parse(output: &str) -> Self {
        let sections = split_sections(output);
        Self {
            policies: parse_policy_table(parse::section(&sections, 0)),
            cores: parse_core_table(parse::section(&sections, 1)),
            boot_params: parse_cmdline(parse::section(&sections, 2)),
        }
    }

    /// Current frequency of each core in `policy`, in policy order.
    pub fn core_frequencies<'a>(&'a self, policy: &'a CpuPolicyRow) -> Vec<(&'a str, Option<u64>)> {
        policy
            .cpus
            .iter()
            .map(|cpu| {
                let cur = self
                    .cores
                    .iter()
                    .find(|core| core.core_id == *cpu)
                    .and_then(|core| core.cur_khz);
                (cpu.as_str(), cur)
            })
            .collect()
    }

    pub fn status(&self, family: KernelFamily) -> CpuStatus {
        CpuStatus::from_boot_params(&self.boot_params, family)
    }
}

/// Reads policies, cores and the boot command line in one round trip.
pub async fn fetch(channel: &dyn CommandChannel) -> Option<CpuReport> {
    match channel.execute(CPU_COMMAND).await {
        Ok(output) if !output.is_empty() => Some(CpuReport::parse(&output)),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "cpu fetch failed");
            None
        }
    }
}

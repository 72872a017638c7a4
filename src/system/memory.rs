use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::channel::CommandChannel;
use crate::system::parse::{parse_meminfo, parse_zram_algorithm, section, split_sections};

pub const MEMORY_COMMAND: &str = concat!(
    "cat /proc/meminfo; echo __SEP__; ",
    "cat /sys/block/zram0/disksize 2>/dev/null; echo __SEP__; ",
    "cat /sys/block/zram0/comp_algorithm 2>/dev/null; echo __SEP__; ",
    "cat /proc/sys/vm/swappiness 2>/dev/null; echo __SEP__; ",
    "cat /proc/sys/vm/dirty_ratio 2>/dev/null; echo __SEP__; ",
    "cat /proc/sys/vm/dirty_bytes 2>/dev/null; echo __SEP__; ",
    "cat /proc/sys/vm/dirty_background_ratio 2>/dev/null; echo __SEP__; ",
    "cat /proc/sys/vm/dirty_background_bytes 2>/dev/null; true",
);

/// Kernel memory counters in kB, keyed by name (`MemTotal`, `SwapFree`, ...).
/// Derived quantities are computed on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MemorySnapshot {
    counters: BTreeMap<String, u64>,
}

impl MemorySnapshot {
    pub fn parse(text: &str) -> Self {
        Self {
            counters: parse_meminfo(text),
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counters.get(key).copied()
    }

    fn counter(&self, key: &str) -> u64 {
        self.get(key).unwrap_or(0)
    }

    pub fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    pub fn total_kb(&self) -> u64 {
        self.counter("MemTotal")
    }

    /// `MemAvailable` when the kernel reports it, else free + buffers + cached.
    pub fn available_kb(&self) -> u64 {
        self.get("MemAvailable").unwrap_or_else(|| {
            self.counter("MemFree") + self.counter("Buffers") + self.counter("Cached")
        })
    }

    pub fn used_kb(&self) -> u64 {
        self.total_kb().saturating_sub(self.available_kb())
    }

    pub fn swap_total_kb(&self) -> u64 {
        self.counter("SwapTotal")
    }

    pub fn swap_used_kb(&self) -> u64 {
        self.swap_total_kb().saturating_sub(self.counter("SwapFree"))
    }

    pub fn used_percent(&self) -> f32 {
        percent(self.used_kb(), self.total_kb())
    }

    pub fn swap_used_percent(&self) -> f32 {
        percent(self.swap_used_kb(), self.swap_total_kb())
    }
}

fn percent(part: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 100.0) as f32
}

/// `vm.dirty_*` limits. The kernel honors the byte limits whenever either is
/// non-zero, otherwise the ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DirtyLimits {
    Ratio {
        dirty: Option<String>,
        background: Option<String>,
    },
    Bytes {
        dirty: u64,
        background: u64,
    },
}

impl DirtyLimits {
    pub fn from_raw(ratio: &str, bytes: &str, bg_ratio: &str, bg_bytes: &str) -> Self {
        let dirty_bytes = bytes.trim().parse().unwrap_or(0);
        let background_bytes = bg_bytes.trim().parse().unwrap_or(0);
        if dirty_bytes > 0 || background_bytes > 0 {
            return DirtyLimits::Bytes {
                dirty: dirty_bytes,
                background: background_bytes,
            };
        }
        let value = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        DirtyLimits::Ratio {
            dirty: value(ratio),
            background: value(bg_ratio),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryReport {
    pub meminfo: MemorySnapshot,
    pub zram_disksize: Option<u64>,
    pub zram_algorithm: Option<String>,
    pub swappiness: Option<String>,
    pub dirty: DirtyLimits,
}

impl MemoryReport {
    pub fn parse(output: &str) -> Self {
        let parts = split_sections(output);
        let swappiness = section(&parts, 3);
        Self {
            meminfo: MemorySnapshot::parse(section(&parts, 0)),
            zram_disksize: section(&parts, 1).parse().ok(),
            zram_algorithm: parse_zram_algorithm(section(&parts, 2)),
            swappiness: (!swappiness.is_empty()).then(|| swappiness.to_string()),
            dirty: DirtyLimits::from_raw(
                section(&parts, 4),
                section(&parts, 5),
                section(&parts, 6),
                section(&parts, 7),
            ),
        }
    }
}

pub async fn fetch(channel: &dyn CommandChannel) -> Option<MemoryReport> {
    match channel.execute(MEMORY_COMMAND).await {
        Ok(output) if !output.is_empty() => Some(MemoryReport::parse(&output)),
        Ok(_) => None,
        Err(err) => {
            warn!(error = %err, "memory fetch failed");
            None
        }
    }
}

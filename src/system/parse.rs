//! Lenient parsers for the raw text the device hands back.
//!
//! None of these fail: malformed lines are dropped and the rest of the input
//! is still used.

use std::collections::BTreeMap;

use crate::system::cpu::{CpuCoreRow, CpuPolicyRow};

/// Marker echoed between the sections of a batched command.
pub const SECTION_SEPARATOR: &str = "__SEP__";

/// Ordered `key=value` pairs from a tweak backend response.
pub type KeyValues = BTreeMap<String, String>;

/// Parameters from the kernel boot command line.
pub type BootParams = BTreeMap<String, String>;

/// Splits batched output on [`SECTION_SEPARATOR`] and trims each section.
pub fn split_sections(output: &str) -> Vec<&str> {
    output.split(SECTION_SEPARATOR).map(str::trim).collect()
}

/// Returns section `index`, or `""` when the output was cut short.
pub fn section<'a>(sections: &[&'a str], index: usize) -> &'a str {
    sections.get(index).copied().unwrap_or("")
}

/// Parses `/proc/meminfo` style text into counter name -> kB.
pub fn parse_meminfo(text: &str) -> BTreeMap<String, u64> {
    text.lines()
        .filter_map(parse_meminfo_line)
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn parse_meminfo_line(line: &str) -> Option<(&str, u64)> {
    let (key, rest) = line.split_once(':')?;
    if key.is_empty() {
        return None;
    }
    let value = rest.strip_prefix(char::is_whitespace)?.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let number = value[..end].parse().ok()?;
    Some((key, number))
}

/// Parses `id|cpus|cur|min|max|gov` records. Records with fewer than six
/// fields are skipped.
pub fn parse_policy_table(text: &str) -> Vec<CpuPolicyRow> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < 6 {
                return None;
            }
            Some(CpuPolicyRow {
                policy_id: fields[0].trim().to_string(),
                cpus: parse_cpu_list(fields[1]),
                cur_khz: parse_freq(fields[2]),
                min_khz: parse_freq(fields[3]),
                max_khz: parse_freq(fields[4]),
                governor: fields[5].trim().to_string(),
            })
        })
        .collect()
}

/// Parses `id|cur` records. Records with fewer than two fields are skipped.
pub fn parse_core_table(text: &str) -> Vec<CpuCoreRow> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut fields = line.split('|');
            let core_id = fields.next()?.trim();
            let cur = fields.next()?;
            Some(CpuCoreRow {
                core_id: normalize_cpu_id(core_id),
                cur_khz: parse_freq(cur),
            })
        })
        .collect()
}

/// Splits the boot command line into `key=value` parameters. Bare tokens and
/// tokens starting with `=` are ignored; later duplicates win.
pub fn parse_cmdline(text: &str) -> BootParams {
    text.split_whitespace()
        .filter_map(|token| {
            let idx = token.find('=')?;
            if idx == 0 {
                return None;
            }
            Some((token[..idx].to_string(), token[idx + 1..].to_string()))
        })
        .collect()
}

/// Parses newline separated `key=value` pairs. Everything after the first
/// `=` belongs to the value, so values may contain `=` themselves.
pub fn parse_key_value(text: &str) -> KeyValues {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Picks the active algorithm out of `comp_algorithm`, which marks it with
/// brackets (`lzo [lz4] zstd`). Falls back to the first listed entry.
pub fn parse_zram_algorithm(raw: &str) -> Option<String> {
    if let Some(start) = raw.find('[') {
        let rest = &raw[start + 1..];
        if let Some(end) = rest.find(']')
            && end > 0
        {
            return Some(rest[..end].to_string());
        }
    }
    raw.split_whitespace().next().map(str::to_string)
}

/// Expands a whitespace separated CPU list (`0 1 2 3`) into `cpuN` ids.
pub fn parse_cpu_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(normalize_cpu_id).collect()
}

/// `3` and `cpu3` both become `cpu3`.
pub fn normalize_cpu_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("cpu") {
        raw.to_string()
    } else {
        format!("cpu{raw}")
    }
}

/// Integer-or-empty frequency field.
pub fn parse_freq(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meminfo_extracts_counters() {
        let text = "MemTotal:        7823456 kB\nMemFree:          123456 kB\nHugePages_Total:       0\n";
        let map = parse_meminfo(text);
        assert_eq!(map.get("MemTotal"), Some(&7_823_456));
        assert_eq!(map.get("MemFree"), Some(&123_456));
        assert_eq!(map.get("HugePages_Total"), Some(&0));
    }

    #[test]
    fn meminfo_drops_malformed_lines() {
        let text = "garbage\nNoSpace:123\nEmpty:   \n: 42\nSwapFree:   7 kB";
        let map = parse_meminfo(text);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("SwapFree"), Some(&7));
    }

    #[test]
    fn meminfo_empty_input() {
        assert!(parse_meminfo("").is_empty());
    }

    #[test]
    fn policy_table_parses_full_records() {
        let text = "policy0|0 1 2 3|1200000|300000|1800000|schedutil\npolicy4|4 5|2000000|600000|2400000|schedutil\n";
        let rows = parse_policy_table(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].policy_id, "policy0");
        assert_eq!(rows[0].cpus, vec!["cpu0", "cpu1", "cpu2", "cpu3"]);
        assert_eq!(rows[0].cur_khz, Some(1_200_000));
        assert_eq!(rows[1].max_khz, Some(2_400_000));
        assert_eq!(rows[1].governor, "schedutil");
    }

    #[test]
    fn policy_table_skips_short_records() {
        let text = "policy0|0 1|1200000|300000|1800000\npolicy4|4 5|2000000|600000|2400000|performance";
        let rows = parse_policy_table(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].policy_id, "policy4");
    }

    #[test]
    fn policy_table_keeps_empty_frequencies() {
        let rows = parse_policy_table("policy0|0||||");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cur_khz, None);
        assert_eq!(rows[0].governor, "");
    }

    #[test]
    fn core_table_needs_two_fields() {
        let rows = parse_core_table("cpu0|1200000\ncpu1\ncpu2|\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].core_id, "cpu0");
        assert_eq!(rows[0].cur_khz, Some(1_200_000));
        assert_eq!(rows[1].core_id, "cpu2");
        assert_eq!(rows[1].cur_khz, None);
    }

    #[test]
    fn cmdline_splits_on_first_equals() {
        let params = parse_cmdline("console=ttyS0 quiet superfloppy=2 opt=a=b =bad");
        assert_eq!(params.get("console").map(String::as_str), Some("ttyS0"));
        assert_eq!(params.get("superfloppy").map(String::as_str), Some("2"));
        assert_eq!(params.get("opt").map(String::as_str), Some("a=b"));
        assert!(!params.contains_key("quiet"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn key_value_preserves_equals_in_values() {
        let kv = parse_key_value("disksize=4294967296\navailable=lz4,zstd\nextra=a=b=c\nnoise\n=orphan");
        assert_eq!(kv.get("disksize").map(String::as_str), Some("4294967296"));
        assert_eq!(kv.get("extra").map(String::as_str), Some("a=b=c"));
        assert_eq!(kv.len(), 3);
    }

    #[test]
    fn key_value_allows_empty_values() {
        let kv = parse_key_value("custom_freq=");
        assert_eq!(kv.get("custom_freq").map(String::as_str), Some(""));
    }

    #[test]
    fn zram_algorithm_prefers_bracketed_entry() {
        assert_eq!(parse_zram_algorithm("lzo lzo-rle [lz4] zstd").as_deref(), Some("lz4"));
        assert_eq!(parse_zram_algorithm("zstd").as_deref(), Some("zstd"));
        assert_eq!(parse_zram_algorithm("[] lzo").as_deref(), Some("[]"));
        assert_eq!(parse_zram_algorithm("   "), None);
    }

    #[test]
    fn sections_are_trimmed() {
        let sections = split_sections("a\n__SEP__\n b \n__SEP__\n");
        assert_eq!(sections, vec!["a", "b", ""]);
        assert_eq!(section(&sections, 1), "b");
        assert_eq!(section(&sections, 9), "");
    }

    #[test]
    fn cpu_ids_are_normalized() {
        assert_eq!(normalize_cpu_id("4"), "cpu4");
        assert_eq!(normalize_cpu_id("cpu7"), "cpu7");
    }
}

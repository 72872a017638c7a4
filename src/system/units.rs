//! GPU clock registers come in Hz, kHz or MHz depending on the platform and
//! carry no unit. Values are classified by magnitude unless the caller knows
//! the unit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreqUnit {
    Hz,
    KHz,
    MHz,
}

impl FreqUnit {
    pub fn from_str_config(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hz" => Some(FreqUnit::Hz),
            "khz" => Some(FreqUnit::KHz),
            "mhz" => Some(FreqUnit::MHz),
            _ => None,
        }
    }
}

/// Magnitude boundaries for unit detection. Above `hz_above` a value is Hz,
/// below `mhz_below` it is MHz, anything in between is already kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitThresholds {
    pub hz_above: u64,
    pub mhz_below: u64,
}

impl Default for UnitThresholds {
    fn default() -> Self {
        Self {
            hz_above: 100_000_000,
            mhz_below: 20_000,
        }
    }
}

impl UnitThresholds {
    pub fn classify(&self, value: f64) -> FreqUnit {
        if value > self.hz_above as f64 {
            FreqUnit::Hz
        } else if value < self.mhz_below as f64 {
            FreqUnit::MHz
        } else {
            FreqUnit::KHz
        }
    }

    /// Converts a raw reading to kHz. Zero, negative and non-numeric input
    /// yield `None` so "no reading" stays distinct from a literal zero.
    pub fn normalize_khz(&self, raw: &str, unit: Option<FreqUnit>) -> Option<u64> {
        let value: f64 = raw.trim().parse().ok()?;
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        let khz = match unit.unwrap_or_else(|| self.classify(value)) {
            FreqUnit::Hz => value / 1000.0,
            FreqUnit::KHz => value,
            FreqUnit::MHz => value * 1000.0,
        };
        Some(khz.round() as u64)
    }
}

/// [`UnitThresholds::normalize_khz`] with the default thresholds.
pub fn normalize_khz(raw: &str, unit: Option<FreqUnit>) -> Option<u64> {
    UnitThresholds::default().normalize_khz(raw, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hz_values_are_divided() {
        assert_eq!(normalize_khz("950000000", None), Some(950_000));
        assert_eq!(normalize_khz("585000500", None), Some(585_001));
    }

    #[test]
    fn mhz_values_are_multiplied() {
        assert_eq!(normalize_khz("950", None), Some(950_000));
    }

    #[test]
    fn khz_values_pass_through() {
        assert_eq!(normalize_khz("1200000", None), Some(1_200_000));
        assert_eq!(normalize_khz("20000", None), Some(20_000));
        assert_eq!(normalize_khz("100000000", None), Some(100_000_000));
    }

    #[test]
    fn zero_and_garbage_are_absent() {
        assert_eq!(normalize_khz("0", None), None);
        assert_eq!(normalize_khz("", None), None);
        assert_eq!(normalize_khz("N/A", None), None);
        assert_eq!(normalize_khz("-5", None), None);
    }

    #[test]
    fn explicit_unit_wins_over_magnitude() {
        assert_eq!(normalize_khz("950", Some(FreqUnit::KHz)), Some(950));
        assert_eq!(normalize_khz("1500", Some(FreqUnit::Hz)), Some(2));
        assert_eq!(normalize_khz("1200000", Some(FreqUnit::MHz)), Some(1_200_000_000));
    }

    #[test]
    fn custom_thresholds_shift_classification() {
        let thresholds = UnitThresholds {
            hz_above: 10_000_000,
            mhz_below: 5_000,
        };
        assert_eq!(thresholds.normalize_khz("15000000", None), Some(15_000));
        assert_eq!(thresholds.normalize_khz("8000", None), Some(8_000));
    }

    #[test]
    fn unit_names_parse_case_insensitively() {
        assert_eq!(FreqUnit::from_str_config("MHz"), Some(FreqUnit::MHz));
        assert_eq!(FreqUnit::from_str_config("hz"), Some(FreqUnit::Hz));
        assert_eq!(FreqUnit::from_str_config("ghz"), None);
    }
}

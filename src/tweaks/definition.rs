//! Declarative description of a tunable: its backend script, its fields and
//! how each field is chosen, shown and compared.

use crate::system::parse::KeyValues;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choices {
    /// A fixed list of raw values.
    Fixed(&'static [&'static str]),
    /// Comma separated list read from a key of the current state.
    FromCurrent(&'static str),
    /// Any value typed by the user.
    Free,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDisplay {
    Plain,
    /// Raw value is bytes, shown and entered in MiB.
    Mebibytes { min: u64, max: u64 },
    Toggle,
    /// Raw value -> human name.
    Named(&'static [(&'static str, &'static str)]),
}

/// The field only takes part in dirty checks while `key` equals `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub key: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub default: &'static str,
    pub choices: Choices,
    pub display: FieldDisplay,
    pub compare_when: Option<Condition>,
}

impl FieldSpec {
    pub fn is_compared(&self, pending: &KeyValues) -> bool {
        match self.compare_when {
            Some(cond) => value_of(pending, cond.key) == cond.value,
            None => true,
        }
    }

    /// Also the visibility rule: a conditional field is only shown while its
    /// condition holds.
    pub fn is_visible(&self, pending: &KeyValues) -> bool {
        self.is_compared(pending)
    }

    pub fn options(&self, current: &KeyValues) -> Vec<String> {
        match self.choices {
            Choices::Fixed(values) => values.iter().map(|v| v.to_string()).collect(),
            Choices::FromCurrent(key) => value_of(current, key)
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            Choices::Free => Vec::new(),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self.choices, Choices::Free)
    }

    pub fn display_value(&self, raw: &str) -> String {
        if raw.is_empty() {
            return "--".to_string();
        }
        match self.display {
            FieldDisplay::Plain => raw.to_string(),
            FieldDisplay::Mebibytes { .. } => match raw.parse::<u64>() {
                Ok(bytes) => format!("{} MiB", (bytes as f64 / MIB as f64).round() as u64),
                Err(_) => raw.to_string(),
            },
            FieldDisplay::Toggle => match raw {
                "1" => "On".to_string(),
                "0" => "Off".to_string(),
                other => other.to_string(),
            },
            FieldDisplay::Named(names) => names
                .iter()
                .find(|(value, _)| *value == raw)
                .map(|(_, name)| format!("{name} - {raw}"))
                .unwrap_or_else(|| raw.to_string()),
        }
    }

    /// Validates typed input and converts it to the raw stored form.
    pub fn parse_input(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        match self.display {
            FieldDisplay::Mebibytes { min, max } => {
                let mib: u64 = input.parse().ok()?;
                (min..=max).contains(&mib).then(|| (mib * MIB).to_string())
            }
            _ => Some(input.to_string()),
        }
    }
}

/// Missing keys read as the empty string.
pub fn value_of<'a>(values: &'a KeyValues, key: &str) -> &'a str {
    values.get(key).map(String::as_str).unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TweakDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// Ask the backend `is_available` before loading.
    pub probe_availability: bool,
    /// Substring the backend prints on a successful save.
    pub save_ack: Option<&'static str>,
    /// Substring the backend prints on a successful apply.
    pub apply_ack: Option<&'static str>,
}

impl TweakDefinition {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: FieldSpec = FieldSpec {
        key: "disksize",
        label: "Size",
        default: "0",
        choices: Choices::Fixed(&["1073741824"]),
        display: FieldDisplay::Mebibytes { min: 1, max: 65536 },
        compare_when: None,
    };

    const FREQ: FieldSpec = FieldSpec {
        key: "custom_freq",
        label: "Freq",
        default: "",
        choices: Choices::Free,
        display: FieldDisplay::Plain,
        compare_when: Some(Condition {
            key: "mode",
            value: "2",
        }),
    };

    fn kv(pairs: &[(&str, &str)]) -> KeyValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mebibyte_display_and_input() {
        assert_eq!(SIZE.display_value("4294967296"), "4096 MiB");
        assert_eq!(SIZE.display_value(""), "--");
        assert_eq!(SIZE.parse_input("2048").as_deref(), Some("2147483648"));
        assert_eq!(SIZE.parse_input("0"), None);
        assert_eq!(SIZE.parse_input("65537"), None);
        assert_eq!(SIZE.parse_input("big"), None);
    }

    #[test]
    fn conditional_comparison() {
        assert!(FREQ.is_compared(&kv(&[("mode", "2")])));
        assert!(!FREQ.is_compared(&kv(&[("mode", "1")])));
        assert!(!FREQ.is_visible(&KeyValues::new()));
        assert!(SIZE.is_compared(&KeyValues::new()));
    }

    #[test]
    fn options_from_current_state() {
        let spec = FieldSpec {
            choices: Choices::FromCurrent("available"),
            ..SIZE
        };
        let current = kv(&[("available", "lzo, lz4,,zstd")]);
        assert_eq!(spec.options(&current), vec!["lzo", "lz4", "zstd"]);
        assert!(spec.options(&KeyValues::new()).is_empty());
        assert!(FREQ.options(&current).is_empty());
    }

    #[test]
    fn named_display() {
        let spec = FieldSpec {
            display: FieldDisplay::Named(&[("1", "Stock")]),
            ..FREQ
        };
        assert_eq!(spec.display_value("1"), "Stock - 1");
        assert_eq!(spec.display_value("9"), "9");
    }
}

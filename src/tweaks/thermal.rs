use crate::tweaks::definition::{Choices, Condition, FieldDisplay, FieldSpec, TweakDefinition};

pub const MODE_NAMES: [(&str, &str); 4] = [
    ("0", "Disabled"),
    ("1", "Stock"),
    ("2", "Custom"),
    ("3", "Performance"),
];

pub const FIELDS: [FieldSpec; 2] = [
    FieldSpec {
        key: "mode",
        label: "Mode",
        default: "1",
        choices: Choices::Fixed(&["0", "1", "2", "3"]),
        display: FieldDisplay::Named(&MODE_NAMES),
        compare_when: None,
    },
    FieldSpec {
        key: "custom_freq",
        label: "Custom frequency",
        default: "",
        choices: Choices::Free,
        display: FieldDisplay::Plain,
        compare_when: Some(Condition {
            key: "mode",
            value: "2",
        }),
    },
];

/// Thermal control is only offered when the backend reports `available=1`.
pub static DEFINITION: TweakDefinition = TweakDefinition {
    id: "thermal",
    title: "Thermal",
    fields: &FIELDS,
    probe_availability: true,
    save_ack: None,
    apply_ack: None,
};

use crate::tweaks::definition::{Choices, FieldDisplay, FieldSpec, TweakDefinition};

/// Disk size presets in bytes (1.5, 2, 3, 4, 6 and 8 GiB).
pub const DISKSIZE_PRESETS: [&str; 6] = [
    "1610612736",
    "2147483648",
    "3221225472",
    "4294967296",
    "6442450944",
    "8589934592",
];

pub const FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        key: "disksize",
        label: "Disk size",
        default: "0",
        choices: Choices::Fixed(&DISKSIZE_PRESETS),
        display: FieldDisplay::Mebibytes { min: 1, max: 65536 },
        compare_when: None,
    },
    FieldSpec {
        key: "algorithm",
        label: "Algorithm",
        default: "lz4",
        choices: Choices::FromCurrent("available"),
        display: FieldDisplay::Plain,
        compare_when: None,
    },
    FieldSpec {
        key: "enabled",
        label: "Enabled",
        default: "1",
        choices: Choices::Fixed(&["1", "0"]),
        display: FieldDisplay::Toggle,
        compare_when: None,
    },
];

pub static DEFINITION: TweakDefinition = TweakDefinition {
    id: "zram",
    title: "ZRAM",
    fields: &FIELDS,
    probe_availability: false,
    save_ack: Some("saved"),
    apply_ack: Some("applied"),
};

//! Device and kernel identification, read once at startup.

use serde::Serialize;
use tracing::{debug, warn};

use crate::channel::CommandChannel;

pub const FLOPPY1280_DEVICES: [&str; 7] = ["a25x", "a33x", "a53x", "m33x", "m34x", "gta4xls", "a26xs"];
/// Codenames of the SM6125 ("trinket") phones FloppyTrinketMi is built for:
/// Redmi Note 8 (`ginkgo`) and Redmi Note 8T (`willow`). A Floppy kernel on
/// one of these is classed as FloppyTrinketMi; on any kernel the codename
/// alone keeps the Exynos GPU paths from being tried.
pub const TRINKET_DEVICES: [&str; 2] = ["ginkgo", "willow"];

const DEVICE_NAME_COMMAND: &str = "cat /sys/kernel/sec_detect/device_name";
const DEVICE_MODEL_COMMAND: &str = "cat /sys/kernel/sec_detect/device_model";
const UNAME_COMMAND: &str = "uname -r";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KernelFamily {
    Floppy1280,
    FloppyTrinketMi,
    FloppyKernel,
    Other,
}

impl KernelFamily {
    pub fn classify(uname: &str, codename: Option<&str>) -> Self {
        if !uname.contains("Floppy") {
            return KernelFamily::Other;
        }
        match codename {
            Some(name) if FLOPPY1280_DEVICES.contains(&name) => KernelFamily::Floppy1280,
            Some(name) if TRINKET_DEVICES.contains(&name) => KernelFamily::FloppyTrinketMi,
            _ => KernelFamily::FloppyKernel,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KernelFamily::Floppy1280 => "Floppy1280",
            KernelFamily::FloppyTrinketMi => "FloppyTrinketMi",
            KernelFamily::FloppyKernel => "FloppyKernel",
            KernelFamily::Other => "Stock/Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KernelVariant {
    Vanilla,
    KernelSuNext,
    Rksu,
    SukiSuUltra,
}

impl KernelVariant {
    const CODES: [(&'static str, KernelVariant); 4] = [
        ("V", KernelVariant::Vanilla),
        ("KN", KernelVariant::KernelSuNext),
        ("RKS", KernelVariant::Rksu),
        ("SKS", KernelVariant::SukiSuUltra),
    ];

    pub fn label(self) -> &'static str {
        match self {
            KernelVariant::Vanilla => "Vanilla",
            KernelVariant::KernelSuNext => "KernelSU Next",
            KernelVariant::Rksu => "RKSU",
            KernelVariant::SukiSuUltra => "SukiSU Ultra",
        }
    }

    /// Finds `-CODE-` or a trailing `-CODE` in the release string.
    fn detect(uname: &str) -> Option<Self> {
        Self::CODES.iter().find_map(|(code, variant)| {
            let marker = format!("-{code}");
            uname
                .match_indices(&marker)
                .any(|(idx, _)| {
                    let after = &uname[idx + marker.len()..];
                    after.is_empty() || after.starts_with('-')
                })
                .then_some(*variant)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BuildType {
    Release,
    Testing { hash: Option<String>, dirty: bool },
}

impl BuildType {
    pub fn label(&self) -> String {
        match self {
            BuildType::Release => "Release Build".to_string(),
            BuildType::Testing { hash, dirty } => {
                let mut label = match hash {
                    Some(hash) => format!("Testing ({hash})"),
                    None => "Testing (Git)".to_string(),
                };
                if *dirty {
                    label.push_str(" (Dirty)");
                }
                label
            }
        }
    }
}

/// A parsed `uname -r`, e.g. `5.10.247-Floppy-v6.2-RKS-g4184e67c28bf-dirty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelRelease {
    pub raw: String,
    pub linux_version: String,
    pub floppy_version: Option<String>,
    pub variant: Option<KernelVariant>,
    pub build: BuildType,
}

impl KernelRelease {
    pub fn parse(uname: &str) -> Self {
        let uname = uname.trim();
        let linux_version = uname.split('-').next().unwrap_or_default().to_string();
        let build = if uname.contains("-release") {
            BuildType::Release
        } else {
            BuildType::Testing {
                hash: find_git_hash(uname),
                dirty: uname.contains("dirty"),
            }
        };
        Self {
            raw: uname.to_string(),
            linux_version,
            floppy_version: find_floppy_version(uname),
            variant: KernelVariant::detect(uname),
            build,
        }
    }
}

/// First `-v<major>.<minor>` occurrence.
fn find_floppy_version(uname: &str) -> Option<String> {
    uname.match_indices("-v").find_map(|(idx, _)| {
        let rest = &uname[idx + 2..];
        let major_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if major_end == 0 || !rest[major_end..].starts_with('.') {
            return None;
        }
        let minor = &rest[major_end + 1..];
        let minor_end = minor.find(|c: char| !c.is_ascii_digit()).unwrap_or(minor.len());
        (minor_end > 0).then(|| format!("v{}", &rest[..major_end + 1 + minor_end]))
    })
}

/// First `-g<hex>` occurrence, lowercase hex only.
fn find_git_hash(uname: &str) -> Option<String> {
    uname.match_indices("-g").find_map(|(idx, _)| {
        let rest = &uname[idx + 2..];
        let end = rest
            .find(|c: char| !matches!(c, '0'..='9' | 'a'..='f'))
            .unwrap_or(rest.len());
        (end > 0).then(|| rest[..end].to_string())
    })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub codename: Option<String>,
    pub model: Option<String>,
    pub release: Option<KernelRelease>,
    pub family: KernelFamily,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            codename: None,
            model: None,
            release: None,
            family: KernelFamily::Other,
        }
    }
}

impl DeviceInfo {
    pub fn from_parts(codename: Option<&str>, model: Option<&str>, uname: Option<&str>) -> Self {
        let codename = non_empty(codename);
        let release = non_empty(uname).map(KernelRelease::parse);
        let family = release
            .as_ref()
            .map(|r| KernelFamily::classify(&r.raw, codename))
            .unwrap_or(KernelFamily::Other);
        Self {
            codename: codename.map(str::to_string),
            model: non_empty(model).map(str::to_string),
            release,
            family,
        }
    }

    /// Reads identification files from the device. Missing pieces stay `None`.
    pub async fn detect(channel: &dyn CommandChannel) -> Self {
        let (name, model, uname) = tokio::join!(
            channel.execute(DEVICE_NAME_COMMAND),
            channel.execute(DEVICE_MODEL_COMMAND),
            channel.execute(UNAME_COMMAND),
        );
        if let Err(err) = &uname {
            warn!(error = %err, "kernel release unavailable");
        }
        let info = Self::from_parts(
            name.ok().as_deref(),
            model.ok().as_deref(),
            uname.ok().as_deref(),
        );
        debug!(family = info.family.label(), codename = ?info.codename, "device identified");
        info
    }

    pub fn is_trinket(&self) -> bool {
        self.family == KernelFamily::FloppyTrinketMi
            || self
                .codename
                .as_deref()
                .is_some_and(|name| TRINKET_DEVICES.contains(&name))
    }

    pub fn display_name(&self) -> String {
        match (&self.model, &self.codename) {
            (Some(model), Some(name)) => format!("{model} ({name})"),
            (None, Some(name)) => name.clone(),
            (Some(model), None) => model.clone(),
            (None, None) => "Unknown".to_string(),
        }
    }
}

use crate::artifacts::IconFormat;
use crate::catalog;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ASSOCIATIONS_DIR: &str = "file_associations";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Self::Linux, Self::MacOs, Self::Windows]
    }

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "macos",
            Self::Windows => "windows",
        }
    }

    /// Icon container the platform's file manager expects.
    pub fn icon_format(self) -> IconFormat {
        match self {
            Self::Linux => IconFormat::Png,
            Self::MacOs => IconFormat::Icns,
            Self::Windows => IconFormat::Ico,
        }
    }
}

pub fn descriptor_path(output_dir: &Path, code: &str, platform: Platform) -> PathBuf {
    output_dir
        .join(ASSOCIATIONS_DIR)
        .join(platform.dir_name())
        .join(format!("{}_ext.properties", code))
}

fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Renders the properties file binding `code` to its MIME type, icon and
/// description.
pub fn descriptor(code: &str, platform: Platform, vendor: &str, output_dir: &Path) -> String {
    let format = platform.icon_format();
    let icon = format.artifact_path(output_dir, &format!("{}_doc", code));
    format!(
        "extension={code}\nmime-type=application/{vendor}.{code}\nicon={icon}\ndescription={description}\n",
        code = code,
        vendor = vendor,
        icon = slash_path(&icon),
        description = catalog::description(code),
    )
}

pub fn write_descriptor(output_dir: &Path, code: &str, platform: Platform, vendor: &str) -> Result<()> {
    let path = descriptor_path(output_dir, code, platform);
    fs::write(&path, descriptor(code, platform, vendor, output_dir))
        .with_context(|| format!("unable to write {}", path.display()))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ICONBAKE_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "iconbake.json";

fn default_source_dir() -> PathBuf { PathBuf::from("artifacts/artwork_prep") }
fn default_output_dir() -> PathBuf { PathBuf::from("artifacts") }
fn default_resources_dir() -> Option<PathBuf> {
    Some(PathBuf::from("com.trollworks.gcs/resources/images"))
}
fn default_vendor() -> String { "gcs".to_string() }

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Holds `app.png`, `doc.png` and the `types/` glyph directory.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Root of the wiped-and-regenerated `icns/`, `ico/`, `png/` and
    /// `file_associations/` directories.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// In-application image resources. `None` skips them entirely.
    #[serde(default = "default_resources_dir")]
    pub resources_dir: Option<PathBuf>,
    #[serde(default = "default_vendor")]
    pub vendor: String,
    /// Worker threads; 0 lets rayon pick.
    #[serde(default)]
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            resources_dir: default_resources_dir(),
            vendor: default_vendor(),
            workers: 0,
        }
    }
}

impl Config {
    pub fn app_image(&self) -> PathBuf {
        self.source_dir.join("app.png")
    }

    pub fn doc_frame_image(&self) -> PathBuf {
        self.source_dir.join("doc.png")
    }

    pub fn types_dir(&self) -> PathBuf {
        self.source_dir.join("types")
    }
}

// --- Config path ---

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "trollworks", "iconbake")?;
    let path = proj.config_dir().join("config.json");
    if path.exists() { Some(path) } else { None }
}

fn config_path() -> Result<Option<PathBuf>> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(explicit);
        anyhow::ensure!(
            path.exists(),
            "{} points at {}, which does not exist",
            CONFIG_ENV,
            path.display()
        );
        return Ok(Some(path));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(user_config_path())
}

// --- Public API ---

pub fn read_config(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("unable to read config {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid config {}", path.display()))
}

pub fn load_config() -> Result<Config> {
    match config_path()? {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            read_config(&path)
        }
        None => Ok(Config::default()),
    }
}

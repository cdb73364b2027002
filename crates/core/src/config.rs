use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:5000";

static PREFERENCES_FILE: &str = "preferences.json";
static LOG_FILE: &str = "planboard.log";
static ENV_DATA_DIR: &str = "PLANBOARD_DATA_DIR";
static ENV_STORE_URL: &str = "PLANBOARD_STORE_URL";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "planboard", "planboard"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    store_url: String,
    data_dir: PathBuf,
}

impl AppConfig {
    /// Resolve the store URL and data directory from overrides, environment variables, and
    /// platform defaults, creating the data directory if needed.
    pub fn discover(store_url_override: Option<String>, data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        Ok(Self::from_parts(resolve_store_url(store_url_override), data_dir))
    }

    pub fn from_parts(store_url: impl Into<String>, data_dir: PathBuf) -> Self {
        Self {
            store_url: store_url.into(),
            data_dir,
        }
    }

    pub fn store_url(&self) -> &str {
        &self.store_url
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir.join(PREFERENCES_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

fn resolve_store_url(store_url_override: Option<String>) -> String {
    store_url_override
        .or_else(|| env::var(ENV_STORE_URL).ok())
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STORE_URL.to_string())
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = data_dir_override {
        return Ok(dir);
    }

    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        return Ok(PathBuf::from(env_dir));
    }

    if cfg!(debug_assertions) {
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        return Ok(manifest_dir.join("..").join("tmp").join("dev-planboard"));
    }

    if let Some(project) = &*PROJECT_DIRS {
        return Ok(project.data_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".planboard"));
    }

    Ok(env::current_dir()?.join(".planboard"))
}

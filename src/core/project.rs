#![forbid(unsafe_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::error::{Result, TdError};

pub const MARKER_DIR: &str = ".td";
pub const TASKS_DIR: &str = "tasks";
pub const CONFIG_FILE: &str = "config.toml";

#[must_use]
pub fn marker_dir(root: &Path) -> PathBuf {
    root.join(MARKER_DIR)
}

#[must_use]
pub fn tasks_dir(root: &Path) -> PathBuf {
    marker_dir(root).join(TASKS_DIR)
}

#[must_use]
pub fn config_path(root: &Path) -> PathBuf {
    marker_dir(root).join(CONFIG_FILE)
}

/// Walk up from `start` (inclusive) to the first directory holding `.td/`.
pub fn find_root(start: &Path) -> Result<PathBuf> {
    let mut current = resolve(start)?;
    loop {
        if marker_dir(&current).is_dir() {
            debug!(root = %current.display(), "found project root");
            return Ok(current);
        }
        if !current.pop() {
            return Err(TdError::ProjectNotFound {
                start: start.to_path_buf(),
            });
        }
    }
}

/// Create `.td/tasks/` and a default config under `path`. Safe to call again:
/// an existing config is left untouched.
pub fn init_project(path: &Path) -> Result<PathBuf> {
    let tasks = tasks_dir(path);
    std::fs::create_dir_all(&tasks).map_err(|e| TdError::io(&tasks, e))?;
    let root = resolve(path)?;

    let config_path = config_path(&root);
    let created = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path);
    match created {
        Ok(mut file) => {
            let cfg = ProjectConfig::for_root(&root);
            let raw = toml::to_string_pretty(&cfg)
                .map_err(|e| TdError::Config(format!("failed to serialize config: {e}")))?;
            file.write_all(raw.as_bytes())
                .map_err(|e| TdError::io(&config_path, e))?;
            info!(root = %root.display(), "initialized project");
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %config_path.display(), "config already present");
        }
        Err(e) => return Err(TdError::io(&config_path, e)),
    }
    Ok(root)
}

fn resolve(path: &Path) -> Result<PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(p) => Ok(p),
        Err(_) => std::path::absolute(path).map_err(|e| TdError::io(path, e)),
    }
}

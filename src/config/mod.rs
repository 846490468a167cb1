#![forbid(unsafe_code)]

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::project;
use crate::error::{Result, TdError};
use crate::task::model::TaskState;

/// Contents of `.td/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub project: String,
    pub default_state: TaskState,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: "project".to_owned(),
            default_state: TaskState::Active,
        }
    }
}

impl ProjectConfig {
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        let project = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Self::default().project);
        Self {
            project,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(TdError::Config("project must not be empty".to_owned()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    String,
    State,
}

fn key_type(key: &str) -> Option<KeyType> {
    match key {
        "project" => Some(KeyType::String),
        "default_state" => Some(KeyType::State),
        _ => None,
    }
}

/// Load the project config, falling back to defaults when the file is absent.
pub fn load(root: &Path) -> Result<ProjectConfig> {
    let (_doc, cfg) = load_from_file(root)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn list_resolved_toml(root: &Path) -> Result<String> {
    let cfg = load(root)?;
    toml::to_string_pretty(&cfg)
        .map_err(|e| TdError::Config(format!("failed to serialize config: {e}")))
}

pub fn get_value_string(root: &Path, key: &str) -> Result<Option<String>> {
    let cfg = load(root)?;
    Ok(match key_type(key) {
        Some(KeyType::String) => Some(cfg.project),
        Some(KeyType::State) => Some(cfg.default_state.to_string()),
        None => None,
    })
}

/// Update one key in place, keeping the rest of the document's formatting.
pub fn set_value_string(root: &Path, key: &str, value: &str) -> Result<()> {
    let (mut doc, cfg) = load_from_file(root)?;
    cfg.validate()?;

    let item = match key_type(key).ok_or_else(|| TdError::InvalidConfigKey(key.to_owned()))? {
        KeyType::String => toml_edit::value(value),
        KeyType::State => {
            let state: TaskState = value.parse().map_err(|_| TdError::InvalidConfigValue {
                key: key.to_owned(),
                msg: format!(
                    "must be one of: {}",
                    TaskState::ALL.map(TaskState::as_str).join(", ")
                ),
            })?;
            toml_edit::value(state.as_str())
        }
    };
    // Indexing keeps the key and its leading comments; only the value changes.
    doc[key] = item;

    // Validate by re-parsing the updated doc.
    let path = project::config_path(root);
    let new_raw = doc.to_string();
    let new_cfg: ProjectConfig = toml::from_str(&new_raw).map_err(|e| TdError::Parse {
        path: path.clone(),
        msg: e.to_string(),
    })?;
    new_cfg.validate()?;

    std::fs::write(&path, new_raw.as_bytes()).map_err(|e| TdError::io(&path, e))?;
    Ok(())
}

fn load_from_file(root: &Path) -> Result<(toml_edit::DocumentMut, ProjectConfig)> {
    let path = project::config_path(root);
    if !path.exists() {
        return Ok((toml_edit::DocumentMut::new(), ProjectConfig::for_root(root)));
    }
    let raw = std::fs::read_to_string(&path).map_err(|e| TdError::io(&path, e))?;
    let parse_err = |msg: String| TdError::Parse {
        path: path.clone(),
        msg,
    };
    let doc = raw
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| parse_err(e.to_string()))?;
    let cfg: ProjectConfig = toml::from_str(&raw).map_err(|e| parse_err(e.to_string()))?;
    Ok((doc, cfg))
}

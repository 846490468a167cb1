#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TdError {
    #[error("no .td/ directory found from {}. Run 'td init' first.", start.display())]
    ProjectNotFound { start: PathBuf },

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("invalid task ID '{id}': {msg}")]
    InvalidTaskId { id: String, msg: String },

    #[error("title '{title}' produces an empty ID; pass an explicit --id")]
    EmptyId { title: String },

    #[error("invalid state '{0}': must be one of focus, active, later, done")]
    InvalidState(String),

    #[error("cannot move '{id}' under '{parent}': would create a cycle")]
    ParentCycle { id: String, parent: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid config key '{0}'")]
    InvalidConfigKey(String),

    #[error("invalid config value for '{key}': {msg}")]
    InvalidConfigValue { key: String, msg: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error at {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {msg}")]
    Parse { path: PathBuf, msg: String },
}

impl TdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoPath {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TdError>;

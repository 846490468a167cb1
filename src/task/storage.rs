#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::project;
use crate::error::{Result, TdError};
use crate::task::model::Task;

const TASK_EXT: &str = "yaml";

/// One-file-per-task store under `<root>/.td/tasks/`.
#[derive(Debug, Clone)]
pub struct TaskStorage {
    dir: PathBuf,
}

impl TaskStorage {
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        Self::new(project::tasks_dir(root))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the task to `<id>.yaml`, replacing any previous content.
    pub fn save(&self, task: &Task) -> Result<PathBuf> {
        let path = self.task_path(&task.id)?;
        let tmp = path.with_extension(format!("{TASK_EXT}.tmp"));
        let data = serde_yaml::to_string(task).map_err(|e| TdError::Parse {
            path: path.clone(),
            msg: e.to_string(),
        })?;
        std::fs::write(&tmp, data.as_bytes()).map_err(|e| TdError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| TdError::io(&path, e))?;
        debug!(id = %task.id, path = %path.display(), "saved task");
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<Task> {
        let path = self.task_path(id)?;
        if !path.is_file() {
            return Err(TdError::TaskNotFound(id.to_owned()));
        }
        match read_task(&path)? {
            Some(task) => Ok(task),
            None => Err(TdError::Parse {
                path,
                msg: "empty task document".to_owned(),
            }),
        }
    }

    /// Every task in the store, ordered by file name. Empty documents are skipped.
    pub fn load_all(&self) -> Result<Vec<Task>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(|e| TdError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| TdError::io(&self.dir, e))?;
            let path = entry.path();
            // `.yaml` alone is the empty id, so match on the name rather than `extension()`.
            let is_task_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&format!(".{TASK_EXT}")));
            if !is_task_file {
                continue;
            }
            if !path.is_file() {
                continue;
            }
            paths.push(path);
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        let mut tasks = Vec::with_capacity(paths.len());
        for path in paths {
            match read_task(&path)? {
                Some(task) => tasks.push(task),
                None => warn!(path = %path.display(), "skipping empty task document"),
            }
        }
        Ok(tasks)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.task_path(id)?;
        if !path.is_file() {
            return Err(TdError::TaskNotFound(id.to_owned()));
        }
        std::fs::remove_file(&path).map_err(|e| TdError::io(&path, e))?;
        debug!(id, "deleted task");
        Ok(())
    }

    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        self.task_path(id).is_ok_and(|p| p.is_file())
    }

    /// Return `base` if no task uses it, else the first free `base-2`, `base-3`, ...
    ///
    /// This is the only uniqueness check; `save` never re-validates.
    #[must_use]
    pub fn resolve_unique_id(&self, base: &str) -> String {
        if !self.exists(base) {
            return base.to_owned();
        }
        let mut n: u64 = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn task_path(&self, id: &str) -> Result<PathBuf> {
        validate_task_id(id)?;
        Ok(self.dir.join(format!("{id}.{TASK_EXT}")))
    }
}

fn read_task(path: &Path) -> Result<Option<Task>> {
    let raw = std::fs::read_to_string(path).map_err(|e| TdError::io(path, e))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let parse_err = |e: serde_yaml::Error| TdError::Parse {
        path: path.to_path_buf(),
        msg: e.to_string(),
    };
    let value: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(parse_err)?;
    if value.is_null() {
        return Ok(None);
    }
    let task = serde_yaml::from_value(value).map_err(parse_err)?;
    Ok(Some(task))
}

pub fn validate_task_id(id: &str) -> Result<()> {
    let invalid = |msg: &str| TdError::InvalidTaskId {
        id: id.to_owned(),
        msg: msg.to_owned(),
    };
    if id.contains('/') || id.contains('\\') {
        return Err(invalid("must not contain path separators"));
    }
    if id.contains("..") {
        return Err(invalid("must not contain '..'"));
    }
    Ok(())
}

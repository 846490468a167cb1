#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{self, ProjectConfig};
use crate::core::filter::StateFilter;
use crate::core::project;
use crate::core::slug::slugify;
use crate::core::tree::TaskTree;
use crate::error::{Result, TdError};
use crate::task::model::{Task, TaskState};
use crate::task::storage::TaskStorage;

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub id: Option<String>,
    pub parent: Option<String>,
    pub state: Option<TaskState>,
}

/// Partial update. `None` leaves a field alone; `Some("")` clears `parent`/`notes`.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub task: Task,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub focus: usize,
    pub active: usize,
    pub later: usize,
    pub done: usize,
}

impl StateCounts {
    #[must_use]
    pub fn tally(tasks: &[Task]) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            match task.state {
                TaskState::Focus => counts.focus += 1,
                TaskState::Active => counts.active += 1,
                TaskState::Later => counts.later += 1,
                TaskState::Done => counts.done += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn get(&self, state: TaskState) -> usize {
        match state {
            TaskState::Focus => self.focus,
            TaskState::Active => self.active,
            TaskState::Later => self.later,
            TaskState::Done => self.done,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.focus + self.active + self.later + self.done
    }
}

/// Task operations for one project root.
#[derive(Debug, Clone)]
pub struct Tracker {
    root: PathBuf,
    config: ProjectConfig,
    storage: TaskStorage,
}

impl Tracker {
    #[must_use]
    pub fn new(root: PathBuf, config: ProjectConfig) -> Self {
        let storage = TaskStorage::for_root(&root);
        Self {
            root,
            config,
            storage,
        }
    }

    /// Open the project at `root`, reading its config.
    pub fn open(root: PathBuf) -> Result<Self> {
        let config = config::load(&root)?;
        Ok(Self::new(root, config))
    }

    /// Find the project root above `start` and open it.
    pub fn discover(start: &Path) -> Result<Self> {
        Self::open(project::find_root(start)?)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub fn storage(&self) -> &TaskStorage {
        &self.storage
    }

    pub fn create(&self, new: NewTask) -> Result<Task> {
        let base = match new.id {
            Some(id) => id,
            None => slugify(&new.title),
        };
        if base.is_empty() {
            return Err(TdError::EmptyId { title: new.title });
        }
        let id = self.storage.resolve_unique_id(&base);
        let parent = new.parent.filter(|p| !p.is_empty());
        if let Some(parent) = parent.as_deref() {
            self.check_parent(&id, parent)?;
        }
        let state = new.state.unwrap_or(self.config.default_state);

        let task = Task::new(id, new.title, state, parent);
        self.storage.save(&task)?;
        info!(id = %task.id, state = %task.state, "created task");
        Ok(task)
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        self.storage.load(id)
    }

    pub fn transition(&self, id: &str, state: TaskState) -> Result<Task> {
        let mut task = self.storage.load(id)?;
        task.set_state(state);
        self.storage.save(&task)?;
        info!(id, %state, "changed state");
        Ok(task)
    }

    pub fn edit(&self, id: &str, edit: TaskEdit) -> Result<Task> {
        let mut task = self.storage.load(id)?;
        if let Some(title) = edit.title {
            task.set_title(title);
        }
        if let Some(notes) = edit.notes {
            task.set_notes(notes);
        }
        if let Some(parent) = edit.parent {
            if !parent.is_empty() {
                self.check_parent(id, &parent)?;
            }
            task.set_parent(parent);
        }
        self.storage.save(&task)?;
        info!(id, "edited task");
        Ok(task)
    }

    /// Re-parent `id` under `parent`.
    pub fn move_under(&self, id: &str, parent: &str) -> Result<Task> {
        self.edit(
            id,
            TaskEdit {
                parent: Some(parent.to_owned()),
                ..TaskEdit::default()
            },
        )
    }

    pub fn list(&self, state: Option<TaskState>, include_done: bool) -> Result<Vec<Task>> {
        let tasks = self.storage.load_all()?;
        Ok(StateFilter::from_args(state, include_done).apply(tasks))
    }

    /// Full tree, or the subtree under `root_id`. Not filtered by state.
    pub fn tree(&self, root_id: Option<&str>) -> Result<Vec<TreeRow>> {
        let tasks = self.storage.load_all()?;
        let tree = TaskTree::new(&tasks);
        let entries = match root_id {
            Some(id) => tree.walk_subtree(id)?,
            None => tree.walk(),
        };
        Ok(entries
            .into_iter()
            .map(|e| TreeRow {
                depth: e.depth,
                task: e.task.clone(),
            })
            .collect())
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        self.storage.delete(id)?;
        info!(id, "removed task");
        Ok(())
    }

    pub fn counts(&self) -> Result<StateCounts> {
        Ok(StateCounts::tally(&self.storage.load_all()?))
    }

    fn check_parent(&self, id: &str, parent: &str) -> Result<()> {
        let cycle = || TdError::ParentCycle {
            id: id.to_owned(),
            parent: parent.to_owned(),
        };
        if id == parent {
            return Err(cycle());
        }
        if !self.storage.exists(parent) {
            warn!(id, parent, "parent task does not exist");
            return Ok(());
        }
        let tasks = self.storage.load_all()?;
        if TaskTree::new(&tasks).is_descendant_of(parent, id) {
            return Err(cycle());
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::TdError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Focus,
    #[default]
    Active,
    Later,
    Done,
}

impl TaskState {
    pub const ALL: [Self; 4] = [Self::Focus, Self::Active, Self::Later, Self::Done];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Active => "active",
            Self::Later => "later",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = TdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "focus" => Ok(Self::Focus),
            "active" => Ok(Self::Active),
            "later" => Ok(Self::Later),
            "done" => Ok(Self::Done),
            other => Err(TdError::InvalidState(other.to_owned())),
        }
    }
}

/// One tracked task, stored as `<id>.yaml` under `.td/tasks/`.
///
/// `parent` is a weak link by id: the referenced task may not exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
}

impl Task {
    #[must_use]
    pub fn new(id: String, title: String, state: TaskState, parent: Option<String>) -> Self {
        let now = now_utc();
        Self {
            id,
            title,
            state,
            parent,
            notes: None,
            created: now,
            updated: now,
        }
    }

    pub fn set_state(&mut self, state: TaskState) {
        self.state = state;
        self.touch();
    }

    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.touch();
    }

    /// An empty string clears the notes.
    pub fn set_notes(&mut self, notes: String) {
        self.notes = (!notes.is_empty()).then_some(notes);
        self.touch();
    }

    /// An empty string clears the parent link.
    pub fn set_parent(&mut self, parent: String) {
        self.parent = (!parent.is_empty()).then_some(parent);
        self.touch();
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == TaskState::Done
    }

    fn touch(&mut self) {
        self.updated = now_utc().max(self.updated);
    }
}

pub(crate) fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn make_task() -> Task {
        Task {
            id: "test-task".to_owned(),
            title: "Test task".to_owned(),
            state: TaskState::Active,
            parent: None,
            notes: None,
            created: datetime!(2026-01-01 12:00:00 UTC),
            updated: datetime!(2026-01-01 12:00:00 UTC),
        }
    }

    #[test]
    fn minimal_task_omits_optional_fields() {
        let yaml = serde_yaml::to_string(&make_task()).unwrap();
        assert!(yaml.contains("id: test-task"));
        assert!(yaml.contains("title: Test task"));
        assert!(yaml.contains("state: active"));
        assert!(yaml.contains("2026-01-01T12:00:00Z"));
        assert!(!yaml.contains("parent"));
        assert!(!yaml.contains("notes"));
    }

    #[test]
    fn optional_fields_survive_a_round_trip() {
        let mut task = make_task();
        task.parent = Some("parent-id".to_owned());
        task.notes = Some("Some notes\nover two lines".to_owned());

        let yaml = serde_yaml::to_string(&task).unwrap();
        assert!(yaml.contains("parent: parent-id"));
        let restored: Task = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, task);

        let bare: Task = serde_yaml::from_str(&serde_yaml::to_string(&make_task()).unwrap())
            .unwrap();
        assert_eq!(bare.parent, None);
        assert_eq!(bare.notes, None);
    }

    #[test]
    fn rejects_unknown_state() {
        let yaml = "id: x\ntitle: X\nstate: blocked\ncreated: 2026-01-01T12:00:00Z\nupdated: 2026-01-01T12:00:00Z\n";
        assert!(serde_yaml::from_str::<Task>(yaml).is_err());
    }

    #[test]
    fn rejects_missing_required_fields() {
        let yaml = "id: x\nstate: active\ncreated: 2026-01-01T12:00:00Z\nupdated: 2026-01-01T12:00:00Z\n";
        assert!(serde_yaml::from_str::<Task>(yaml).is_err());
    }

    #[test]
    fn states_parse_and_display() {
        for state in TaskState::ALL {
            assert_eq!(state.as_str().parse::<TaskState>().unwrap(), state);
            assert_eq!(state.to_string(), state.as_str());
        }
        assert!(matches!(
            "blocked".parse::<TaskState>(),
            Err(TdError::InvalidState(s)) if s == "blocked"
        ));
        assert_eq!(TaskState::default(), TaskState::Active);
    }

    #[test]
    fn mutations_refresh_updated_only() {
        let mut task = make_task();
        let created = task.created;

        task.set_state(TaskState::Focus);
        assert_eq!(task.state, TaskState::Focus);
        assert!(task.updated > created);
        assert_eq!(task.created, created);

        task.updated = created;
        task.set_parent("p".to_owned());
        assert_eq!(task.parent.as_deref(), Some("p"));
        assert!(task.updated > created);

        task.set_parent(String::new());
        assert_eq!(task.parent, None);

        task.set_notes("hello".to_owned());
        assert_eq!(task.notes.as_deref(), Some("hello"));
        task.set_notes(String::new());
        assert_eq!(task.notes, None);
    }

    #[test]
    fn new_task_has_equal_timestamps() {
        let task = Task::new("a".to_owned(), "A".to_owned(), TaskState::Later, None);
        assert_eq!(task.created, task.updated);
        assert_eq!(task.created.nanosecond(), 0);
        assert_eq!(task.notes, None);
    }
}

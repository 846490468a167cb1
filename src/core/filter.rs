#![forbid(unsafe_code)]

use crate::task::model::{Task, TaskState};

/// State predicate for flat listings. Independent of ancestry: apply it to a
/// task set before or after building a [`TaskTree`](crate::core::tree::TaskTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    /// Everything except `done`.
    Open,
    All,
    Only(TaskState),
}

impl StateFilter {
    /// An explicit state wins over `include_done`.
    #[must_use]
    pub fn from_args(state: Option<TaskState>, include_done: bool) -> Self {
        match (state, include_done) {
            (Some(s), _) => Self::Only(s),
            (None, true) => Self::All,
            (None, false) => Self::Open,
        }
    }

    #[must_use]
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::Open => !task.is_done(),
            Self::All => true,
            Self::Only(state) => task.state == state,
        }
    }

    #[must_use]
    pub fn apply(self, tasks: Vec<Task>) -> Vec<Task> {
        tasks.into_iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks() -> Vec<Task> {
        TaskState::ALL
            .iter()
            .map(|&s| Task::new(s.to_string(), s.to_string(), s, None))
            .collect()
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn open_hides_done() {
        let out = StateFilter::from_args(None, false).apply(tasks());
        assert_eq!(ids(&out), ["focus", "active", "later"]);
    }

    #[test]
    fn all_includes_done() {
        let out = StateFilter::from_args(None, true).apply(tasks());
        assert_eq!(ids(&out), ["focus", "active", "later", "done"]);
    }

    #[test]
    fn explicit_state_wins() {
        let out = StateFilter::from_args(Some(TaskState::Focus), false).apply(tasks());
        assert_eq!(ids(&out), ["focus"]);
        let out = StateFilter::from_args(Some(TaskState::Done), false).apply(tasks());
        assert_eq!(ids(&out), ["done"]);
    }

    #[test]
    fn composes_with_tree_building() {
        let mut all = tasks();
        all[1].parent = Some("done".to_owned());
        let open = StateFilter::Open.apply(all.clone());
        let tree = crate::core::tree::TaskTree::new(&open);
        // "done" is filtered out, so its child surfaces as a root.
        assert_eq!(tree.roots().len(), 3);
        let full = crate::core::tree::TaskTree::new(&all);
        assert_eq!(full.children("done").len(), 1);
    }
}

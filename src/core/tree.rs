#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use crate::error::{Result, TdError};
use crate::task::model::Task;

/// A task placed in a depth-first walk, `depth` 0 being a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEntry<'a> {
    pub depth: usize,
    pub task: &'a Task,
}

/// Parent/child index over a loaded task set.
///
/// Children keep the order of the input slice. A task whose parent is not in
/// the set is a root.
#[derive(Debug)]
pub struct TaskTree<'a> {
    tasks: &'a [Task],
    index: HashMap<&'a str, usize>,
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> TaskTree<'a> {
    #[must_use]
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            index.entry(task.id.as_str()).or_insert(i);
        }

        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (i, task) in tasks.iter().enumerate() {
            match task.parent.as_deref() {
                Some(parent) if index.contains_key(parent) => {
                    children.entry(parent).or_default().push(i);
                }
                _ => roots.push(i),
            }
        }

        Self {
            tasks,
            index,
            children,
            roots,
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    #[must_use]
    pub fn roots(&self) -> Vec<&'a Task> {
        self.roots.iter().map(|&i| &self.tasks[i]).collect()
    }

    #[must_use]
    pub fn children(&self, id: &str) -> Vec<&'a Task> {
        self.children
            .get(id)
            .map(|kids| kids.iter().map(|&i| &self.tasks[i]).collect())
            .unwrap_or_default()
    }

    /// Every task, depth first from each root.
    ///
    /// Tasks caught in a parent cycle are unreachable from any root; they are
    /// walked afterwards as extra roots, in input order.
    #[must_use]
    pub fn walk(&self) -> Vec<TreeEntry<'a>> {
        let mut out = Vec::with_capacity(self.tasks.len());
        let mut seen = HashSet::new();
        for &root in &self.roots {
            self.walk_from(root, 0, &mut seen, &mut out);
        }
        for i in 0..self.tasks.len() {
            if !seen.contains(&i) {
                self.walk_from(i, 0, &mut seen, &mut out);
            }
        }
        out
    }

    /// The named task and all its descendants, depth first.
    pub fn walk_subtree(&self, id: &str) -> Result<Vec<TreeEntry<'a>>> {
        let &start = self
            .index
            .get(id)
            .ok_or_else(|| TdError::TaskNotFound(id.to_owned()))?;
        let mut out = Vec::new();
        self.walk_from(start, 0, &mut HashSet::new(), &mut out);
        Ok(out)
    }

    /// Whether `ancestor` appears on `id`'s parent chain (or is `id` itself).
    #[must_use]
    pub fn is_descendant_of(&self, id: &str, ancestor: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            if !seen.insert(cur) {
                return false;
            }
            current = self.get(cur).and_then(|t| t.parent.as_deref());
        }
        false
    }

    fn walk_from(
        &self,
        start: usize,
        depth: usize,
        seen: &mut HashSet<usize>,
        out: &mut Vec<TreeEntry<'a>>,
    ) {
        if !seen.insert(start) {
            return;
        }
        let task = &self.tasks[start];
        out.push(TreeEntry { depth, task });
        if let Some(kids) = self.children.get(task.id.as_str()) {
            for &kid in kids {
                self.walk_from(kid, depth + 1, seen, out);
            }
        }
    }
}

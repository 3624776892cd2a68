//! Ordered collection of root task trees
//!
//! Each non-blank line of a todo file is one root. Tasks are addressed by
//! [`TaskPath`]: positions counted from 1, root first.

use thiserror::Error;

use super::codec::LineCodec;
use super::error::FormatError;
use super::path::TaskPath;
use super::task::Task;
use super::tree::{NodeIndex, TaskNode, TaskTree};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to parse line {line}: '{text}'")]
    Parse {
        line: usize,
        text: String,
        #[source]
        source: FormatError,
    },
}

/// Shared view of one task inside the store
#[derive(Debug, Clone, Copy)]
pub struct TaskRef<'a> {
    tree: &'a TaskTree,
    node: NodeIndex,
}

impl<'a> TaskRef<'a> {
    pub fn task(&self) -> &'a Task {
        self.tree.task(self.node)
    }

    pub fn node(&self) -> &'a TaskNode {
        self.tree.node(self.node)
    }

    pub fn index(&self) -> NodeIndex {
        self.node
    }

    /// The root tree this task belongs to
    pub fn tree(&self) -> &'a TaskTree {
        self.tree
    }

    /// Formats the task, optionally with its subtasks
    pub fn format(&self, marker: &str, include_subtasks: bool) -> String {
        self.tree.format(self.node, marker, include_subtasks)
    }
}

/// Mutable view of one task inside the store
#[derive(Debug)]
pub struct TaskRefMut<'a> {
    tree: &'a mut TaskTree,
    node: NodeIndex,
}

impl TaskRefMut<'_> {
    pub fn task(&self) -> &Task {
        self.tree.task(self.node)
    }

    pub fn task_mut(&mut self) -> &mut Task {
        self.tree.task_mut(self.node)
    }

    pub fn index(&self) -> NodeIndex {
        self.node
    }

    pub fn tree(&self) -> &TaskTree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TaskTree {
        &mut *self.tree
    }
}

/// All root tasks of a todo file, in file order
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    roots: Vec<TaskTree>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every non-blank line as a root task. Fails on the first line
    /// that does not parse.
    pub fn load<I, S>(lines: I, codec: &LineCodec) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for (n, line) in lines.into_iter().enumerate() {
            let text = line.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            let tree = codec.parse_tree(text).map_err(|source| StoreError::Parse {
                line: n + 1,
                text: text.to_string(),
                source,
            })?;
            store.append(tree);
        }
        Ok(store)
    }

    /// One line per root task, joined with newlines
    pub fn to_text(&self, codec: &LineCodec) -> String {
        self.roots
            .iter()
            .map(|tree| codec.format_tree(tree))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Appends a root task with id `1 + max root id` and returns the id
    pub fn append(&mut self, mut tree: TaskTree) -> u32 {
        let id = self.roots.iter().map(TaskTree::id).max().unwrap_or(0) + 1;
        tree.set_id(id);
        self.roots.push(tree);
        id
    }

    /// Attaches a tree below the task at `parent` and returns the new
    /// task's path, or `None` if `parent` does not exist
    pub fn append_subtask(&mut self, parent: &TaskPath, tree: TaskTree) -> Option<TaskPath> {
        let mut target = self.lookup_mut(parent)?;
        let ix = target.index();
        let tree_mut = target.tree_mut();
        tree_mut.graft(ix, tree);
        let position = tree_mut.children(ix).len() as u32;
        Some(parent.child(position))
    }

    pub fn lookup(&self, path: &TaskPath) -> Option<TaskRef<'_>> {
        let (root, rest) = path.segments().split_first()?;
        let tree = self.roots.get(slot(*root)?)?;
        let node = tree.resolve(rest)?;
        Some(TaskRef { tree, node })
    }

    pub fn lookup_mut(&mut self, path: &TaskPath) -> Option<TaskRefMut<'_>> {
        let (root, rest) = path.segments().split_first()?;
        let tree = self.roots.get_mut(slot(*root)?)?;
        let node = tree.resolve(rest)?;
        Some(TaskRefMut { tree, node })
    }

    /// Removes a task with its subtasks. Ids of the tasks that stay are
    /// recomputed from their positions.
    pub fn remove(&mut self, path: &TaskPath) -> Option<TaskTree> {
        if path.is_root() {
            let index = slot(path.root_position())?;
            if index >= self.roots.len() {
                return None;
            }
            let removed = self.roots.remove(index);
            for (position, tree) in self.roots.iter_mut().enumerate().skip(index) {
                tree.set_id(position as u32 + 1);
            }
            return Some(removed);
        }

        let mut target = self.lookup_mut(path)?;
        let ix = target.index();
        target.tree_mut().remove(ix)
    }

    /// Every task with its path, roots in order and subtasks depth-first
    pub fn entries(&self) -> Vec<(TaskPath, TaskRef<'_>)> {
        let mut out = Vec::new();
        for (i, tree) in self.roots.iter().enumerate() {
            collect(tree, tree.root(), TaskPath::root(i as u32 + 1), &mut out);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskTree> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn slot(position: u32) -> Option<usize> {
    usize::try_from(position).ok()?.checked_sub(1)
}

fn collect<'a>(
    tree: &'a TaskTree,
    node: NodeIndex,
    path: TaskPath,
    out: &mut Vec<(TaskPath, TaskRef<'a>)>,
) {
    let children = tree.children(node);
    out.push((path.clone(), TaskRef { tree, node }));
    for (i, &child) in children.iter().enumerate() {
        collect(tree, child, path.child(i as u32 + 1), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::date::DateValue;

    fn codec() -> LineCodec {
        LineCodec::new(&FixedClock(DateValue::from_ymd(2021, 1, 1).unwrap()))
    }

    fn path(s: &str) -> TaskPath {
        s.parse().unwrap()
    }

    fn sample() -> TaskStore {
        TaskStore::load(
            ["call mom", "", "plan trip && book flight && pack bag"],
            &codec(),
        )
        .unwrap()
    }

    #[test]
    fn load_skips_blank_lines() {
        let store = sample();
        assert_eq!(store.len(), 2);
        let ids: Vec<u32> = store.iter().map(TaskTree::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn lookup_by_hierarchical_path() {
        let store = sample();

        let hit = store.lookup(&path("2.2")).unwrap();
        assert_eq!(hit.task().description, "pack bag");
        assert_eq!(hit.node().depth(), 1);

        assert_eq!(store.lookup(&path("1")).unwrap().task().description, "call mom");
        assert!(store.lookup(&path("3")).is_none());
        assert!(store.lookup(&path("2.3")).is_none());
        assert!(store.lookup(&path("1.1")).is_none());
    }

    #[test]
    fn append_assigns_next_root_id() {
        let codec = codec();
        let mut store = TaskStore::new();
        assert_eq!(store.append(codec.parse_tree("first").unwrap()), 1);
        assert_eq!(store.append(codec.parse_tree("second").unwrap()), 2);

        store.remove(&path("1")).unwrap();
        assert_eq!(store.append(codec.parse_tree("third").unwrap()), 3);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn append_subtask_returns_new_path() {
        let mut store = sample();
        let added = store
            .append_subtask(&path("2"), TaskTree::new(Task::new("buy adapter")))
            .unwrap();
        assert_eq!(added, path("2.3"));
        assert_eq!(store.lookup(&added).unwrap().task().description, "buy adapter");

        let nested = store
            .append_subtask(&path("2.1"), TaskTree::new(Task::new("check bags")))
            .unwrap();
        assert_eq!(nested, path("2.1.1"));

        assert!(store
            .append_subtask(&path("9"), TaskTree::new(Task::new("lost")))
            .is_none());
    }

    #[test]
    fn lookup_mut_edits_in_place() {
        let mut store = sample();
        store.lookup_mut(&path("2.1")).unwrap().task_mut().description = "book train".to_string();
        assert_eq!(
            store.to_text(&codec()),
            "call mom\nplan trip && book train && pack bag"
        );
    }

    #[test]
    fn remove_roots_and_subtasks() {
        let mut store = sample();

        let removed = store.remove(&path("2.1")).unwrap();
        assert_eq!(removed.task(removed.root()).description, "book flight");
        assert_eq!(store.lookup(&path("2.1")).unwrap().task().description, "pack bag");

        let pack = store.lookup(&path("2.1")).unwrap();
        assert_eq!(pack.node().id(), 1);

        assert!(store.remove(&path("5")).is_none());
        assert!(store.remove(&path("1")).is_some());
        assert_eq!(store.to_text(&codec()), "plan trip && pack bag");
        assert_eq!(store.iter().map(TaskTree::id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(store.append(TaskTree::new(Task::new("call mom"))), 2);
    }

    #[test]
    fn completed_empty_subtask_survives_save_and_reload() {
        let mut store = TaskStore::load(["a &&"], &codec()).unwrap();
        let mut sub = store.lookup_mut(&path("1.1")).unwrap();
        let ix = sub.index();
        sub.tree_mut().set_completed(ix, true, DateValue::from_ymd(2021, 2, 1).unwrap());

        let text = store.to_text(&codec());
        assert_eq!(text, "a && x");

        let reloaded = TaskStore::load(text.lines(), &codec()).unwrap();
        let sub = reloaded.lookup(&path("1.1")).unwrap();
        assert!(sub.task().completed);
        assert_eq!(sub.task().description, "");
    }

    #[test]
    fn entries_walk_depth_first_with_paths() {
        let store = TaskStore::load(["a && b &&&& c", "d"], &codec()).unwrap();
        let listed: Vec<(String, String)> = store
            .entries()
            .into_iter()
            .map(|(p, r)| (p.to_string(), r.task().description.clone()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("1".to_string(), "a".to_string()),
                ("1.1".to_string(), "b".to_string()),
                ("1.1.1".to_string(), "c".to_string()),
                ("2".to_string(), "d".to_string()),
            ]
        );
    }

    #[test]
    fn load_reports_line_numbers() {
        let err = TaskStore::load(["fine", "", "(a) broken"], &codec()).unwrap_err();
        match err {
            StoreError::Parse { line, text, source } => {
                assert_eq!(line, 3);
                assert_eq!(text, "(a) broken");
                assert_eq!(source, FormatError::Priority("(a)".to_string()));
            }
        }
    }

    #[test]
    fn to_text_round_trips() {
        let lines = [
            "x 2021-01-02 2021-01-01 pay bills +home",
            "(B) plan trip && book flight &&&& pick seat && pack bag",
        ];
        let store = TaskStore::load(lines, &codec()).unwrap();
        assert_eq!(store.to_text(&codec()), lines.join("\n"));
    }
}

//! Task trees
//!
//! A root task and its subtasks share one line:
//!
//! ```text
//! plan trip && book flight &&&& pack bag && renew passport
//! ```
//!
//! Children of a node at depth `d` are introduced by a word starting with
//! exactly `d + 1` repetitions of the marker. The nodes live in a flat arena
//! and refer to each other by index.

use super::codec::{format_line, parse_body, parse_header, reject_line_breaks, LineCodec, WORD_RE};
use super::date::DateValue;
use super::error::FormatError;
use super::task::Task;

/// Position of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

/// A task with its place in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub task: Task,
    id: u32,
    depth: usize,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl TaskNode {
    /// 1-based id among siblings
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Nesting depth; the root is 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }
}

/// A root task with all of its subtasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTree {
    nodes: Vec<TaskNode>,
}

impl TaskTree {
    /// Creates a tree holding a single task
    pub fn new(task: Task) -> Self {
        Self {
            nodes: vec![TaskNode {
                task,
                id: 1,
                depth: 0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses a line into a root task and its subtasks
    pub fn parse(line: &str, codec: &LineCodec) -> Result<Self, FormatError> {
        reject_line_breaks(line)?;
        let mut tree = Self { nodes: Vec::new() };
        tree.parse_node(line, None, 1, codec)?;
        Ok(tree)
    }

    fn parse_node(
        &mut self,
        text: &str,
        parent: Option<NodeIndex>,
        id: u32,
        codec: &LineCodec,
    ) -> Result<NodeIndex, FormatError> {
        let depth = parent.map_or(0, |p| self.nodes[p.0].depth + 1);
        let (mut task, rest) = parse_header(text.trim())?;

        let segments = split_on_marker(rest, codec.marker(), depth + 1);
        let (body, children) = segments
            .split_first()
            .map_or(("", &[][..]), |(body, children)| (*body, children));
        parse_body(body, &mut task, codec.today())?;

        let ix = NodeIndex(self.nodes.len());
        self.nodes.push(TaskNode {
            task,
            id,
            depth,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(ix);
        }

        for (position, segment) in children.iter().enumerate() {
            self.parse_node(segment, Some(ix), position as u32 + 1, codec)?;
        }
        Ok(ix)
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    /// Id of the root task
    pub fn id(&self) -> u32 {
        self.nodes[0].id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.nodes[0].id = id;
    }

    pub fn node(&self, ix: NodeIndex) -> &TaskNode {
        &self.nodes[ix.0]
    }

    pub fn task(&self, ix: NodeIndex) -> &Task {
        &self.nodes[ix.0].task
    }

    pub fn task_mut(&mut self, ix: NodeIndex) -> &mut Task {
        &mut self.nodes[ix.0].task
    }

    pub fn children(&self, ix: NodeIndex) -> &[NodeIndex] {
        &self.nodes[ix.0].children
    }

    /// Number of tasks in the tree, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a task below `parent` with id `1 + max sibling id`
    pub fn add_subtask(&mut self, parent: NodeIndex, task: Task) -> NodeIndex {
        self.graft(parent, TaskTree::new(task))
    }

    /// Attaches a whole tree below `parent`. Its root becomes the last
    /// child, with id `1 + max sibling id`; its subtasks keep their ids.
    pub fn graft(&mut self, parent: NodeIndex, other: TaskTree) -> NodeIndex {
        let offset = self.nodes.len();
        let base_depth = self.nodes[parent.0].depth + 1;
        let id = self.nodes[parent.0]
            .children
            .iter()
            .map(|c| self.nodes[c.0].id)
            .max()
            .unwrap_or(0)
            + 1;

        for (i, mut node) in other.nodes.into_iter().enumerate() {
            node.depth += base_depth;
            node.children = node
                .children
                .iter()
                .map(|c| NodeIndex(c.0 + offset))
                .collect();
            if i == 0 {
                node.id = id;
                node.parent = Some(parent);
            } else {
                node.parent = node.parent.map(|p| NodeIndex(p.0 + offset));
            }
            self.nodes.push(node);
        }

        let ix = NodeIndex(offset);
        self.nodes[parent.0].children.push(ix);
        ix
    }

    /// Follows 1-based child positions down from the root
    pub fn resolve(&self, positions: &[u32]) -> Option<NodeIndex> {
        let mut ix = self.root();
        for &position in positions {
            let slot = usize::try_from(position).ok()?.checked_sub(1)?;
            ix = *self.nodes[ix.0].children.get(slot)?;
        }
        Some(ix)
    }

    /// All nodes in depth-first order, parents before their children
    pub fn walk(&self) -> Vec<NodeIndex> {
        self.walk_from(self.root())
    }

    fn walk_from(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![start];
        while let Some(ix) = stack.pop() {
            order.push(ix);
            stack.extend(self.nodes[ix.0].children.iter().rev().copied());
        }
        order
    }

    /// Formats one node. Subtasks get a leading marker prefix matching
    /// their depth; `include_subtasks` appends every descendant.
    pub fn format(&self, ix: NodeIndex, marker: &str, include_subtasks: bool) -> String {
        let node = &self.nodes[ix.0];
        let mut out = String::new();

        if node.depth > 0 {
            out.push(' ');
            out.push_str(&marker.repeat(node.depth));
            out.push(' ');
        }
        out.push_str(&format_line(&node.task));

        if include_subtasks {
            for &child in &node.children {
                out.push_str(&self.format(child, marker, true));
            }
        }
        out
    }

    /// Deep copy of the subtree at `ix` as a tree of its own
    pub fn subtree(&self, ix: NodeIndex) -> TaskTree {
        let order = self.walk_from(ix);
        let mut remap = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.0] = Some(NodeIndex(new));
        }

        let base_depth = self.nodes[ix.0].depth;
        let nodes = order
            .iter()
            .map(|old| {
                let node = &self.nodes[old.0];
                TaskNode {
                    task: node.task.clone(),
                    id: if *old == ix { 1 } else { node.id },
                    depth: node.depth - base_depth,
                    parent: node.parent.and_then(|p| remap[p.0]),
                    children: node.children.iter().filter_map(|c| remap[c.0]).collect(),
                }
            })
            .collect();
        TaskTree { nodes }
    }

    /// Detaches the subtree at `ix` and returns it. The remaining siblings
    /// are renumbered by position. The root cannot be removed from its own
    /// tree.
    pub fn remove(&mut self, ix: NodeIndex) -> Option<TaskTree> {
        let parent = self.nodes.get(ix.0)?.parent?;
        let removed = self.subtree(ix);

        let mut doomed = vec![false; self.nodes.len()];
        for i in self.walk_from(ix) {
            doomed[i.0] = true;
        }
        self.nodes[parent.0].children.retain(|c| *c != ix);

        let mut remap = vec![None; self.nodes.len()];
        let mut next = 0;
        for (old, gone) in doomed.iter().enumerate() {
            if !gone {
                remap[old] = Some(NodeIndex(next));
                next += 1;
            }
        }

        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .into_iter()
            .enumerate()
            .filter_map(|(old, mut node)| {
                remap[old]?;
                node.parent = node.parent.and_then(|p| remap[p.0]);
                node.children = node.children.iter().filter_map(|c| remap[c.0]).collect();
                Some(node)
            })
            .collect();

        if let Some(parent) = remap[parent.0] {
            self.renumber_children(parent);
        }
        Some(removed)
    }

    fn renumber_children(&mut self, parent: NodeIndex) {
        let children = self.nodes[parent.0].children.clone();
        for (position, child) in children.into_iter().enumerate() {
            self.nodes[child.0].id = position as u32 + 1;
        }
    }

    /// Completes or reopens the task at `ix` together with its subtasks
    pub fn set_completed(&mut self, ix: NodeIndex, done: bool, today: DateValue) {
        for i in self.walk_from(ix) {
            let task = &mut self.nodes[i.0].task;
            if done {
                task.complete(today);
            } else {
                task.reopen();
            }
        }
    }

    /// The next instance of a recurring task.
    ///
    /// Copies the whole tree with every task reopened, moves `due` to the
    /// rule's next date after the current `due` (or `today`) and re-anchors
    /// the rule there. Returns `None` if the root has no rule or the rule
    /// has no further dates.
    pub fn next_occurrence(&self, today: DateValue) -> Option<TaskTree> {
        let root = self.task(self.root());
        let rule = root.rrule.as_ref()?;
        let due = rule.next(root.due.unwrap_or(today))?;

        let mut next = self.clone();
        for node in &mut next.nodes {
            node.task.reopen();
        }

        let task = &mut next.nodes[0].task;
        task.due = Some(due);
        if let Some(rule) = task.rrule.as_mut() {
            rule.rebind(due);
        }
        if task.created_at.is_some() {
            task.created_at = Some(today);
        }
        Some(next)
    }
}

/// Splits `text` before every word that starts with exactly `reps`
/// repetitions of `marker`. The marker itself is dropped.
fn split_on_marker<'a>(text: &'a str, marker: &str, reps: usize) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for word in WORD_RE.find_iter(text) {
        if word.as_str().starts_with(char::is_whitespace) {
            continue;
        }
        if marker_run(word.as_str(), marker) == reps {
            segments.push(&text[start..word.start()]);
            start = word.start() + marker.len() * reps;
        }
    }

    segments.push(&text[start..]);
    segments
}

fn marker_run(word: &str, marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut rest = word;
    while let Some(after) = rest.strip_prefix(marker) {
        count += 1;
        rest = after;
    }
    count
}

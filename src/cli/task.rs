//! Task CLI commands

use anyhow::{anyhow, bail, Context, Result};

use super::output::Output;
use crate::domain::{Priority, Task, TaskPath, TaskRef, TaskStore};
use crate::storage::Workspace;

pub fn list(output: &Output, workspace: &Workspace, all: bool) -> Result<()> {
    let store = workspace.load()?;
    output.verbose_ctx("list", &format!("Loaded {} root tasks", store.len()));

    let entries: Vec<_> = store
        .entries()
        .into_iter()
        .filter(|(_, entry)| all || !root_task(entry).completed)
        .collect();

    if output.is_json() {
        let items: Vec<_> = entries
            .iter()
            .map(|(path, entry)| {
                serde_json::json!({
                    "path": path,
                    "depth": entry.node().depth(),
                    "line": workspace.codec().format_task(entry.task()),
                    "task": entry.task(),
                })
            })
            .collect();
        output.data(&items);
    } else if entries.is_empty() {
        println!("No tasks");
    } else {
        for (path, entry) in &entries {
            output.task_line(
                path,
                entry.node().depth(),
                &workspace.codec().format_task(entry.task()),
            );
        }
    }

    Ok(())
}

pub fn add(
    output: &Output,
    workspace: &Workspace,
    text: &str,
    parent: Option<&TaskPath>,
) -> Result<()> {
    let mut store = workspace.load()?;

    let mut tree = workspace
        .codec()
        .parse_tree(text)
        .with_context(|| format!("Invalid task: {}", text))?;
    let root = tree.root();
    if tree.task(root).created_at.is_none() {
        tree.task_mut(root).created_at = Some(workspace.today());
    }
    output.verbose_ctx("add", &format!("Parsed {} task(s)", tree.len()));

    let path = match parent {
        None => {
            let id = store.append(tree);
            output.verbose_ctx("add", &format!("Assigned root id {}", id));
            TaskPath::root(store.len() as u32)
        }
        Some(parent) => store
            .append_subtask(parent, tree)
            .ok_or_else(|| anyhow!("Task not found: {}", parent))?,
    };

    workspace.save(&store)?;

    let line = describe(workspace, &store, &path)?;
    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "line": line,
        }));
    } else {
        output.success(&format!("Added task {}: {}", path, line));
    }

    Ok(())
}

pub fn show(output: &Output, workspace: &Workspace, path: &TaskPath) -> Result<()> {
    let store = workspace.load()?;
    let entry = find(&store, path)?;
    let task = entry.task();

    let subtasks: Vec<_> = entry
        .node()
        .children()
        .iter()
        .enumerate()
        .map(|(i, &child)| {
            (
                path.child(i as u32 + 1),
                workspace.codec().format_task(entry.tree().task(child)),
            )
        })
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "id": entry.node().id(),
            "depth": entry.node().depth(),
            "line": workspace.codec().format_task(task),
            "task": task,
            "subtasks": subtasks
                .iter()
                .map(|(p, line)| serde_json::json!({ "path": p, "line": line }))
                .collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    output.field("Task", path);
    output.field("Description", &task.description);
    output.field("Status", if task.completed { "done" } else { "open" });
    if let Some(priority) = task.priority {
        output.field("Priority", priority);
    }
    if let Some(created) = task.created_at {
        output.field("Created", created);
    }
    if let Some(completed) = task.completed_at {
        output.field("Completed", completed);
    }
    if let Some(due) = task.due {
        output.field("Due", due);
    }
    if let Some(rule) = &task.rrule {
        output.field("Recurrence", rule);
    }
    if !task.projects.is_empty() {
        output.field("Projects", task.projects.join(", "));
    }
    if !task.contexts.is_empty() {
        output.field("Contexts", task.contexts.join(", "));
    }

    let other_tags: Vec<_> = task
        .tags
        .iter()
        .filter(|(key, _)| *key != "due" && *key != "rrule")
        .collect();
    if !other_tags.is_empty() {
        output.section("Tags");
        for (key, value) in other_tags {
            output.field(&format!("  {}", key), value);
        }
    }

    if !subtasks.is_empty() {
        output.section("Subtasks");
        for (sub, line) in &subtasks {
            output.task_line(sub, 1, line);
        }
    }

    Ok(())
}

pub fn set_done(output: &Output, workspace: &Workspace, path: &TaskPath, done: bool) -> Result<()> {
    let mut store = workspace.load()?;
    let today = workspace.today();

    let mut target = store
        .lookup_mut(path)
        .ok_or_else(|| anyhow!("Task not found: {}", path))?;
    let ix = target.index();
    target.tree_mut().set_completed(ix, done, today);
    let count = target.tree().walk().len();
    output.verbose_ctx(
        if done { "done" } else { "undo" },
        &format!("Updated task {} (tree of {} tasks)", path, count),
    );

    workspace.save(&store)?;

    let line = describe(workspace, &store, path)?;
    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "completed": done,
            "line": line,
        }));
    } else if done {
        output.success(&format!("Completed task {}: {}", path, line));
    } else {
        output.success(&format!("Reopened task {}: {}", path, line));
    }

    Ok(())
}

pub fn next(output: &Output, workspace: &Workspace, path: &TaskPath) -> Result<()> {
    if !path.is_root() {
        bail!("Only root tasks can recur: {}", path);
    }

    let mut store = workspace.load()?;
    let today = workspace.today();

    let mut target = store
        .lookup_mut(path)
        .ok_or_else(|| anyhow!("Task not found: {}", path))?;
    if !target.task().is_recurring() {
        bail!("Task {} has no recurrence rule", path);
    }

    let upcoming = target.tree().next_occurrence(today);
    let root = target.index();
    target.tree_mut().set_completed(root, true, today);

    let next_path = upcoming.map(|tree| {
        store.append(tree);
        TaskPath::root(store.len() as u32)
    });
    workspace.save(&store)?;

    let line = describe(workspace, &store, path)?;
    let next_line = next_path
        .as_ref()
        .map(|p| describe(workspace, &store, p))
        .transpose()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "line": line,
            "next": next_path.as_ref().map(|p| serde_json::json!({
                "path": p,
                "line": next_line,
            })),
        }));
    } else {
        match (&next_path, &next_line) {
            (Some(p), Some(next_line)) => output.success(&format!(
                "Completed task {}; next occurrence is task {}: {}",
                path, p, next_line
            )),
            _ => output.success(&format!(
                "Completed task {}; the rule has no further occurrences",
                path
            )),
        }
    }

    Ok(())
}

pub fn set_priority(
    output: &Output,
    workspace: &Workspace,
    path: &TaskPath,
    priority: Option<Priority>,
) -> Result<()> {
    let mut store = workspace.load()?;

    store
        .lookup_mut(path)
        .ok_or_else(|| anyhow!("Task not found: {}", path))?
        .task_mut()
        .priority = priority;

    workspace.save(&store)?;

    let line = describe(workspace, &store, path)?;
    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "priority": priority,
            "line": line,
        }));
    } else {
        match priority {
            Some(p) => output.success(&format!("Set priority {} on task {}: {}", p, path, line)),
            None => output.success(&format!("Cleared priority on task {}: {}", path, line)),
        }
    }

    Ok(())
}

pub fn remove(output: &Output, workspace: &Workspace, path: &TaskPath) -> Result<()> {
    let mut store = workspace.load()?;

    let removed = store
        .remove(path)
        .ok_or_else(|| anyhow!("Task not found: {}", path))?;
    output.verbose_ctx("rm", &format!("Removing {} task(s)", removed.len()));

    workspace.save(&store)?;

    let line = workspace.codec().format_task(removed.task(removed.root()));
    if output.is_json() {
        output.data(&serde_json::json!({
            "path": path,
            "removed": removed.len(),
            "line": line,
        }));
    } else {
        output.success(&format!("Removed task {}: {}", path, line));
    }

    Ok(())
}

fn find<'a>(store: &'a TaskStore, path: &TaskPath) -> Result<TaskRef<'a>> {
    store
        .lookup(path)
        .ok_or_else(|| anyhow!("Task not found: {}", path))
}

/// The task's own line, without subtasks
fn describe(workspace: &Workspace, store: &TaskStore, path: &TaskPath) -> Result<String> {
    let entry = find(store, path)?;
    Ok(workspace.codec().format_task(entry.task()))
}

fn root_task<'a>(entry: &TaskRef<'a>) -> &'a Task {
    let tree = entry.tree();
    tree.task(tree.root())
}

//! Workspace: the todo file together with the settings used to read it

use std::path::Path;

use anyhow::{Context, Result};

use super::{Config, TodoFile};
use crate::domain::{Clock, DateValue, LineCodec, TaskStore};

/// An opened todo list
pub struct Workspace {
    config: Config,
    file: TodoFile,
    codec: LineCodec,
}

impl Workspace {
    /// Opens the todo file named by `file` or by the configuration
    pub fn open(config: Config, file: Option<&Path>, clock: &dyn Clock) -> Self {
        let path = config.resolve_todo_file(file);
        let codec = LineCodec::new(clock).with_marker(config.subtask_marker.clone());
        Self {
            file: TodoFile::new(path),
            config,
            codec,
        }
    }

    /// Loads every task from the todo file
    pub fn load(&self) -> Result<TaskStore> {
        let lines = self.file.read_lines()?;
        TaskStore::load(&lines, &self.codec)
            .with_context(|| format!("Failed to load tasks from {}", self.path().display()))
    }

    /// Writes every task back to the todo file
    pub fn save(&self, store: &TaskStore) -> Result<()> {
        self.file.write(&store.to_text(&self.codec))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn codec(&self) -> &LineCodec {
        &self.codec
    }

    pub fn marker(&self) -> &str {
        self.codec.marker()
    }

    pub fn today(&self) -> DateValue {
        self.codec.today()
    }

    /// Returns the path to the todo file
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FixedClock, TaskPath};
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock(DateValue::from_ymd(2021, 1, 1).unwrap())
    }

    #[test]
    fn load_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.txt");
        std::fs::write(&path, "call mom\n\nplan trip && book flight\n").unwrap();

        let workspace = Workspace::open(Config::default(), Some(&path), &clock());
        let mut store = workspace.load().unwrap();
        assert_eq!(store.len(), 2);

        let target: TaskPath = "2.1".parse().unwrap();
        store.lookup_mut(&target).unwrap().task_mut().complete(workspace.today());
        workspace.save(&store).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "call mom\nplan trip && x book flight\n"
        );
    }

    #[test]
    fn configured_marker_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.txt");
        std::fs::write(&path, "move // pack\n").unwrap();

        let config = Config {
            subtask_marker: "//".to_string(),
            ..Config::default()
        };
        let workspace = Workspace::open(config, Some(&path), &clock());
        let store = workspace.load().unwrap();

        assert_eq!(workspace.marker(), "//");
        assert!(store.lookup(&"1.1".parse().unwrap()).is_some());
    }

    #[test]
    fn load_error_names_the_file_and_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todo.txt");
        std::fs::write(&path, "ok\n2021-02-31 bad\n").unwrap();

        let workspace = Workspace::open(Config::default(), Some(&path), &clock());
        let err = workspace.load().unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("todo.txt"));
        assert!(message.contains("line 2"));
    }
}

//! Hierarchical task paths
//!
//! A path is a dot-separated list of 1-based positions: `2` is the second
//! root task, `2.4` its fourth subtask.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Invalid task path: expected positions like '2' or '2.4', got '{0}'")]
    Malformed(String),

    #[error("Invalid task path '{path}': positions start at 1")]
    ZeroPosition { path: String },
}

/// Dot-separated path of 1-based sibling positions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskPath(Vec<u32>);

impl TaskPath {
    /// Path of a root task
    pub fn root(position: u32) -> Self {
        Self(vec![position])
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Number of segments; a root task has depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Position of the root task this path starts at
    pub fn root_position(&self) -> u32 {
        self.0[0]
    }

    /// Path of the parent task, or `None` for a root task
    pub fn parent(&self) -> Option<TaskPath> {
        if self.is_root() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Path of the child at `position` below this task
    pub fn child(&self, position: u32) -> TaskPath {
        let mut segments = self.0.clone();
        segments.push(position);
        Self(segments)
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl FromStr for TaskPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathError::Malformed(s.to_string()));
        }

        let segments = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                    return Err(PathError::Malformed(s.to_string()));
                }
                part.parse::<u32>()
                    .map_err(|_| PathError::Malformed(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if segments.contains(&0) {
            return Err(PathError::ZeroPosition {
                path: s.to_string(),
            });
        }

        Ok(Self(segments))
    }
}

impl TryFrom<String> for TaskPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskPath> for String {
    fn from(path: TaskPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_root_and_nested_paths() {
        let path: TaskPath = "2".parse().unwrap();
        assert_eq!(path.segments(), &[2]);
        assert!(path.is_root());
        assert_eq!(path.parent(), None);

        let path: TaskPath = " 2.4.1 ".parse().unwrap();
        assert_eq!(path.segments(), &[2, 4, 1]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.root_position(), 2);
        assert_eq!(path.to_string(), "2.4.1");
    }

    #[test]
    fn parent_and_child() {
        let path: TaskPath = "3.1".parse().unwrap();
        assert_eq!(path.parent(), Some(TaskPath::root(3)));
        assert_eq!(path.child(2).to_string(), "3.1.2");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "a", "1.", ".1", "1..2", "1.-2", "+1", "1.2x"] {
            assert!(
                matches!(bad.parse::<TaskPath>(), Err(PathError::Malformed(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_zero_positions() {
        assert_eq!(
            "2.0".parse::<TaskPath>(),
            Err(PathError::ZeroPosition {
                path: "2.0".to_string()
            })
        );
    }

    #[test]
    fn serializes_as_string() {
        let path: TaskPath = "1.2".parse().unwrap();
        assert_eq!(serde_json::to_string(&path).unwrap(), r#""1.2""#);
        let back: TaskPath = serde_json::from_str(r#""1.2""#).unwrap();
        assert_eq!(back, path);
    }
}

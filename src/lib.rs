//! taskmaster - a plain-text task list in the todo.txt format
//!
//! Each line holds one root task with its completion mark, priority, dates,
//! projects, contexts and `key:value` tags. Subtasks nest inline behind a
//! repeated marker, and a `rrule` tag makes a task recur.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{LineCodec, Task, TaskPath, TaskStore, TaskTree};

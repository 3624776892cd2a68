//! # Storage Layer
//!
//! Persistence for taskmaster.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | todo.txt, one root task per line | `~/todo.txt` (configurable) |
//! | Config | TOML | `~/.config/taskmaster/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TodoFile`] takes a shared `fs2` lock while reading
//! - Writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point: todo file, config and codec together
//! - [`TodoFile`] - Read/write the raw lines
//! - [`Config`] - User configuration

mod config;
mod todotxt;
mod workspace;

pub use config::{expand_tilde, Config, ConfigError, OutputFormat};
pub use todotxt::TodoFile;
pub use workspace::Workspace;

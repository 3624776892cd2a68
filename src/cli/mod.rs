//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `list` | Show tasks with their paths (default) |
//! | `add`, `rm` | Create and delete tasks |
//! | `done`, `undo`, `pri` | Change a task |
//! | `next` | Complete a recurring task and schedule the next one |
//! | `show` | All fields of one task |
//! | `config show`, `config path` | Inspect configuration |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! taskmaster --verbose list
//! ```

mod app;
mod config_cmd;
mod output;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};

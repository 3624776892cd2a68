//! Output formatting for CLI commands

use serde::Serialize;

use crate::domain::TaskPath;
pub use crate::storage::OutputFormat;

/// Indentation per nesting level in task listings
const INDENT: &str = "  ";

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Prints one task as `path line`, indented by depth (text mode only)
    pub fn task_line(&self, path: &TaskPath, depth: usize, line: &str) {
        if self.format == OutputFormat::Text {
            println!("{}", task_line(path, depth, line));
        }
    }

    /// Prints a `Label: value` line of a task's details (text mode only)
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if self.format == OutputFormat::Text {
            println!("{}: {}", label, value);
        }
    }

    /// Prints a blank line and a section heading (text mode only)
    pub fn section(&self, title: &str) {
        if self.format == OutputFormat::Text {
            println!("\n{}:", title);
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

fn task_line(path: &TaskPath, depth: usize, line: &str) -> String {
    if line.is_empty() {
        return format!("{}{}", INDENT.repeat(depth), path);
    }
    format!("{}{} {}", INDENT.repeat(depth), path, line)
}

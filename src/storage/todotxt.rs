//! Plain-text todo file
//!
//! One root task per line. Reads take a shared lock; writes go to a temp
//! file under an exclusive lock and are renamed over the target.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

/// Line source and sink for a todo.txt file
#[derive(Debug, Clone)]
pub struct TodoFile {
    path: PathBuf,
}

impl TodoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the todo file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads every line. A missing file reads as no lines.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open todo file: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on todo file")?;

        let reader = BufReader::new(&file);
        let mut lines = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
            lines.push(line);
        }

        Ok(lines)
    }

    /// Replaces the file contents. Non-empty text gets a trailing newline.
    pub fn write(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on todo file")?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(text.as_bytes())
                .context("Failed to write tasks")?;
            if !text.is_empty() && !text.ends_with('\n') {
                writer.write_all(b"\n").context("Failed to write tasks")?;
            }
            writer.flush().context("Failed to flush todo file")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("todo.txt"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

//! Line codec for the todo.txt dialect
//!
//! ```text
//! ["x "] ["(" A-Z ") "] [DATE " "] [DATE " "] DESCRIPTION {" " +PROJECT | @CONTEXT | KEY:VALUE} {SUBTASK}
//! ```
//!
//! With one date the date is the creation date. With two, the first is the
//! completion date and the second the creation date.
//!
//! Subtasks are introduced by a marker token (default `&&`) repeated once
//! per nesting level; see [`super::tree`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::clock::Clock;
use super::date::{looks_like_date, DateValue, DATE_LEN};
use super::error::FormatError;
use super::tags::TagDictionary;
use super::task::{read_typed_tags, Priority, Task};
use super::tree::TaskTree;

/// Default subtask marker
pub const DEFAULT_MARKER: &str = "&&";

/// Words and the whitespace runs between them
pub(crate) static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+|\S+").unwrap());

/// Parses and formats tasks for one run of the program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCodec {
    marker: String,
    today: DateValue,
}

impl LineCodec {
    /// Creates a codec using the default marker, anchoring on the clock's
    /// current day
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            today: clock.today(),
        }
    }

    /// Uses a different subtask marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The day rules anchor on when a task has no due date
    pub fn today(&self) -> DateValue {
        self.today
    }

    /// Parses one line as a single task. Subtask markers are treated as
    /// ordinary words.
    pub fn parse_task(&self, line: &str) -> Result<Task, FormatError> {
        reject_line_breaks(line)?;
        let (mut task, rest) = parse_header(line)?;
        parse_body(rest, &mut task, self.today)?;
        Ok(task)
    }

    /// Formats a single task, without subtasks
    pub fn format_task(&self, task: &Task) -> String {
        format_line(task)
    }

    /// Parses one line as a task with its subtasks
    pub fn parse_tree(&self, line: &str) -> Result<TaskTree, FormatError> {
        TaskTree::parse(line, self)
    }

    /// Formats a task with all of its subtasks as one line
    pub fn format_tree(&self, tree: &TaskTree) -> String {
        tree.format(tree.root(), &self.marker, true)
    }
}

pub(crate) fn reject_line_breaks(text: &str) -> Result<(), FormatError> {
    if text.contains(['\n', '\r']) {
        return Err(FormatError::Newline);
    }
    Ok(())
}

/// Reads the completion marker, priority and dates. Returns a task holding
/// those fields and the unread remainder.
pub(crate) fn parse_header(line: &str) -> Result<(Task, &str), FormatError> {
    let mut task = Task::default();
    let mut rest = line;

    // a completed task with nothing else formats as a bare `x`
    if rest == "x" {
        task.completed = true;
        rest = "";
    } else if let Some(after) = rest.strip_prefix("x ") {
        task.completed = true;
        rest = after.trim_start();
    }

    if let Some((priority, after)) = parse_priority(rest)? {
        task.priority = Some(priority);
        rest = after.trim_start();
    }

    if looks_like_date(rest) {
        let first = DateValue::parse(&rest[..DATE_LEN])?;
        rest = rest[DATE_LEN..].trim_start();

        if looks_like_date(rest) {
            task.completed_at = Some(first);
            task.created_at = Some(DateValue::parse(&rest[..DATE_LEN])?);
            rest = rest[DATE_LEN..].trim_start();
        } else {
            task.created_at = Some(first);
        }
    }

    Ok((task, rest))
}

/// A leading `(X)` followed by whitespace or the end of the line.
///
/// Other parenthesized text, like `(call) mom`, is description.
fn parse_priority(text: &str) -> Result<Option<(Priority, &str)>, FormatError> {
    let mut chars = text.chars();
    let (Some('('), Some(letter), Some(')')) = (chars.next(), chars.next(), chars.next()) else {
        return Ok(None);
    };
    let after = chars.as_str();
    if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
        return Ok(None);
    }

    match Priority::from_letter(letter) {
        Some(priority) => Ok(Some((priority, after))),
        None => Err(FormatError::Priority(format!("({})", letter))),
    }
}

/// Splits the description into text, projects, contexts and tags, then
/// reads the typed tags
pub(crate) fn parse_body(text: &str, task: &mut Task, today: DateValue) -> Result<(), FormatError> {
    let mut description = String::with_capacity(text.len());

    for word in WORD_RE.find_iter(text).map(|m| m.as_str()) {
        if word.starts_with(char::is_whitespace) {
            description.push_str(word);
        } else if let Some(project) = word.strip_prefix('+').filter(|p| !p.is_empty()) {
            task.projects.push(project.to_string());
        } else if let Some(context) = word.strip_prefix('@').filter(|c| !c.is_empty()) {
            task.contexts.push(context.to_string());
        } else if let Some((key, value)) = TagDictionary::parse_token(word) {
            task.tags.set(key, value);
        } else {
            description.push_str(word);
        }
    }

    task.description = description.trim().to_string();
    read_typed_tags(task, today)
}

/// Formats one task without subtasks
pub(crate) fn format_line(task: &Task) -> String {
    let mut out = String::new();

    if task.completed {
        push_word(&mut out, "x");
    }
    if let Some(priority) = task.priority {
        push_word(&mut out, &format!("({})", priority));
    }
    if let Some(date) = task.completed_at {
        push_word(&mut out, &date.format());
    }
    if let Some(date) = task.created_at {
        push_word(&mut out, &date.format());
    }
    push_word(&mut out, &task.description);

    let extras = task
        .projects
        .iter()
        .map(|p| format!("+{}", p))
        .chain(task.contexts.iter().map(|c| format!("@{}", c)))
        .chain(task.wire_tags().format());

    for word in extras {
        // the description may still carry the word literally
        if !out.split_whitespace().any(|w| w == word) {
            push_word(&mut out, &word);
        }
    }

    out
}

fn push_word(out: &mut String, word: &str) {
    if word.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(word);
}

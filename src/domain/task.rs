//! Task domain model
//!
//! A task is one entry of the list: completion state, priority, dates,
//! description, projects, contexts and tags. Subtasks and ids live in the
//! tree that owns the task (see [`super::tree`]).

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::date::DateValue;
use super::error::FormatError;
use super::recurrence::RecurrenceRule;
use super::tags::TagDictionary;

/// Task priority, `A` (highest) through `Z`
///
/// Stored as a rank where `A = 0`, so ordering puts the most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(0);
    pub const LOWEST: Priority = Priority(25);

    /// Maps `A`..`Z` to a priority
    pub fn from_letter(letter: char) -> Option<Self> {
        letter
            .is_ascii_uppercase()
            .then(|| Self(letter as u8 - b'A'))
    }

    /// Maps a rank `0..=25` to a priority
    pub fn from_rank(rank: u8) -> Option<Self> {
        (rank <= Self::LOWEST.0).then_some(Self(rank))
    }

    pub fn letter(&self) -> char {
        char::from(b'A' + self.0)
    }

    pub fn rank(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Priority {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter.to_ascii_uppercase())
                .ok_or_else(|| FormatError::Priority(s.to_string())),
            _ => Err(FormatError::Priority(s.to_string())),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A single task, without its subtasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Task {
    /// Free text with projects, contexts and tags removed
    pub description: String,

    pub completed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,

    /// Tags as read from the line. `due` and `rrule` are authoritative in
    /// their typed fields and copied back here when the task is written.
    #[serde(skip_serializing_if = "TagDictionary::is_empty")]
    pub tags: TagDictionary,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrule: Option<RecurrenceRule>,
}

impl Task {
    /// Creates an open task with the given description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Marks the task done. The completion date is only recorded when the
    /// task has a creation date, since a lone date reads back as creation.
    pub fn complete(&mut self, today: DateValue) {
        if !self.completed {
            self.completed = true;
            if self.created_at.is_some() {
                self.completed_at = Some(today);
            }
        }
    }

    /// Marks the task open again
    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Returns true if the task carries a recurrence rule
    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }

    /// Tags as they are written to the line, with typed fields copied back
    pub fn wire_tags(&self) -> TagDictionary {
        let mut tags = self.tags.clone();
        for typed in TYPED_TAGS {
            match (typed.write)(self) {
                Some(value) => tags.set(typed.key, value),
                None => {
                    tags.remove(typed.key);
                }
            }
        }
        tags
    }
}

/// A tag with a typed field on [`Task`]
pub(crate) struct TypedTag {
    pub key: &'static str,
    /// Parses the raw value into the task's field. `today` anchors values
    /// that need a reference date.
    pub read: fn(&mut Task, &str, DateValue) -> Result<(), FormatError>,
    /// Renders the field, or `None` when it is unset
    pub write: fn(&Task) -> Option<String>,
}

/// Typed tags in the order they are read. `rrule` is anchored on `due`, so
/// `due` comes first.
pub(crate) const TYPED_TAGS: &[TypedTag] = &[
    TypedTag {
        key: "due",
        read: read_due,
        write: write_due,
    },
    TypedTag {
        key: "rrule",
        read: read_rrule,
        write: write_rrule,
    },
];

fn read_due(task: &mut Task, value: &str, _today: DateValue) -> Result<(), FormatError> {
    let due = DateValue::parse(value).map_err(|e| FormatError::Tag {
        key: "due".to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    task.due = Some(due);
    Ok(())
}

fn write_due(task: &Task) -> Option<String> {
    task.due.map(|d| d.format())
}

fn read_rrule(task: &mut Task, value: &str, today: DateValue) -> Result<(), FormatError> {
    let anchor = task.due.unwrap_or(today);
    task.rrule = Some(RecurrenceRule::parse(value, anchor)?);
    Ok(())
}

fn write_rrule(task: &Task) -> Option<String> {
    task.rrule.as_ref().map(|r| r.format())
}

/// Fills the typed fields from `task.tags`. Fails on the first value that
/// does not parse.
pub(crate) fn read_typed_tags(task: &mut Task, today: DateValue) -> Result<(), FormatError> {
    for typed in TYPED_TAGS {
        if let Some(value) = task.tags.get(typed.key).map(str::to_string) {
            (typed.read)(task, &value, today)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateValue {
        DateValue::parse(s).unwrap()
    }

    #[test]
    fn priority_letters_are_bijective() {
        for letter in 'A'..='Z' {
            let priority = Priority::from_letter(letter).unwrap();
            assert_eq!(priority.letter(), letter);
            assert_eq!(Priority::from_rank(priority.rank()), Some(priority));
        }
        for rank in 0..=25u8 {
            let priority = Priority::from_rank(rank).unwrap();
            assert_eq!(Priority::from_letter(priority.letter()), Some(priority));
        }
    }

    #[test]
    fn priority_rejects_other_characters() {
        assert_eq!(Priority::from_letter('a'), None);
        assert_eq!(Priority::from_letter('1'), None);
        assert_eq!(Priority::from_rank(26), None);
        assert!("AB".parse::<Priority>().is_err());
        assert_eq!("b".parse::<Priority>(), Ok(Priority::from_letter('B').unwrap()));
    }

    #[test]
    fn a_sorts_before_z() {
        assert!(Priority::HIGHEST < Priority::LOWEST);
        assert_eq!(Priority::HIGHEST.letter(), 'A');
        assert_eq!(Priority::LOWEST.letter(), 'Z');
    }

    #[test]
    fn complete_records_date_only_with_creation_date() {
        let mut task = Task::new("water plants");
        task.complete(day("2021-03-01"));
        assert!(task.completed);
        assert_eq!(task.completed_at, None);

        let mut task = Task::new("water plants");
        task.created_at = Some(day("2021-02-01"));
        task.complete(day("2021-03-01"));
        assert_eq!(task.completed_at, Some(day("2021-03-01")));

        task.reopen();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn typed_tags_read_in_order() {
        let mut task = Task::new("pay rent");
        task.tags.set("rrule", "RRULE:FREQ=MONTHLY");
        task.tags.set("due", "2021-01-01");

        read_typed_tags(&mut task, day("2020-06-15")).unwrap();
        assert_eq!(task.due, Some(day("2021-01-01")));

        // anchored at due, not at today
        let rule = task.rrule.as_ref().unwrap();
        assert_eq!(rule.rules()[0].anchor(), day("2021-01-01"));
    }

    #[test]
    fn rrule_without_due_anchors_on_today() {
        let mut task = Task::new("stretch");
        task.tags.set("rrule", "RRULE:FREQ=DAILY");

        read_typed_tags(&mut task, day("2021-04-10")).unwrap();
        let rule = task.rrule.as_ref().unwrap();
        assert_eq!(rule.rules()[0].anchor(), day("2021-04-10"));
    }

    #[test]
    fn malformed_typed_tag_fails_loudly() {
        let mut task = Task::new("call mom");
        task.tags.set("due", "tomorrow");

        let err = read_typed_tags(&mut task, day("2021-01-01")).unwrap_err();
        assert!(matches!(err, FormatError::Tag { ref key, .. } if key == "due"));
    }

    #[test]
    fn wire_tags_mirror_typed_fields() {
        let mut task = Task::new("file taxes");
        task.tags.set("due", "2021-04-15");
        task.tags.set("owner", "kim");
        read_typed_tags(&mut task, day("2021-01-01")).unwrap();

        task.due = Some(day("2022-04-15"));
        assert_eq!(task.wire_tags().format(), vec!["due:2022-04-15", "owner:kim"]);

        task.due = None;
        assert_eq!(task.wire_tags().format(), vec!["owner:kim"]);
    }

    #[test]
    fn clone_does_not_share_containers() {
        let mut original = Task::new("pack");
        original.projects.push("trip".to_string());
        original.tags.set("bag", "red");

        let mut copy = original.clone();
        copy.projects.push("beach".to_string());
        copy.tags.set("bag", "blue");

        assert_eq!(original.projects, vec!["trip"]);
        assert_eq!(original.tags.get("bag"), Some("red"));
    }
}

//! `key:value` tags
//!
//! Tags keep the order in which they first appeared on the line so that a
//! task is written back the way it was read.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Shortest token (after trimming) that can be a tag, e.g. `a:b`
pub const MIN_TAG_LEN: usize = 3;

/// Insertion-ordered tag mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDictionary(Vec<(String, String)>);

impl TagDictionary {
    /// Creates an empty dictionary
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Splits a word into `(key, value)` if it is a tag.
    ///
    /// A tag contains `:`, is at least [`MIN_TAG_LEN`] characters long and
    /// has a non-empty key and value. `a:` and `:b` are plain words.
    pub fn parse_token(token: &str) -> Option<(&str, &str)> {
        let token = token.trim();
        if token.chars().count() < MIN_TAG_LEN {
            return None;
        }
        let (key, value) = token.split_once(':')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some((key, value))
    }

    /// Gets a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a value. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Removes a value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over all key-value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the `key:value` words in insertion order
    pub fn format(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{}:{}", k, v)).collect()
    }
}

impl Serialize for TagDictionary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_tags() {
        assert_eq!(
            TagDictionary::parse_token("due:2021-05-01"),
            Some(("due", "2021-05-01"))
        );
        assert_eq!(
            TagDictionary::parse_token("url:http://example.com"),
            Some(("url", "http://example.com"))
        );
    }

    #[test]
    fn length_threshold_boundaries() {
        // two characters: never a tag
        assert_eq!(TagDictionary::parse_token("a:"), None);
        assert_eq!(TagDictionary::parse_token(":"), None);
        // three characters: the shortest tag
        assert_eq!(TagDictionary::parse_token("a:b"), Some(("a", "b")));
    }

    #[test]
    fn empty_key_or_value_is_not_a_tag() {
        assert_eq!(TagDictionary::parse_token(":ab"), None);
        assert_eq!(TagDictionary::parse_token("Note:"), None);
        assert_eq!(TagDictionary::parse_token("plain"), None);
    }

    #[test]
    fn set_keeps_position() {
        let mut tags = TagDictionary::new();
        tags.set("due", "2021-01-01");
        tags.set("owner", "sam");
        tags.set("due", "2021-02-01");

        assert_eq!(tags.format(), vec!["due:2021-02-01", "owner:sam"]);
        assert_eq!(tags.get("due"), Some("2021-02-01"));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn remove_drops_the_key() {
        let mut tags = TagDictionary::new();
        tags.set("a", "1");
        tags.set("b", "2");

        assert_eq!(tags.remove("a"), Some("1".to_string()));
        assert_eq!(tags.remove("a"), None);
        assert!(!tags.contains_key("a"));
        assert_eq!(tags.format(), vec!["b:2"]);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut tags = TagDictionary::new();
        tags.set("z", "1");
        tags.set("a", "2");

        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }
}

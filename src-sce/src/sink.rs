//! Optional observer of optimisation progress.
//!
//! The engine and its complexes report every evaluated population and every
//! notable step to an [`EventSink`]; no sink means nothing is reported.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::scores::ScoredPoint;

/// Tag key for the kind of event, e.g. "Initial Population"
pub const CATEGORY: &str = "Category";
/// Tag key for a free form message
pub const MESSAGE: &str = "Message";
/// Tag key for the shuffle counter
pub const SHUFFLE: &str = "Shuffle";
/// Tag key for the complex identifier
pub const COMPLEX: &str = "Complex";

/// Ordered key/value labels attached to an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn category(category: &str) -> Self {
        Self::new().with(CATEGORY, category)
    }

    pub fn with<V: fmt::Display>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a tag
    pub fn insert<V: fmt::Display>(&mut self, key: &str, value: V) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` into a copy of `self`, `other` winning on duplicated keys
    pub fn merged(&self, other: &Tags) -> Tags {
        let mut result = self.clone();
        for (k, v) in other.iter() {
            result.insert(k, v);
        }
        result
    }
}

/// Receiver of optimisation events; must be shareable across complexes
pub trait EventSink<T>: Send + Sync {
    fn write_scores(&self, scores: &[ScoredPoint<T>], tags: &Tags);
    fn write_message(&self, message: &str, tags: &Tags);
}

/// One event captured by an [`InMemoryEventSink`]
#[derive(Debug, Clone)]
pub enum SinkEntry<T> {
    Scores { scores: Vec<ScoredPoint<T>>, tags: Tags },
    Message { message: String, tags: Tags },
}

impl<T> SinkEntry<T> {
    pub fn tags(&self) -> &Tags {
        match self {
            SinkEntry::Scores { tags, .. } | SinkEntry::Message { tags, .. } => tags,
        }
    }
}

/// First-in first-out queue of events
#[derive(Debug)]
pub struct InMemoryEventSink<T> {
    entries: Mutex<VecDeque<SinkEntry<T>>>,
}

impl<T> Default for InMemoryEventSink<T> {
    fn default() -> Self {
        Self { entries: Mutex::new(VecDeque::new()) }
    }
}

impl<T> InMemoryEventSink<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Oldest event, if any
    pub fn dequeue(&self) -> Option<SinkEntry<T>> {
        self.entries.lock().pop_front()
    }

    pub fn drain(&self) -> Vec<SinkEntry<T>> {
        self.entries.lock().drain(..).collect()
    }
}

impl<T: Clone + Send> EventSink<T> for InMemoryEventSink<T> {
    fn write_scores(&self, scores: &[ScoredPoint<T>], tags: &Tags) {
        self.entries.lock().push_back(SinkEntry::Scores { scores: scores.to_vec(), tags: tags.clone() });
    }

    fn write_message(&self, message: &str, tags: &Tags) {
        self.entries
            .lock()
            .push_back(SinkEntry::Message { message: message.to_string(), tags: tags.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_replace_and_merge() {
        let mut t = Tags::category("Initial Population").with(SHUFFLE, 0);
        t.insert(SHUFFLE, 3);
        assert_eq!(t.get(SHUFFLE), Some("3"));
        assert_eq!(t.iter().count(), 2);

        let merged = t.merged(&Tags::new().with(COMPLEX, 1).with(CATEGORY, "Complex"));
        assert_eq!(merged.get(CATEGORY), Some("Complex"));
        assert_eq!(merged.get(COMPLEX), Some("1"));
        assert_eq!(merged.get(SHUFFLE), Some("3"));
    }

    #[test]
    fn test_in_memory_queue_order() {
        let sink: InMemoryEventSink<&str> = InMemoryEventSink::new();
        sink.write_message("start", &Tags::category("Log"));
        sink.write_scores(&[ScoredPoint::single("a", "f", 1.0, false)], &Tags::category("Pop"));
        assert_eq!(sink.count(), 2);
        match sink.dequeue() {
            Some(SinkEntry::Message { message, .. }) => assert_eq!(message, "start"),
            other => panic!("unexpected entry: {:?}", other),
        }
        match sink.dequeue() {
            Some(SinkEntry::Scores { scores, tags }) => {
                assert_eq!(scores.len(), 1);
                assert_eq!(tags.get(CATEGORY), Some("Pop"));
            }
            other => panic!("unexpected entry: {:?}", other),
        }
        assert!(sink.dequeue().is_none());
    }
}

//! Per-source chat buffers with atomic detach.
//!
//! The reader task appends while the flusher drains; the one correctness
//! rule is that a drain swaps the buffer out in a single critical section.
//! An append racing a detach lands in the fresh buffer and is picked up by
//! the next tick — never lost, never double-processed.

use std::collections::HashMap;
use std::mem;
use std::sync::Mutex;

use crate::event::ChatEvent;

/// FIFO chat buffers keyed by source, shared between reader and flusher.
#[derive(Debug, Default)]
pub struct ChatQueues {
    inner: Mutex<HashMap<String, Vec<ChatEvent>>>,
}

impl ChatQueues {
    /// Create queues with an empty buffer for each configured source key.
    pub fn new(source_keys: impl IntoIterator<Item = String>) -> Self {
        let inner = source_keys
            .into_iter()
            .map(|key| (key, Vec::new()))
            .collect();
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Append a message to the tail of its source's buffer, creating the
    /// buffer for an unseen key.
    pub fn append(&self, message: ChatEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .entry(message.source_key.clone())
            .or_default()
            .push(message);
    }

    /// Atomically take the full buffer for `key`, leaving a fresh empty one.
    pub fn detach(&self, key: &str) -> Vec<ChatEvent> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match inner.get_mut(key) {
            Some(buffer) => mem::take(buffer),
            None => Vec::new(),
        }
    }

    /// Number of buffered messages for `key`.
    pub fn len(&self, key: &str) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.get(key).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChatTimestamp;

    fn msg(key: &str, text: &str) -> ChatEvent {
        ChatEvent {
            source_key: key.into(),
            steam_id: 76561197990735296,
            name: "player".into(),
            text: text.into(),
            time: ChatTimestamp::Epoch(1700000000.0),
            anon: false,
            supporter_level: None,
        }
    }

    #[test]
    fn detach_returns_append_order_and_empties() {
        let queues = ChatQueues::new(["emberfall".to_string()]);
        for i in 0..5 {
            queues.append(msg("emberfall", &format!("m{i}")));
        }
        let drained = queues.detach("emberfall");
        assert_eq!(
            drained.iter().map(|m| m.text.as_str()).collect::<Vec<_>>(),
            ["m0", "m1", "m2", "m3", "m4"]
        );
        assert!(queues.is_empty("emberfall"));
    }

    #[test]
    fn append_after_detach_lands_in_next_batch() {
        let queues = ChatQueues::new(["emberfall".to_string()]);
        queues.append(msg("emberfall", "first"));
        let first = queues.detach("emberfall");
        assert_eq!(first.len(), 1);

        // A producer racing the drain lands in the fresh buffer.
        queues.append(msg("emberfall", "second"));
        let second = queues.detach("emberfall");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].text, "second");
    }

    #[test]
    fn unseen_key_is_created_on_append() {
        let queues = ChatQueues::new(Vec::<String>::new());
        queues.append(msg("stormgate", "hi"));
        assert_eq!(queues.len("stormgate"), 1);
        assert_eq!(queues.detach("stormgate").len(), 1);
    }

    #[test]
    fn detach_unknown_key_is_empty() {
        let queues = ChatQueues::new(["emberfall".to_string()]);
        assert!(queues.detach("nowhere").is_empty());
    }

    #[test]
    fn keys_are_buffered_independently() {
        let queues = ChatQueues::new(["a".to_string(), "b".to_string()]);
        queues.append(msg("a", "one"));
        queues.append(msg("b", "two"));
        queues.append(msg("a", "three"));
        assert_eq!(queues.detach("a").len(), 2);
        assert_eq!(queues.len("b"), 1);
    }
}

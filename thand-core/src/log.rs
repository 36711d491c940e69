//! Bounded in-memory log ring buffer (§4.F), fixed capacity `N=1000`.
//!
//! Insertion is lock-protected; reads take a read lock. Cursor + full-flag
//! layout, matching the description in §4.F: `GetEvents` slices
//! `[cursor..end] ++ [0..cursor]` once full, `[0..cursor]` before that.

use crate::model::{limits::LOG_RING_CAPACITY, LogEntry, LogLevel};
use std::collections::HashSet;
use std::sync::RwLock;

/// Optional filter applied by `events_with_filter` (§4.F).
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub levels: Option<HashSet<LogLevel>>,
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    pub until: Option<chrono::DateTime<chrono::Utc>>,
    /// `0` = unlimited.
    pub limit: usize,
}

struct Ring {
    entries: Vec<Option<LogEntry>>,
    cursor: usize,
    full: bool,
}

/// A fixed-capacity ring buffer of `LogEntry` values, safe to share via
/// `Arc` and call from any thread (§5 "Shared resources").
pub struct LogRingBuffer {
    inner: RwLock<Ring>,
}

impl LogRingBuffer {
    pub fn new() -> Self {
        Self::with_capacity(LOG_RING_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        LogRingBuffer {
            inner: RwLock::new(Ring {
                entries: vec![None; capacity],
                cursor: 0,
                full: false,
            }),
        }
    }

    /// Append one entry, overwriting the oldest once the ring is full.
    pub fn fire(&self, entry: LogEntry) {
        let mut ring = self.inner.write().expect("log ring lock poisoned");
        let cap = ring.entries.len();
        let cursor = ring.cursor;
        ring.entries[cursor] = Some(entry);
        ring.cursor = (cursor + 1) % cap;
        if ring.cursor == 0 {
            ring.full = true;
        }
    }

    /// All stored entries in chronological order.
    pub fn events(&self) -> Vec<LogEntry> {
        let ring = self.inner.read().expect("log ring lock poisoned");
        Self::ordered(&ring)
    }

    fn ordered(ring: &Ring) -> Vec<LogEntry> {
        let cap = ring.entries.len();
        let mut out = Vec::with_capacity(cap);
        if ring.full {
            for i in 0..cap {
                let idx = (ring.cursor + i) % cap;
                if let Some(e) = &ring.entries[idx] {
                    out.push(e.clone());
                }
            }
        } else {
            for i in 0..ring.cursor {
                if let Some(e) = &ring.entries[i] {
                    out.push(e.clone());
                }
            }
        }
        out
    }

    /// Apply `filter` in the order specified by §4.F: level membership,
    /// then time range, then limit. Always returns a freshly allocated slice.
    pub fn events_with_filter(&self, filter: &EventFilter) -> Vec<LogEntry> {
        let all = self.events();
        let mut filtered: Vec<LogEntry> = all
            .into_iter()
            .filter(|e| filter.levels.as_ref().is_none_or(|lv| lv.contains(&e.level)))
            .filter(|e| filter.since.is_none_or(|since| e.time >= since))
            .filter(|e| filter.until.is_none_or(|until| e.time <= until))
            .collect();
        if filter.limit > 0 && filtered.len() > filter.limit {
            filtered.truncate(filter.limit);
        }
        filtered
    }
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(minute: u32, level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            time: chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, minute, 0).unwrap(),
            level,
            message: message.to_string(),
            fields: Default::default(),
        }
    }

    /// Invariant 6: `Fire(e)` then `GetEvents()` length = `min(N, inserted_count)`;
    /// chronological ordering preserved.
    #[test]
    fn fire_then_events_respects_capacity_and_order() {
        let ring = LogRingBuffer::with_capacity(3);
        for i in 0..2 {
            ring.fire(entry(i, LogLevel::Info, &format!("m{i}")));
        }
        let events = ring.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "m0");
        assert_eq!(events[1].message, "m1");

        for i in 2..6 {
            ring.fire(entry(i, LogLevel::Info, &format!("m{i}")));
        }
        let events = ring.events();
        assert_eq!(events.len(), 3);
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["m3", "m4", "m5"]);
    }

    #[test]
    fn filter_applies_level_then_range_then_limit() {
        let ring = LogRingBuffer::with_capacity(10);
        ring.fire(entry(0, LogLevel::Info, "a"));
        ring.fire(entry(1, LogLevel::Error, "b"));
        ring.fire(entry(2, LogLevel::Error, "c"));
        ring.fire(entry(3, LogLevel::Error, "d"));

        let filter = EventFilter {
            levels: Some([LogLevel::Error].into_iter().collect()),
            since: Some(chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 1, 0).unwrap()),
            until: None,
            limit: 2,
        };
        let filtered = ring.events_with_filter(&filter);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].message, "b");
        assert_eq!(filtered[1].message, "c");
    }
}

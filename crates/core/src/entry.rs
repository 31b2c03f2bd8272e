//! The stored value record.

use std::time::{SystemTime, UNIX_EPOCH};

/// Value record stored under a [`CompositeKey`](crate::CompositeKey).
///
/// `when` is wall-clock seconds; caller-supplied timestamps are trusted
/// verbatim, so values are not required to be monotonic across entries.
/// `count` is incremented by one on every put of the same key and may be
/// driven negative-ward by the decrement operation, at which point the
/// owning store drops the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Opaque payload, absent when the client supplied none.
    pub data: Option<String>,
    /// Wall-clock seconds since the epoch.
    pub when: u64,
    /// Put count; ranking tie-breaker.
    pub count: i64,
}

impl Entry {
    /// A fresh entry carrying a payload and timestamp, not yet counted.
    pub fn new(data: Option<String>, when: u64) -> Self {
        Entry {
            data,
            when,
            count: 0,
        }
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch.
pub fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_starts_uncounted() {
        let e = Entry::new(Some("sw".into()), 100);
        assert_eq!(e.count, 0);
        assert_eq!(e.when, 100);
        assert_eq!(e.data.as_deref(), Some("sw"));
    }

    #[test]
    fn unix_seconds_is_past_2020() {
        assert!(unix_seconds() > 1_577_836_800);
    }
}

//! A single namespace: insertion-ordered entries behind one lock.
//!
//! The entry map iterates in insertion order, which is what both the
//! eviction policy (oldest-inserted at the head) and the snapshot format
//! (records written in insertion order) rely on. A re-put detaches the
//! entry and re-inserts it at the tail.
//!
//! Every method is one critical section under the namespace mutex; callers
//! never hold two namespace locks at once.

use std::io;
use std::path::Path;

use hashlink::LinkedHashMap;
use parking_lot::Mutex;

use typeahead_core::{CompositeKey, Entry};
use typeahead_persist::{write_snapshot, SnapshotRecord};

use crate::search::{rank, Hit};

/// One isolated keyspace with its own lock and dirty counter.
pub struct Namespace {
    name: String,
    inner: Mutex<NamespaceInner>,
}

struct NamespaceInner {
    entries: LinkedHashMap<CompositeKey, Entry>,
    /// Mutations not yet flushed to disk. Loads leave this untouched.
    dirty: u64,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            inner: Mutex::new(NamespaceInner {
                entries: LinkedHashMap::new(),
                dirty: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dirty(&self) -> u64 {
        self.inner.lock().dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty() > 0
    }

    /// Composite keys in insertion order.
    pub fn keys(&self) -> Vec<CompositeKey> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Insert or update one entry.
    ///
    /// An existing entry under the same key is detached and re-inserted at
    /// the tail; its count carries over and gains one, its payload and
    /// timestamp are replaced. The map may exceed `max_elems` by one inside
    /// this critical section; the head (oldest-inserted) entry is evicted
    /// before the lock is released.
    pub fn apply_put(
        &self,
        ckey: CompositeKey,
        data: Option<String>,
        when: u64,
        max_elems: usize,
    ) -> Hit {
        let mut inner = self.inner.lock();

        let mut entry = match inner.entries.remove(&ckey) {
            Some(existing) => existing,
            None => Entry::new(None, when),
        };
        entry.data = data;
        entry.when = when;
        entry.count += 1;

        let hit = Hit {
            key: ckey.nkey().to_string(),
            id: ckey.id().to_string(),
            when: entry.when,
            count: entry.count,
            data: entry.data.clone(),
        };

        inner.entries.insert(ckey, entry);
        while inner.entries.len() > max_elems {
            inner.entries.pop_front();
        }
        inner.dirty += 1;
        hit
    }

    /// Remove the entry with exactly this key. Returns whether anything was
    /// removed; removing nothing is not a mutation.
    pub fn remove(&self, ckey: &CompositeKey) -> bool {
        let mut inner = self.inner.lock();
        if inner.entries.remove(ckey).is_some() {
            inner.dirty += 1;
            true
        } else {
            false
        }
    }

    /// Remove every entry whose match key starts with `nprefix` and, when
    /// `id` is given, whose id equals it exactly. The empty prefix matches
    /// everything. Returns the number removed.
    pub fn remove_matching(&self, nprefix: &str, id: Option<&str>) -> usize {
        let mut inner = self.inner.lock();
        let doomed: Vec<CompositeKey> = inner
            .entries
            .keys()
            .filter(|k| {
                k.nkey().as_bytes().starts_with(nprefix.as_bytes())
                    && id.map_or(true, |id| k.id() == id)
            })
            .cloned()
            .collect();
        for key in &doomed {
            inner.entries.remove(key);
        }
        inner.dirty += doomed.len() as u64;
        doomed.len()
    }

    /// Add `value` (possibly negative) to the count of the entry stored
    /// under `(nkey, "")`. The entry is dropped when its count reaches zero
    /// or below. Returns `false` when no such entry exists.
    pub fn add_count(&self, nkey: &str, value: i64) -> bool {
        let ckey = match CompositeKey::new(nkey.to_string(), None) {
            Ok(k) => k,
            Err(_) => return false,
        };
        let mut inner = self.inner.lock();
        let Some(entry) = inner.entries.get_mut(&ckey) else {
            return false;
        };
        entry.count += value;
        if entry.count <= 0 {
            inner.entries.remove(&ckey);
        }
        inner.dirty += 1;
        true
    }

    /// Select, rank, and cut the entries matching a folded prefix.
    ///
    /// Candidates are gathered in insertion order, sorted newest-first with
    /// count as tie-breaker, then emitted up to `limit`, stopping early at
    /// the first hit at or below `ts_floor` when the cursor is set.
    pub fn select(&self, nprefix: &str, id: Option<&str>, limit: usize, ts_floor: u64) -> Vec<Hit> {
        let inner = self.inner.lock();
        let mut hits: Vec<Hit> = inner
            .entries
            .iter()
            .filter(|(k, _)| {
                k.nkey().as_bytes().starts_with(nprefix.as_bytes())
                    && id.map_or(true, |id| k.id() == id)
            })
            .map(|(k, e)| Hit {
                key: k.nkey().to_string(),
                id: k.id().to_string(),
                when: e.when,
                count: e.count,
                data: e.data.clone(),
            })
            .collect();
        drop(inner);

        rank(&mut hits);
        if ts_floor > 0 {
            if let Some(cut) = hits.iter().position(|h| h.when <= ts_floor) {
                hits.truncate(cut);
            }
        }
        hits.truncate(limit);
        hits
    }

    /// Rebuild entries from snapshot records, in file order.
    ///
    /// Counts and timestamps come from the records; the dirty counter is
    /// not advanced. Replaying through the same tail-insert/evict path as
    /// `apply_put` means an over-long file keeps only the most recently
    /// written `max_elems` records. Records whose key fails validation are
    /// skipped.
    pub fn load_records(&self, records: Vec<SnapshotRecord>, max_elems: usize) {
        let mut inner = self.inner.lock();
        for record in records {
            let Ok(ckey) = CompositeKey::new(record.nkey, Some(record.id)) else {
                continue;
            };
            inner.entries.remove(&ckey);
            inner.entries.insert(
                ckey,
                Entry {
                    data: record.data,
                    when: record.when,
                    count: record.count,
                },
            );
            while inner.entries.len() > max_elems {
                inner.entries.pop_front();
            }
        }
    }

    /// Write a snapshot of this namespace to `path`, holding the lock for
    /// the duration of the write. The dirty counter resets only on success.
    pub fn flush_to(&self, path: &Path) -> io::Result<usize> {
        let mut inner = self.inner.lock();
        let records = inner.entries.iter().map(|(k, e)| SnapshotRecord {
            nkey: k.nkey().to_string(),
            id: k.id().to_string(),
            data: e.data.clone(),
            when: e.when,
            count: e.count,
        });
        let written = write_snapshot(path, records)?;
        inner.dirty = 0;
        Ok(written)
    }
}

//! Composite entry keys.
//!
//! Within a namespace an entry is identified by the pair of its normalized
//! match key and an optional caller-supplied id. Entries with the same match
//! key but different ids coexist; an absent id is the empty string.
//!
//! The canonical byte layout `nkey 0x00 id 0x00` defines both equality and
//! the on-disk identity of a key. Because neither field may contain NUL,
//! field-wise equality and hashing on the two strings is exactly byte-wise
//! comparison of the canonical layout.

use crate::error::{Error, Result};

/// Identity of one entry within a namespace: `(normalized key, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    nkey: String,
    id: String,
}

impl CompositeKey {
    /// Build a composite key from an already-normalized match key and an
    /// optional id. Rejects interior NUL in either field, since NUL is the
    /// canonical field separator.
    pub fn new(nkey: String, id: Option<String>) -> Result<Self> {
        let id = id.unwrap_or_default();
        if nkey.as_bytes().contains(&0) {
            return Err(Error::bad_input("key contains NUL"));
        }
        if id.as_bytes().contains(&0) {
            return Err(Error::bad_input("id contains NUL"));
        }
        Ok(CompositeKey { nkey, id })
    }

    /// The normalized match key.
    pub fn nkey(&self) -> &str {
        &self.nkey
    }

    /// The id; empty when the caller supplied none.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical layout `nkey 0x00 id 0x00` used by the snapshot format.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.nkey.len() + self.id.len() + 2);
        out.extend_from_slice(self.nkey.as_bytes());
        out.push(0);
        out.extend_from_slice(self.id.as_bytes());
        out.push(0);
        out
    }
}

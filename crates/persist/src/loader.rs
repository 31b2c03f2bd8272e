//! Snapshot reload.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use typeahead_core::Result;

use crate::record::SnapshotRecord;

/// Read every record from the snapshot at `path`, in file order.
///
/// A missing file is the normal first-run case and yields an empty list.
/// A decode failure surfaces as [`Corruption`](typeahead_core::Error); the
/// caller decides whether to treat the namespace as empty.
pub fn read_snapshot(path: &Path) -> Result<Vec<SnapshotRecord>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    while let Some(record) = SnapshotRecord::read_from(&mut reader)? {
        records.push(record);
    }
    Ok(records)
}

//! Atomic snapshot writes.
//!
//! The write protocol per namespace:
//!
//! 1. open `<path>.tmp` create+truncate, mode `0660`
//! 2. stream records through a buffered writer
//! 3. flush, fsync, then `rename(<path>.tmp, <path>)`
//!
//! On any error the tmp file is removed best-effort and the previous
//! snapshot is left untouched.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::record::SnapshotRecord;

/// Write a complete snapshot for one namespace, atomically replacing any
/// previous file at `path`. Returns the number of records written.
pub fn write_snapshot<I>(path: &Path, records: I) -> io::Result<usize>
where
    I: IntoIterator<Item = SnapshotRecord>,
{
    let tmp = tmp_path(path);
    match write_and_rename(path, &tmp, records) {
        Ok(n) => {
            debug!(path = %path.display(), records = n, "snapshot written");
            Ok(n)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_and_rename<I>(path: &Path, tmp: &Path, records: I) -> io::Result<usize>
where
    I: IntoIterator<Item = SnapshotRecord>,
{
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o660);
    }
    let file = options.open(tmp)?;
    let mut w = BufWriter::new(file);

    let mut written = 0;
    for record in records {
        record.write_to(&mut w)?;
        written += 1;
    }
    w.flush()?;
    w.get_ref().sync_all()?;
    fs::rename(tmp, path)?;
    Ok(written)
}

/// `<path>.tmp`, appended to the full file name rather than replacing an
/// extension, since namespace names may contain dots.
fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_snapshot;
    use tempfile::TempDir;

    fn record(nkey: &str, when: u64) -> SnapshotRecord {
        SnapshotRecord {
            nkey: nkey.into(),
            id: String::new(),
            data: None,
            when,
            count: 1,
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies");
        let records = vec![record("alien", 100), record("aliens", 200)];

        let n = write_snapshot(&path, records.clone()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(read_snapshot(&path).unwrap(), records);
    }

    #[test]
    fn no_tmp_file_survives_a_successful_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies");
        write_snapshot(&path, vec![record("alien", 1)]).unwrap();

        assert!(path.is_file());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn rewrite_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies");
        write_snapshot(&path, vec![record("old", 1), record("older", 2)]).unwrap();
        write_snapshot(&path, vec![record("new", 3)]).unwrap();

        let records = read_snapshot(&path).unwrap();
        assert_eq!(records, vec![record("new", 3)]);
    }

    #[test]
    fn failed_write_leaves_previous_snapshot_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movies");
        write_snapshot(&path, vec![record("keep", 1)]).unwrap();

        // Point the tmp file at an unwritable location to force the open
        // to fail.
        let missing_parent = dir.path().join("absent").join("movies");
        assert!(write_snapshot(&missing_parent, vec![record("x", 2)]).is_err());

        assert_eq!(read_snapshot(&path).unwrap(), vec![record("keep", 1)]);
    }

    #[test]
    fn empty_snapshot_is_valid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        assert_eq!(write_snapshot(&path, Vec::new()).unwrap(), 0);
        assert_eq!(read_snapshot(&path).unwrap(), vec![]);
    }
}

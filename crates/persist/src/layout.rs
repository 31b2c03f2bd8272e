//! Snapshot directory layout.
//!
//! A namespace named `N` lives at `<root>/<hi>/<lo>/N`, where `hi` and `lo`
//! are the two CRC-16 bytes of `N` in lowercase hex. The full 256×256 tree
//! is created up front so writers never race on `mkdir`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::crc16::shard_dirs;

/// Path resolution and maintenance of the sharded snapshot tree.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Layout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot file path for a namespace.
    pub fn namespace_path(&self, name: &str) -> PathBuf {
        let (hi, lo) = shard_dirs(name);
        self.root.join(hi).join(lo).join(name)
    }

    /// Create the root and all 256×256 shard directories, mode `0770`.
    /// Directories that already exist are fine.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        create_dir_0770(&self.root)?;
        for hi in 0..256u16 {
            let hi_dir = self.root.join(format!("{hi:02x}"));
            create_dir_0770(&hi_dir)?;
            for lo in 0..256u16 {
                create_dir_0770(&hi_dir.join(format!("{lo:02x}")))?;
            }
        }
        Ok(())
    }

    /// Enumerate the names of all persisted namespaces.
    ///
    /// In-progress `*.tmp` files are skipped; so is anything that is not a
    /// regular file two levels down.
    pub fn scan(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for hi in read_subdirs(&self.root)? {
            for lo in read_subdirs(&hi)? {
                for entry in fs::read_dir(&lo)? {
                    let entry = entry?;
                    if !entry.file_type()?.is_file() {
                        continue;
                    }
                    let name = entry.file_name();
                    let Some(name) = name.to_str() else { continue };
                    if name.ends_with(".tmp") {
                        continue;
                    }
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

fn read_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

#[cfg(unix)]
fn create_dir_0770(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    match fs::DirBuilder::new().mode(0o770).create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(not(unix))]
fn create_dir_0770(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

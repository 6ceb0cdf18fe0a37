use serde::Serialize;
use std::path::{Path, PathBuf};

/// Whether an entry is a leaf file or an aggregated directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One filesystem node with its computed size.
/// Produced by the walker once the size is final and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Full path to the file or directory
    pub path: PathBuf,

    pub kind: EntryKind,

    /// Size in bytes. For directories, the sum over all non-excluded descendants.
    pub size: u64,

    /// True if `size` is a recursive sum rather than the node's own size
    pub aggregated: bool,

    /// True if part of the subtree could not be read (size is a lower bound)
    pub partial: bool,
}

impl Entry {
    pub fn file(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size,
            aggregated: false,
            partial: false,
        }
    }

    pub fn directory(path: PathBuf, size: u64, partial: bool) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            size,
            aggregated: true,
            partial,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Last component of the path, lossily converted.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

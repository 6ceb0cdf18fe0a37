//! Containment-checked deletion of scanned entries.
//!
//! Every call is checked against the scan root before anything else happens:
//! a path outside the root (after resolving symlinks in its parent) is a
//! wiring bug and fails loudly with `PathContainment`. Inside the root,
//! deletion only proceeds when the caller has confirmed it.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{DeletionError, DiskfaceError, Result};
use crate::scanner::{Entry, RankedResult, ScanReport};

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeletionStatus {
    /// Entry removed completely.
    Deleted,
    /// Nothing was touched.
    Skipped { reason: String },
    /// Removal was attempted and at least part of it failed.
    Failed { reason: String },
}

/// Result of one deletion request.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    pub entry: Entry,
    /// Bytes freed. The precomputed entry size on success, what was actually
    /// removed on partial failure.
    pub freed: u64,
    pub status: DeletionStatus,
}

impl DeletionOutcome {
    fn skipped(entry: &Entry, reason: &str) -> Self {
        Self {
            entry: entry.clone(),
            freed: 0,
            status: DeletionStatus::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.status == DeletionStatus::Deleted
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, DeletionStatus::Failed { .. })
    }
}

/// Bytes removed and errors hit while removing one node.
#[derive(Debug, Default)]
struct Removal {
    freed: u64,
    errors: Vec<DeletionError>,
}

impl Removal {
    fn reason(&self) -> String {
        match self.errors.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
        }
    }
}

/// Removes entries that lie strictly below a scan root.
#[derive(Debug, Clone)]
pub struct DeletionController {
    root: PathBuf,
}

impl DeletionController {
    /// Create a controller scoped to `root` (canonicalized).
    pub fn new(root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| DiskfaceError::io(root, e))?;
        Ok(Self { root })
    }

    /// Controller scoped to the root of a finished scan.
    pub fn for_report(report: &ScanReport) -> Self {
        Self {
            root: report.root.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Delete `entry` from disk if `confirmed`.
    ///
    /// Returns `Err(PathContainment)` if the entry is not inside the root; all
    /// other problems are reported in the outcome's status.
    pub fn delete(&self, entry: &Entry, confirmed: bool) -> Result<DeletionOutcome> {
        let target = self.contain(&entry.path)?;

        if !confirmed {
            return Ok(DeletionOutcome::skipped(entry, "not confirmed"));
        }

        let metadata = match fs::symlink_metadata(&target) {
            Ok(m) => m,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %target.display(), "Skipping, no longer exists");
                return Ok(DeletionOutcome::skipped(entry, "no longer exists"));
            }
            Err(err) => {
                return Ok(DeletionOutcome {
                    entry: entry.clone(),
                    freed: 0,
                    status: DeletionStatus::Failed {
                        reason: err.to_string(),
                    },
                });
            }
        };

        let removal = if metadata.is_dir() {
            remove_tree(&target)
        } else {
            remove_single(&target, metadata.len())
        };

        let outcome = if removal.errors.is_empty() {
            tracing::info!(path = %target.display(), freed = entry.size, "Deleted");
            DeletionOutcome {
                entry: entry.clone(),
                freed: entry.size,
                status: DeletionStatus::Deleted,
            }
        } else {
            let reason = removal.reason();
            tracing::warn!(path = %target.display(), freed = removal.freed, %reason, "Deletion incomplete");
            DeletionOutcome {
                entry: entry.clone(),
                freed: removal.freed,
                status: DeletionStatus::Failed { reason },
            }
        };

        Ok(outcome)
    }

    /// Delete the entry at 1-based `index` of a ranked result.
    pub fn delete_selected(
        &self,
        results: &RankedResult,
        index: usize,
        confirmed: bool,
    ) -> Result<DeletionOutcome> {
        let entry = results.get(index).ok_or_else(|| {
            DiskfaceError::InvalidSelection(format!(
                "{} is out of range (1-{})",
                index,
                results.len()
            ))
        })?;
        self.delete(entry, confirmed)
    }

    /// Resolve `path` and make sure it sits strictly below the root.
    ///
    /// The parent is canonicalized but the final component is not, so a
    /// symlink inside the root is removed as a link.
    fn contain(&self, path: &Path) -> Result<PathBuf> {
        let violation = || {
            tracing::error!(
                path = %path.display(),
                root = %self.root.display(),
                "Deletion outside scan root refused"
            );
            DiskfaceError::PathContainment {
                path: path.to_path_buf(),
                root: self.root.clone(),
            }
        };

        if !path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
            return Err(violation());
        }
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return Err(violation());
        };

        let parent = parent
            .canonicalize()
            .unwrap_or_else(|_| parent.to_path_buf());
        let resolved = parent.join(name);

        if resolved == self.root || !resolved.starts_with(&self.root) {
            return Err(violation());
        }
        Ok(resolved)
    }
}

fn remove_single(path: &Path, len: u64) -> Removal {
    match fs::remove_file(path) {
        Ok(()) => Removal {
            freed: len,
            errors: Vec::new(),
        },
        Err(source) => Removal {
            freed: 0,
            errors: vec![DeletionError {
                path: path.to_path_buf(),
                source,
            }],
        },
    }
}

/// Contents-first removal that keeps going past individual failures.
fn remove_tree(path: &Path) -> Removal {
    let mut removal = Removal::default();

    for item in WalkDir::new(path).contents_first(true).follow_links(false) {
        let entry = match item {
            Ok(e) => e,
            Err(err) => {
                let failed = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| path.to_path_buf());
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
                removal.errors.push(DeletionError {
                    path: failed,
                    source,
                });
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if let Err(source) = fs::remove_dir(entry.path()) {
                removal.errors.push(DeletionError {
                    path: entry.path().to_path_buf(),
                    source,
                });
            }
        } else {
            let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
            match fs::remove_file(entry.path()) {
                Ok(()) => removal.freed += len,
                Err(source) => removal.errors.push(DeletionError {
                    path: entry.path().to_path_buf(),
                    source,
                }),
            }
        }
    }

    removal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ScanConfig, ScanEngine};
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir_all(target.join("debug")).unwrap();
        fs::write(target.join("debug/app.bin"), "x".repeat(1000)).unwrap();
        fs::write(target.join("notes.txt"), "x".repeat(200)).unwrap();
        fs::write(tmp.path().join("single.log"), "x".repeat(50)).unwrap();
        tmp
    }

    fn controller(tmp: &TempDir) -> DeletionController {
        DeletionController::new(tmp.path()).unwrap()
    }

    fn entry_in(tmp: &TempDir, rel: &str, size: u64, dir: bool) -> Entry {
        let path = tmp.path().canonicalize().unwrap().join(rel);
        if dir {
            Entry::directory(path, size, false)
        } else {
            Entry::file(path, size)
        }
    }

    #[test]
    fn test_unconfirmed_is_skipped() {
        let tmp = create_tree();
        let entry = entry_in(&tmp, "target", 1200, true);

        let outcome = controller(&tmp).delete(&entry, false).unwrap();

        assert!(matches!(outcome.status, DeletionStatus::Skipped { .. }));
        assert_eq!(outcome.freed, 0);
        assert!(tmp.path().join("target").exists());
    }

    #[test]
    fn test_delete_directory_recursively() {
        let tmp = create_tree();
        let entry = entry_in(&tmp, "target", 1200, true);

        let outcome = controller(&tmp).delete(&entry, true).unwrap();

        assert!(outcome.is_deleted());
        assert_eq!(outcome.freed, 1200);
        assert!(!tmp.path().join("target").exists());
        assert!(tmp.path().join("single.log").exists());
    }

    #[test]
    fn test_delete_single_file_uses_entry_size() {
        let tmp = create_tree();
        let entry = entry_in(&tmp, "single.log", 4096, false);

        let outcome = controller(&tmp).delete(&entry, true).unwrap();

        assert!(outcome.is_deleted());
        assert_eq!(outcome.freed, 4096);
        assert!(!tmp.path().join("single.log").exists());
    }

    #[test]
    fn test_missing_entry_is_skipped() {
        let tmp = create_tree();
        let entry = entry_in(&tmp, "gone", 10, false);

        let outcome = controller(&tmp).delete(&entry, true).unwrap();

        assert_eq!(
            outcome.status,
            DeletionStatus::Skipped {
                reason: "no longer exists".to_string()
            }
        );
    }

    #[test]
    fn test_outside_root_is_refused() {
        let tmp = create_tree();
        let other = TempDir::new().unwrap();
        let victim = other.path().join("victim.txt");
        fs::write(&victim, "keep me").unwrap();

        let entry = Entry::file(victim.clone(), 7);
        let result = controller(&tmp).delete(&entry, true);

        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
        assert!(victim.exists());
    }

    #[test]
    fn test_refused_even_when_unconfirmed() {
        let tmp = create_tree();
        let entry = Entry::file(PathBuf::from("/etc/hostname"), 1);
        let result = controller(&tmp).delete(&entry, false);
        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
    }

    #[test]
    fn test_root_itself_is_refused() {
        let tmp = create_tree();
        let root = tmp.path().canonicalize().unwrap();
        let entry = Entry::directory(root.clone(), 1250, false);

        let result = controller(&tmp).delete(&entry, true);

        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
        assert!(root.exists());
    }

    #[test]
    fn test_parent_dir_components_are_refused() {
        let tmp = create_tree();
        let sneaky = tmp.path().join("target/../../escape");
        let result = controller(&tmp).delete(&Entry::file(sneaky, 1), true);
        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
    }

    #[test]
    fn test_symlinked_parent_escaping_root_is_refused() {
        let tmp = create_tree();
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("data"), "outside").unwrap();
        std::os::unix::fs::symlink(other.path(), tmp.path().join("portal")).unwrap();

        let entry = entry_in(&tmp, "portal/data", 7, false);
        let result = controller(&tmp).delete(&entry, true);

        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
        assert!(other.path().join("data").exists());
    }

    #[test]
    fn test_symlink_is_removed_as_link() {
        let tmp = create_tree();
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("data"), "outside").unwrap();
        std::os::unix::fs::symlink(other.path(), tmp.path().join("portal")).unwrap();

        let entry = entry_in(&tmp, "portal", 0, false);
        let outcome = controller(&tmp).delete(&entry, true).unwrap();

        assert!(outcome.is_deleted());
        assert!(!tmp.path().join("portal").exists());
        assert!(other.path().join("data").exists());
    }

    #[test]
    fn test_relative_path_is_refused() {
        let tmp = create_tree();
        let result = controller(&tmp).delete(&Entry::file(PathBuf::from("target"), 1), true);
        assert!(matches!(result, Err(DiskfaceError::PathContainment { .. })));
    }

    #[test]
    fn test_partial_failure_reports_removed_bytes() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = create_tree();
        let locked = tmp.path().join("target/debug");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Root ignores permission bits; nothing to observe in that case
        let probe = locked.join("probe");
        if fs::write(&probe, "").is_ok() {
            fs::remove_file(&probe).unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let entry = entry_in(&tmp, "target", 1200, true);
        let outcome = controller(&tmp).delete(&entry, true).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(outcome.is_failed());
        assert_eq!(outcome.freed, 200);
        assert!(locked.join("app.bin").exists());
        assert!(!tmp.path().join("target/notes.txt").exists());
    }

    #[test]
    fn test_delete_selected_from_scan() {
        let tmp = create_tree();
        let report = ScanEngine::new(ScanConfig::default())
            .scan(tmp.path())
            .unwrap();
        let controller = DeletionController::for_report(&report);

        let outcome = controller.delete_selected(&report.results, 1, true).unwrap();
        assert!(outcome.is_deleted());
        assert_eq!(outcome.entry.name(), "target");
        assert_eq!(outcome.freed, 1200);
        assert!(!tmp.path().join("target").exists());

        let err = controller.delete_selected(&report.results, 99, true);
        assert!(matches!(err, Err(DiskfaceError::InvalidSelection(_))));
    }
}

use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::error::{DiskfaceError, Result, TraversalError};

use super::entry::Entry;
use super::matcher::ExclusionMatcher;
use super::options::ScanConfig;

/// Counters and recovered errors from one walk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WalkStats {
    /// Files (and other non-directories) counted toward totals
    pub files: u64,
    /// Directories descended into
    pub directories: u64,
    /// Entries skipped by dot-name, pattern or filesystem boundary
    pub excluded: u64,
    /// Aggregated size of the root
    pub total_size: u64,
    pub errors: Vec<TraversalError>,
    /// True if the walk stopped early on request
    pub cancelled: bool,
}

/// Running total for one directory.
#[derive(Debug, Clone, Copy, Default)]
struct DirTotal {
    size: u64,
    partial: bool,
}

struct WalkState<F> {
    root: PathBuf,
    root_dev: Option<u64>,
    stats: WalkStats,
    on_entry: F,
}

impl<F> WalkState<F> {
    fn record_error(&mut self, path: &Path, err: &std::io::Error) {
        tracing::debug!(path = %path.display(), error = %err, "Skipping unreadable entry");
        self.stats.errors.push(TraversalError {
            path: path.to_path_buf(),
            reason: err.to_string(),
        });
    }
}

/// Depth-first, post-order directory walker.
///
/// Directory sizes are finalized only after every child has been visited, and
/// each finalized entry that passes the size and depth filters is handed to
/// the callback. Only the listing of the directories on the current path is
/// kept in memory.
pub struct TreeWalker<'a> {
    config: &'a ScanConfig,
    matcher: &'a ExclusionMatcher,
    cancel: Option<&'a dyn Fn() -> bool>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a ScanConfig, matcher: &'a ExclusionMatcher) -> Self {
        Self {
            config,
            matcher,
            cancel: None,
        }
    }

    /// Check run before each sibling visit; returning true stops the walk.
    pub fn with_cancel(mut self, check: &'a dyn Fn() -> bool) -> Self {
        self.cancel = Some(check);
        self
    }

    /// Walk `root`, calling `on_entry` for every finalized entry below it.
    ///
    /// Fails only if the root itself is missing or not a directory. Every
    /// other I/O problem is recorded in [`WalkStats::errors`].
    pub fn walk<F>(&self, root: &Path, on_entry: F) -> Result<WalkStats>
    where
        F: FnMut(Entry),
    {
        let root = root
            .canonicalize()
            .map_err(|e| DiskfaceError::io(root, e))?;

        let metadata = fs::metadata(&root).map_err(|e| DiskfaceError::io(&root, e))?;
        if !metadata.is_dir() {
            return Err(DiskfaceError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut state = WalkState {
            root: root.clone(),
            root_dev: self.config.one_file_system.then(|| metadata.dev()),
            stats: WalkStats::default(),
            on_entry,
        };

        let total = self.visit_dir(&root, 0, &mut state);
        state.stats.total_size = total.size;

        tracing::debug!(
            root = %root.display(),
            files = state.stats.files,
            directories = state.stats.directories,
            errors = state.stats.errors.len(),
            cancelled = state.stats.cancelled,
            "Walk finished"
        );

        Ok(state.stats)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|check| check())
    }

    /// Dot check first, then the patterns against the name, the absolute
    /// path and the path relative to the scan root.
    fn is_excluded(&self, path: &Path, name: &OsString, root: &Path) -> bool {
        if self.config.ignore_dot_entries && name.to_string_lossy().starts_with('.') {
            return true;
        }
        self.matcher.matches(path) || self.matcher.matches_within(path, root)
    }

    fn visit_dir<F>(&self, dir: &Path, depth: usize, state: &mut WalkState<F>) -> DirTotal
    where
        F: FnMut(Entry),
    {
        let read_dir = match fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(err) => {
                state.record_error(dir, &err);
                return DirTotal {
                    size: 0,
                    partial: true,
                };
            }
        };

        let mut total = DirTotal::default();
        let mut children = Vec::new();
        for item in read_dir {
            match item {
                Ok(child) => children.push(child),
                Err(err) => {
                    state.record_error(dir, &err);
                    total.partial = true;
                }
            }
        }
        children.sort_by_key(|c| c.file_name());

        let child_depth = depth + 1;
        for child in children {
            if state.stats.cancelled || self.is_cancelled() {
                state.stats.cancelled = true;
                break;
            }

            let path = child.path();
            if self.is_excluded(&path, &child.file_name(), &state.root) {
                state.stats.excluded += 1;
                continue;
            }

            // Never follow symlinks: lstat the entry itself
            let metadata = match fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(err) => {
                    state.record_error(&path, &err);
                    total.partial = true;
                    continue;
                }
            };

            if metadata.is_dir() {
                if state.root_dev.is_some_and(|dev| dev != metadata.dev()) {
                    state.stats.excluded += 1;
                    continue;
                }

                state.stats.directories += 1;
                let sub = self.visit_dir(&path, child_depth, state);
                if state.stats.cancelled {
                    break;
                }

                total.size += sub.size;
                total.partial |= sub.partial;
                self.finalize(Entry::directory(path, sub.size, sub.partial), child_depth, state);
            } else {
                state.stats.files += 1;
                let size = self.config.size_metric.measure(&metadata);
                total.size += size;
                self.finalize(Entry::file(path, size), child_depth, state);
            }
        }

        total
    }

    fn finalize<F>(&self, entry: Entry, depth: usize, state: &mut WalkState<F>)
    where
        F: FnMut(Entry),
    {
        if entry.size < self.config.min_size {
            return;
        }
        if self.config.scan_root_only && depth > 1 {
            return;
        }
        if self.config.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        (state.on_entry)(entry);
    }
}

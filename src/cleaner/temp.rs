//! Pattern-driven cleanup of temporary files.
//!
//! Absolute patterns (after `~` expansion) are expanded with `glob` and each
//! hit is contained to the pattern's literal base directory. Relative patterns
//! are matched by name or root-relative path while walking every configured
//! root. All removals go through [`DeletionController`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cleaner::deletion::{DeletionController, DeletionOutcome};
use crate::scanner::{Entry, ExclusionMatcher};

/// Bytes freed per pattern plus every individual outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TempCleanSummary {
    /// Every requested pattern has a key, even if nothing matched
    pub freed: BTreeMap<String, u64>,
    pub outcomes: Vec<DeletionOutcome>,
}

impl TempCleanSummary {
    pub fn total_freed(&self) -> u64 {
        self.freed.values().sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// Patterns ordered by bytes freed, largest first.
    pub fn by_size(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<(&str, u64)> =
            self.freed.iter().map(|(p, b)| (p.as_str(), *b)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// Entries matched by one pattern, and the directory they must stay inside.
struct Targets {
    scope: PathBuf,
    entries: Vec<Entry>,
}

/// Removes files matching temp patterns.
#[derive(Debug, Clone)]
pub struct TempCleaner {
    roots: Vec<PathBuf>,
    dry_run: bool,
}

impl TempCleaner {
    /// Relative patterns are searched for under each of `roots`.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            dry_run: false,
        }
    }

    /// Search relative patterns under the system temp directory.
    pub fn with_default_roots() -> Self {
        Self::new(vec![std::env::temp_dir()])
    }

    /// Report what would be freed without removing anything.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Clean every pattern and report bytes freed per pattern.
    pub fn clean<S: AsRef<str>>(&self, patterns: &[S]) -> TempCleanSummary {
        let mut summary = TempCleanSummary::default();

        for raw in patterns {
            let pattern = raw.as_ref();
            let freed = self.clean_pattern(pattern, &mut summary.outcomes);
            *summary.freed.entry(pattern.to_string()).or_insert(0) += freed;
        }

        tracing::info!(
            patterns = summary.freed.len(),
            freed = summary.total_freed(),
            dry_run = self.dry_run,
            "Temp cleanup complete"
        );
        summary
    }

    fn clean_pattern(&self, pattern: &str, outcomes: &mut Vec<DeletionOutcome>) -> u64 {
        let expanded = expand_home(pattern);
        let targets: Vec<Targets> = if Path::new(&expanded).is_absolute() {
            resolve_absolute(&expanded).into_iter().collect()
        } else {
            self.resolve_relative(&expanded)
        };

        let mut freed = 0;
        for Targets { scope, entries } in targets {
            if entries.is_empty() {
                continue;
            }
            tracing::debug!(pattern, scope = %scope.display(), matches = entries.len(), "Resolved temp pattern");

            if self.dry_run {
                freed += entries.iter().map(|e| e.size).sum::<u64>();
                continue;
            }

            let controller = match DeletionController::new(&scope) {
                Ok(c) => c,
                Err(err) => {
                    tracing::warn!(pattern, %err, "Cannot clean pattern");
                    continue;
                }
            };

            for entry in entries {
                match controller.delete(&entry, true) {
                    Ok(outcome) => {
                        freed += outcome.freed;
                        outcomes.push(outcome);
                    }
                    Err(err) => tracing::error!(pattern, %err, "Refusing temp removal"),
                }
            }
        }

        freed
    }

    fn resolve_relative(&self, pattern: &str) -> Vec<Targets> {
        let matcher = ExclusionMatcher::compile(&[pattern]);
        if matcher.is_empty() {
            return Vec::new();
        }

        self.roots
            .iter()
            .map(|root| {
                let mut entries = Vec::new();
                let mut walker = WalkDir::new(root).min_depth(1).follow_links(false).into_iter();

                while let Some(item) = walker.next() {
                    let dent = match item {
                        Ok(d) => d,
                        Err(err) => {
                            tracing::debug!(%err, "Skipping unreadable temp entry");
                            continue;
                        }
                    };
                    if !matcher.matches_within(dent.path(), root) {
                        continue;
                    }
                    if dent.file_type().is_dir() {
                        walker.skip_current_dir();
                    }
                    if let Some(entry) = measure(dent.path()) {
                        entries.push(entry);
                    }
                }

                Targets {
                    scope: root.clone(),
                    entries,
                }
            })
            .collect()
    }
}

fn resolve_absolute(pattern: &str) -> Option<Targets> {
    let scope = literal_base(Path::new(pattern));

    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(err) => {
            tracing::warn!(pattern, %err, "Skipping invalid temp pattern");
            return None;
        }
    };

    let mut hits: Vec<PathBuf> = paths
        .filter_map(|item| match item {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::debug!(%err, "Skipping unreadable glob match");
                None
            }
        })
        .filter(|path| path != &scope)
        .collect();
    hits.sort();

    // A hit nested under an earlier directory hit is removed with it
    let mut entries: Vec<Entry> = Vec::new();
    for path in hits {
        let covered = entries
            .iter()
            .any(|kept| kept.is_dir() && path.starts_with(&kept.path));
        if covered {
            continue;
        }
        if let Some(entry) = measure(&path) {
            entries.push(entry);
        }
    }

    Some(Targets { scope, entries })
}

/// Leading components of `pattern` that contain no wildcard. A pattern with
/// no wildcard at all is scoped to its parent.
fn literal_base(pattern: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    let mut wildcard = false;

    for component in pattern.components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[']) {
            wildcard = true;
            break;
        }
        base.push(component);
    }

    if !wildcard {
        base.pop();
    }
    base
}

fn expand_home(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return pattern.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => pattern.to_string(),
    }
}

/// Size an entry the way it will be removed: links by their own length,
/// directories by the sum of everything beneath them.
fn measure(path: &Path) -> Option<Entry> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if metadata.is_dir() {
        Some(Entry::directory(path.to_path_buf(), dir_size(path), false))
    } else {
        Some(Entry::file(path.to_path_buf(), metadata.len()))
    }
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

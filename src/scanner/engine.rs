use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{DiskfaceError, Result};

use super::collector::{RankedResult, TopNCollector};
use super::entry::{Entry, EntryKind};
use super::matcher::ExclusionMatcher;
use super::options::{ScanConfig, ScanMode};
use super::walker::{TreeWalker, WalkStats};

/// Outcome of one scan pass.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Canonical root that was scanned; deletions are contained to it
    pub root: PathBuf,
    pub mode: ScanMode,
    pub results: RankedResult,
    pub stats: WalkStats,
}

/// Runs walker, matcher and collector as a single pass over a tree.
#[derive(Debug, Clone)]
pub struct ScanEngine {
    config: ScanConfig,
    matcher: ExclusionMatcher,
}

impl ScanEngine {
    /// Build an engine; exclusion patterns are compiled here, once.
    pub fn new(config: ScanConfig) -> Self {
        let matcher = ExclusionMatcher::compile(&config.patterns);
        Self { config, matcher }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn matcher(&self) -> &ExclusionMatcher {
        &self.matcher
    }

    pub fn scan(&self, root: &Path) -> Result<ScanReport> {
        self.scan_with(root, |_| {}, || false)
    }

    /// Scan with a progress hook and a cooperative cancellation check.
    ///
    /// `progress` sees every entry offered to the ranking, in traversal order.
    /// `cancel` is polled between sibling visits.
    pub fn scan_with<P, C>(&self, root: &Path, mut progress: P, cancel: C) -> Result<ScanReport>
    where
        P: FnMut(&Entry),
        C: Fn() -> bool,
    {
        let root = root
            .canonicalize()
            .map_err(|e| DiskfaceError::io(root, e))?;

        let wanted = match self.config.mode {
            ScanMode::Directories => EntryKind::Directory,
            ScanMode::Files => EntryKind::File,
        };

        let mut collector = TopNCollector::new(self.config.top_n);
        let stats = TreeWalker::new(&self.config, &self.matcher)
            .with_cancel(&cancel)
            .walk(&root, |entry| {
                if entry.kind == wanted {
                    progress(&entry);
                    collector.consider(entry);
                }
            })?;

        tracing::info!(
            root = %root.display(),
            mode = ?self.config.mode,
            ranked = collector.len(),
            candidates = collector.seen(),
            "Scan complete"
        );

        Ok(ScanReport {
            root,
            mode: self.config.mode,
            results: collector.results(),
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    const MB: usize = 1024 * 1024;

    fn write_file(path: &Path, len: usize) {
        File::create(path)
            .unwrap()
            .write_all(&vec![b'x'; len])
            .unwrap();
    }

    /// Sparse file: apparent size without writing the bytes
    fn sized_file(path: &Path, len: usize) {
        File::create(path).unwrap().set_len(len as u64).unwrap();
    }

    #[test]
    fn test_excluded_directory_scenario() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        sized_file(&dir.path().join("a/f1"), 50 * MB);
        sized_file(&dir.path().join("b/f2"), 150 * MB);

        let config = ScanConfig::new()
            .with_patterns(vec!["b".to_string()])
            .with_top_n(20)
            .with_mode(ScanMode::Directories);
        let report = ScanEngine::new(config).scan(dir.path()).unwrap();

        assert_eq!(report.results.len(), 1);
        let a = report.results.get(1).unwrap();
        assert_eq!(a.name(), "a");
        assert_eq!(a.size, 50 * MB as u64);
        assert_eq!(report.stats.total_size, 50 * MB as u64);
    }

    #[test]
    fn test_directories_mode_ranks_only_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("small")).unwrap();
        write_file(&dir.path().join("small/x"), 10);
        write_file(&dir.path().join("huge.bin"), 5000);

        let report = ScanEngine::new(ScanConfig::default())
            .scan(dir.path())
            .unwrap();

        assert!(report.results.iter().all(|e| e.is_dir()));
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn test_files_mode_ranks_only_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();
        write_file(&dir.path().join("x/y/deep.bin"), 300);
        write_file(&dir.path().join("x/mid.bin"), 200);
        write_file(&dir.path().join("top.bin"), 100);

        let config = ScanConfig::new().with_mode(ScanMode::Files);
        let report = ScanEngine::new(config).scan(dir.path()).unwrap();

        let names: Vec<String> = report.results.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["deep.bin", "mid.bin", "top.bin"]);
        assert_eq!(report.mode, ScanMode::Files);
    }

    #[test]
    fn test_results_bounded_and_sorted() {
        let dir = TempDir::new().unwrap();
        for i in 0..10 {
            let sub = dir.path().join(format!("dir{}", i));
            fs::create_dir(&sub).unwrap();
            write_file(&sub.join("data"), (i + 1) * 100);
        }

        let config = ScanConfig::new().with_top_n(3);
        let report = ScanEngine::new(config).scan(dir.path()).unwrap();

        let sizes: Vec<u64> = report.results.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![1000, 900, 800]);
    }

    #[test]
    fn test_parent_size_equals_sum_of_children() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("p/c1")).unwrap();
        fs::create_dir_all(dir.path().join("p/c2")).unwrap();
        write_file(&dir.path().join("p/c1/a"), 123);
        write_file(&dir.path().join("p/c2/b"), 456);
        write_file(&dir.path().join("p/own"), 7);

        let report = ScanEngine::new(ScanConfig::default())
            .scan(dir.path())
            .unwrap();
        let size_of = |name: &str| {
            report
                .results
                .iter()
                .find(|e| e.name() == name)
                .map(|e| e.size)
                .unwrap()
        };
        assert_eq!(size_of("p"), size_of("c1") + size_of("c2") + 7);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = TempDir::new().unwrap();
        for name in ["one", "two", "three"] {
            fs::create_dir(dir.path().join(name)).unwrap();
            write_file(&dir.path().join(name).join("f"), 64);
        }

        let engine = ScanEngine::new(ScanConfig::default());
        let first = engine.scan(dir.path()).unwrap();
        let second = engine.scan(dir.path()).unwrap();
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn test_progress_sees_ranked_candidates() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();
        write_file(&dir.path().join("d/f"), 10);

        let mut seen = Vec::new();
        let report = ScanEngine::new(ScanConfig::default())
            .scan_with(dir.path(), |e| seen.push(e.name()), || false)
            .unwrap();

        assert_eq!(seen, vec!["d"]);
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn test_cancelled_scan_still_returns_report() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();

        let report = ScanEngine::new(ScanConfig::default())
            .scan_with(dir.path(), |_| {}, || true)
            .unwrap();

        assert!(report.stats.cancelled);
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_report_root_is_canonical() {
        let dir = TempDir::new().unwrap();
        let report = ScanEngine::new(ScanConfig::default())
            .scan(dir.path())
            .unwrap();
        assert_eq!(report.root, dir.path().canonicalize().unwrap());
    }
}

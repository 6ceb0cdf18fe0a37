use serde::{Deserialize, Serialize};
use std::fs::Metadata;

use super::size::{apparent_size, disk_usage};

/// Which kind of entry gets ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Rank directories by aggregated size; files only feed the totals
    #[default]
    Directories,
    /// Rank individual files; directories are traversed but never ranked
    Files,
}

impl ScanMode {
    pub fn label(&self) -> &'static str {
        match self {
            ScanMode::Directories => "Directories",
            ScanMode::Files => "Files",
        }
    }
}

/// How the size of a single file is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeMetric {
    /// Content length
    #[default]
    Apparent,
    /// Allocated blocks
    DiskUsage,
}

impl SizeMetric {
    pub fn measure(&self, metadata: &Metadata) -> u64 {
        match self {
            SizeMetric::Apparent => apparent_size(metadata),
            SizeMetric::DiskUsage => disk_usage(metadata),
        }
    }
}

/// Linux virtual filesystem paths that should be excluded by default.
/// These can report incorrect/huge sizes and cause scanning issues.
pub const SYSTEM_EXCLUSIONS: &[&str] = &["/proc", "/sys", "/dev", "/run"];

/// Settings for one scan. Built once, immutable while the scan runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Entries smaller than this are not reported (they still count toward parents)
    pub min_size: u64,

    /// Maximum number of ranked entries
    pub top_n: usize,

    pub mode: ScanMode,

    /// Only report immediate children of the root
    pub scan_root_only: bool,

    /// Deepest level reported (root's children are level 1); sizes still
    /// aggregate the whole subtree
    pub max_depth: Option<usize>,

    /// Skip any entry whose name starts with a dot
    pub ignore_dot_entries: bool,

    /// Stay on the same filesystem (don't cross mount points)
    pub one_file_system: bool,

    pub size_metric: SizeMetric,

    /// Exclusion patterns (glob)
    pub patterns: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            top_n: 20,
            mode: ScanMode::Directories,
            scan_root_only: false,
            max_depth: None,
            ignore_dot_entries: true,
            one_file_system: false,
            size_metric: SizeMetric::Apparent,
            patterns: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Create a new ScanConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size = bytes;
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_root_only(mut self, enabled: bool) -> Self {
        self.scan_root_only = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether entries starting with `.` are skipped
    pub fn with_ignore_dot_entries(mut self, ignore: bool) -> Self {
        self.ignore_dot_entries = ignore;
        self
    }

    pub fn with_one_file_system(mut self, enabled: bool) -> Self {
        self.one_file_system = enabled;
        self
    }

    pub fn with_size_metric(mut self, metric: SizeMetric) -> Self {
        self.size_metric = metric;
        self
    }

    /// Set exclusion patterns
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }
}

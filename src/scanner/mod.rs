mod collector;
mod engine;
mod entry;
mod formatter;
mod matcher;
mod options;
mod size;
mod walker;

pub use collector::{RankedResult, TopNCollector};
pub use engine::{ScanEngine, ScanReport};
pub use entry::{Entry, EntryKind};
pub use formatter::{format_json, format_summary, format_table, FormatOptions};
pub use matcher::ExclusionMatcher;
pub use options::{ScanConfig, ScanMode, SizeMetric, SYSTEM_EXCLUSIONS};
pub use size::{format_size, parse_size, parse_size_arg, share};
pub use walker::{TreeWalker, WalkStats};

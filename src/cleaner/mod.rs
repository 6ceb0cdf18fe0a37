//! Deletion of scanned entries and cleanup of temporary files.
//!
//! This module provides:
//! - Containment-checked deletion of ranked entries
//! - Pattern-driven temp file cleanup
//! - Parsing of interactive selections

mod deletion;
mod selection;
mod temp;

pub use deletion::{DeletionController, DeletionOutcome, DeletionStatus};
pub use selection::parse_selection;
pub use temp::{TempCleanSummary, TempCleaner};

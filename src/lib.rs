//! diskface - a disk usage analyzer
//!
//! This crate provides functionality for:
//! - Ranking the largest directories or files under a root in one pass
//! - Glob-based exclusion of paths from scans
//! - Containment-checked deletion of scanned entries
//! - Pattern-driven cleanup of temporary files

pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod scanner;
pub mod signals;

// Re-export commonly used types
pub use config::Config;
pub use error::{DiskfaceError, Result};

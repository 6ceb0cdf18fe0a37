//! Subcommand implementations for the `diskface` binary.

pub mod clean;
pub mod exclude;
pub mod scan;
pub mod settings;

use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cleaner::{DeletionOutcome, DeletionStatus};
use crate::config::Config;
use crate::scanner::format_size;

/// File edited by commands that persist settings: `--config` or the default location.
pub(crate) fn resolve_config_path(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path().context("Cannot determine config directory"),
    }
}

/// A missing file starts from defaults.
pub(crate) fn load_or_default(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Ok(Config::load_from(path)?)
    } else {
        Ok(Config::default())
    }
}

/// Ask a yes/no question on stdout. Anything but "y"/"yes" is a no, as is EOF.
pub(crate) fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

pub(crate) fn print_outcome(outcome: &DeletionOutcome) {
    let path = outcome.entry.path.display();
    match &outcome.status {
        DeletionStatus::Deleted => {
            println!("  Deleted  {} ({})", path, format_size(outcome.freed));
        }
        DeletionStatus::Skipped { reason } => {
            println!("  Skipped  {} ({})", path, reason);
        }
        DeletionStatus::Failed { reason } => {
            eprintln!("  Failed   {}: {}", path, reason);
        }
    }
}

pub(crate) fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

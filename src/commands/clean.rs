//! Clean command implementation.

use anyhow::Result;
use std::path::PathBuf;

use crate::cleaner::{DeletionStatus, TempCleanSummary, TempCleaner};
use crate::cli::CleanArgs;
use crate::commands::{confirm, plural};
use crate::config::Config;
use crate::scanner::format_size;

/// Run the clean command.
pub fn run(args: CleanArgs, config: &Config) -> Result<()> {
    let patterns = if args.pattern.is_empty() {
        config.temp.patterns.clone()
    } else {
        args.pattern.clone()
    };

    if patterns.is_empty() {
        println!("No temp patterns configured.");
        return Ok(());
    }

    let roots = resolve_roots(&args.root, config);

    if !args.dry_run && !nix::unistd::geteuid().is_root() {
        eprintln!("Warning: not running as root; some files may not be removable.");
    }

    println!("Patterns:");
    for pattern in &patterns {
        println!("  {}", pattern);
    }
    println!(
        "Relative patterns are searched under: {}",
        roots
            .iter()
            .map(|r| r.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if !args.force && !args.dry_run && !confirm("\nRemove everything matching these patterns?")? {
        println!("Aborted.");
        return Ok(());
    }

    let cleaner = TempCleaner::new(roots).with_dry_run(args.dry_run);
    let summary = cleaner.clean(&patterns);

    let failed = print_summary(&summary, args.dry_run);
    if failed > 0 {
        std::process::exit(5); // Partial failure
    }

    Ok(())
}

/// Remove the configured temp patterns without prompting (`scan --clean`).
///
/// Failures are reported but do not stop the scan that follows.
pub fn clean_before_scan(config: &Config) {
    if config.temp.patterns.is_empty() {
        println!("No temp patterns configured.");
        return;
    }

    let cleaner = TempCleaner::new(resolve_roots(&[], config));
    let summary = cleaner.clean(&config.temp.patterns);
    print_summary(&summary, false);
    println!();
}

/// Per-pattern freed sizes, then any removal errors. Returns the failure count.
fn print_summary(summary: &TempCleanSummary, dry_run: bool) -> usize {
    if dry_run {
        println!("\n[DRY RUN] Would free:");
    } else {
        println!("\nFreed:");
    }
    for (pattern, bytes) in summary.by_size() {
        println!("  {:>10}  {}", format_size(bytes), pattern);
    }
    println!("  {:>10}  total", format_size(summary.total_freed()));

    let failures: Vec<_> = summary.failures().collect();
    for outcome in &failures {
        if let DeletionStatus::Failed { reason } = &outcome.status {
            eprintln!("  Error removing {}: {}", outcome.entry.path.display(), reason);
        }
    }
    if !failures.is_empty() {
        eprintln!("{} could not be fully removed", plural(failures.len(), "entry", "entries"));
    }
    failures.len()
}

/// `--root` wins, then configured roots, then the system temp directory.
fn resolve_roots(cli_roots: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    if !cli_roots.is_empty() {
        cli_roots.to_vec()
    } else if !config.temp.roots.is_empty() {
        config.temp.roots.clone()
    } else {
        TempCleaner::with_default_roots().roots().to_vec()
    }
}

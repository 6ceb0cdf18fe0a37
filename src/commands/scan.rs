//! Scan command implementation

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::cleaner::{parse_selection, DeletionController};
use crate::cli::ScanArgs;
use crate::commands::{clean, confirm, plural, print_outcome};
use crate::config::{Config, ScanOverrides};
use crate::scanner::{
    format_json, format_size, format_summary, format_table, FormatOptions, ScanEngine, ScanMode,
    ScanReport,
};
use crate::signals;

/// Candidates between spinner updates
const PROGRESS_EVERY: u64 = 512;

impl From<&ScanArgs> for ScanOverrides {
    fn from(args: &ScanArgs) -> Self {
        let mode = if args.files {
            Some(ScanMode::Files)
        } else if args.dirs {
            Some(ScanMode::Directories)
        } else {
            None
        };

        ScanOverrides {
            top: args.top.map(|n| n as usize),
            min_size: args.min_size,
            mode,
            include_dot_entries: args.all,
            scan_root_only: args.root_only,
            max_depth: args.max_depth.map(|d| d as usize),
            one_file_system: args.one_file_system,
            disk_usage: args.disk_usage,
            include_os: args.include_os,
            exclusions: args.exclude.clone(),
        }
    }
}

/// Run the scan command
pub fn run(args: ScanArgs, config: &Config, quiet: bool) -> Result<()> {
    if args.clean {
        clean::clean_before_scan(config);
    }

    let engine = ScanEngine::new(config.scan_config(&ScanOverrides::from(&args)));
    for rejected in engine.matcher().rejected() {
        eprintln!("Warning: {}", rejected);
    }

    tracing::info!(
        path = %args.path.display(),
        mode = ?engine.config().mode,
        top = engine.config().top_n,
        patterns = engine.matcher().patterns().len(),
        "Scanning directory"
    );

    let spinner = if args.json || quiet {
        ProgressBar::hidden()
    } else {
        new_spinner()
    };

    if let Err(err) = signals::install_interrupt_handler() {
        tracing::warn!(%err, "Ctrl-C will terminate instead of stopping the scan");
    }

    let mut candidates = 0u64;
    let result = engine.scan_with(
        &args.path,
        |entry| {
            candidates += 1;
            if candidates % PROGRESS_EVERY == 0 {
                spinner.set_message(format!("{} candidates, at {}", candidates, entry.path.display()));
            }
        },
        signals::interrupted,
    );

    spinner.finish_and_clear();
    if let Err(err) = signals::restore_default_interrupt() {
        tracing::warn!(%err, "Failed to restore Ctrl-C handling");
    }

    let report = result?;

    if args.json {
        println!("{}", format_json(&report, true)?);
        return Ok(());
    }

    let mut options = FormatOptions::new().with_share(!args.no_share);
    if let Some(width) = args.width {
        options = options.with_max_path_width(width as usize);
    }
    println!("{}", format_table(&report.results, report.mode.label(), &options));
    println!("{}", format_summary(&report));

    if report.results.is_empty() || report.stats.cancelled {
        return Ok(());
    }

    let interactive = args.interactive || config.scan.interactive;
    if interactive || (!quiet && confirm("\nSelect items for removal?")?) {
        select_and_delete(&report)?;
    }

    Ok(())
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Scanning...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prompt for entries to delete and confirm them. Declining goes back to
/// the selection prompt; only 'q' (or EOF) leaves without deleting.
fn select_and_delete(report: &ScanReport) -> Result<()> {
    let controller = DeletionController::for_report(report);

    loop {
        let Some(indices) = prompt_selection(report.results.len())? else {
            return Ok(());
        };

        let selected: Vec<_> = indices
            .iter()
            .filter_map(|&i| report.results.get(i))
            .collect();
        let total: u64 = selected.iter().map(|e| e.size).sum();

        println!(
            "\nAbout to delete {} ({}):",
            plural(selected.len(), "entry", "entries"),
            format_size(total)
        );
        for entry in &selected {
            println!("  {:>10}  {}", format_size(entry.size), entry.path.display());
        }

        if confirm("Proceed?")? {
            return delete_indices(&controller, report, &indices);
        }
        println!("Selection cancelled. Choose again or 'q' to quit.");
    }
}

/// Read selections until one parses. `None` on 'q', empty input or EOF.
fn prompt_selection(max: usize) -> Result<Option<Vec<usize>>> {
    loop {
        print!("\nSelect entries to delete (e.g. 1 3 5, 1-3, all; q to quit): ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }

        match parse_selection(input, max) {
            Ok(indices) => return Ok(Some(indices)),
            Err(err) => eprintln!("{}", err),
        }
    }
}

/// Delete confirmed entries in rank order and print each outcome.
fn delete_indices(
    controller: &DeletionController,
    report: &ScanReport,
    indices: &[usize],
) -> Result<()> {
    println!();
    let mut freed = 0u64;
    let mut failed = 0usize;
    for &index in indices {
        let outcome = controller.delete_selected(&report.results, index, true)?;
        print_outcome(&outcome);
        freed += outcome.freed;
        if outcome.is_failed() {
            failed += 1;
        }
    }

    println!("\nFreed {}", format_size(freed));
    if failed > 0 {
        eprintln!("{} could not be fully removed", plural(failed, "entry", "entries"));
    }

    Ok(())
}

//! Settings display and toggle commands.

use anyhow::Result;
use std::path::Path;

use crate::commands::{load_or_default, resolve_config_path};
use crate::config::{Config, Toggle};
use crate::scanner::SizeMetric;

/// Print every scan setting with its current value.
pub fn show(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let config = load_or_default(&path)?;

    if path.exists() {
        println!("Config: {}\n", path.display());
    } else {
        println!("Config: {} (not created yet, showing defaults)\n", path.display());
    }
    print!("{}", format_settings(&config));
    Ok(())
}

/// Flip one setting and save it.
pub fn toggle(toggle: Toggle, config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let mut config = load_or_default(&path)?;

    let enabled = config.toggle(toggle);
    config.save(&path)?;

    tracing::info!(setting = toggle.name(), enabled, "Toggled setting");
    println!("{}: {}", toggle.name(), on_off(enabled));
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

fn format_settings(config: &Config) -> String {
    let scan = &config.scan;
    let rows = [
        (
            "min_size_mb",
            scan.min_size_mb.to_string(),
            "Entries below this size are not listed",
        ),
        ("top", scan.top.to_string(), "Number of entries to rank"),
        (
            "mode",
            scan.mode.label().to_lowercase(),
            "What gets ranked (toggle with `files` / `directories`)",
        ),
        (
            "ignore_dot_entries",
            on_off(scan.ignore_dot_entries).to_string(),
            "Skip names starting with '.' (toggle with `dotfolders`)",
        ),
        (
            "scan_root_only",
            on_off(scan.scan_root_only).to_string(),
            "Only list the root's immediate children",
        ),
        (
            "one_file_system",
            on_off(scan.one_file_system).to_string(),
            "Stay on the root's filesystem",
        ),
        (
            "size_metric",
            match scan.size_metric {
                SizeMetric::Apparent => "apparent",
                SizeMetric::DiskUsage => "disk-usage",
            }
            .to_string(),
            "apparent bytes or allocated blocks",
        ),
        (
            "interactive",
            on_off(scan.interactive).to_string(),
            "Go to the removal prompt after every scan (toggle with `interactive`)",
        ),
        (
            "exclusions",
            config.exclusions.len().to_string(),
            "Patterns skipped by every scan (see `exclude list`)",
        ),
    ];

    let mut output = format!("{:<20}  {:<12}  {}\n", "SETTING", "VALUE", "DESCRIPTION");
    output.push_str(&format!("{:-<20}  {:-<12}  {:-<40}\n", "", "", ""));
    for (name, value, description) in rows {
        output.push_str(&format!("{:<20}  {:<12}  {}\n", name, value, description));
    }
    output
}

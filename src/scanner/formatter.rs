use super::collector::RankedResult;
use super::engine::ScanReport;
use super::size::{format_size, share};

/// Format options for ranked output
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Show each entry's share of the listed total
    pub show_share: bool,
    /// Truncate paths longer than this (keeping the tail)
    pub max_path_width: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_share: true,
            max_path_width: None,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_share(mut self, show: bool) -> Self {
        self.show_share = show;
        self
    }

    pub fn with_max_path_width(mut self, width: usize) -> Self {
        self.max_path_width = Some(width);
        self
    }
}

/// Format a ranked result as a numbered table.
pub fn format_table(results: &RankedResult, label: &str, options: &FormatOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("Top {} Largest {}\n", results.len(), label));
    output.push_str(&format!("{:>4}  {:>10}  {}\n", "#", "SIZE", "PATH"));
    output.push_str(&format!("{:->4}  {:->10}  {:-<50}\n", "", "", ""));

    if results.is_empty() {
        output.push_str(&format!(
            "{:>4}  {:>10}  No {} found\n",
            "-",
            "--",
            label.to_lowercase()
        ));
        return output;
    }

    let total = results.total_size();
    for (i, entry) in results.iter().enumerate() {
        let path = truncate_path(&entry.path.display().to_string(), options.max_path_width);
        let partial = if entry.partial { " [!]" } else { "" };
        let share_str = if options.show_share {
            format!(" ({:.1}%)", share(entry.size, total))
        } else {
            String::new()
        };

        output.push_str(&format!(
            "{:>4}  {:>10}  {}{}{}\n",
            i + 1,
            format_size(entry.size),
            path,
            share_str,
            partial
        ));
    }

    output
}

/// One-line totals for a finished scan.
pub fn format_summary(report: &ScanReport) -> String {
    let mut output = format!(
        "Total: {} in {} files, {} directories",
        format_size(report.stats.total_size),
        report.stats.files,
        report.stats.directories
    );

    if report.stats.excluded > 0 {
        output.push_str(&format!(" ({} excluded)", report.stats.excluded));
    }
    if !report.stats.errors.is_empty() {
        output.push_str(&format!(
            "\n{} entries could not be read (run with -v for details)",
            report.stats.errors.len()
        ));
    }
    if report.stats.cancelled {
        output.push_str("\nScan interrupted; results are partial");
    }

    output
}

/// Serialize a scan report as JSON
pub fn format_json(report: &ScanReport, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}

fn truncate_path(path: &str, max_width: Option<usize>) -> String {
    match max_width {
        Some(width) if width > 3 && path.chars().count() > width => {
            let keep = width - 3;
            let tail: String = path
                .chars()
                .rev()
                .take(keep)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        }
        _ => path.to_string(),
    }
}

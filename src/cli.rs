use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::scanner::parse_size_arg;

/// diskface - find what is filling your disk
///
/// Without a command, scans the current directory.
#[derive(Parser, Debug)]
#[command(name = "diskface")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH", env = "DISKFACE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank the largest directories or files under a path
    Scan(ScanArgs),

    /// Remove temporary files matching configured patterns
    Clean(CleanArgs),

    /// Manage persistent exclusion patterns
    #[command(subcommand)]
    Exclude(ExcludeCommand),

    /// Show the current settings
    Settings,

    /// Toggle ranking files instead of directories
    Files,

    /// Toggle ranking directories instead of files
    Directories,

    /// Toggle skipping names that start with '.'
    Dotfolders,

    /// Toggle the removal prompt after every scan
    Interactive,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show top N entries by size
    #[arg(short = 'n', long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub top: Option<u64>,

    /// Hide entries smaller than SIZE (e.g. 500KB, 1.5GB)
    #[arg(short = 'm', long, value_name = "SIZE", value_parser = parse_size_arg)]
    pub min_size: Option<u64>,

    /// Rank files instead of directories
    #[arg(long, conflicts_with = "dirs")]
    pub files: bool,

    /// Rank directories (default)
    #[arg(long)]
    pub dirs: bool,

    /// Include entries whose name starts with '.'
    #[arg(short, long)]
    pub all: bool,

    /// Only report the root's immediate children
    #[arg(long)]
    pub root_only: bool,

    /// Only report entries up to DEPTH levels below the path
    #[arg(short = 'd', long, visible_alias = "depth", value_name = "DEPTH",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub max_depth: Option<u64>,

    /// Don't cross filesystem boundaries
    #[arg(short = 'x', long)]
    pub one_file_system: bool,

    /// Measure allocated blocks instead of apparent size
    #[arg(long)]
    pub disk_usage: bool,

    /// Additional glob pattern to exclude (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Ignore the configured exclusions, system paths included
    #[arg(long)]
    pub include_os: bool,

    /// Remove the configured temp patterns before scanning
    #[arg(long, conflicts_with = "json")]
    pub clean: bool,

    /// Truncate paths to COLS characters, keeping the tail
    #[arg(short, long, value_name = "COLS", value_parser = clap::value_parser!(u64).range(8..))]
    pub width: Option<u64>,

    /// Hide each entry's share of the listed total
    #[arg(long)]
    pub no_share: bool,

    /// Output as JSON
    #[arg(long, conflicts_with = "interactive")]
    pub json: bool,

    /// Select entries to delete after the scan
    #[arg(short, long)]
    pub interactive: bool,
}

impl Default for ScanArgs {
    /// What a bare `diskface` runs: `scan .` with no overrides.
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            top: None,
            min_size: None,
            files: false,
            dirs: false,
            all: false,
            root_only: false,
            max_depth: None,
            one_file_system: false,
            disk_usage: false,
            exclude: Vec::new(),
            include_os: false,
            clean: false,
            width: None,
            no_share: false,
            json: false,
            interactive: false,
        }
    }
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Pattern to clean (repeatable; defaults to the configured patterns)
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Vec<String>,

    /// Root searched for relative patterns (repeatable)
    #[arg(short, long, value_name = "PATH")]
    pub root: Vec<PathBuf>,

    /// Show what would be removed without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum ExcludeCommand {
    /// Add exclusion patterns
    Add {
        /// Glob patterns to add
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// List exclusion patterns
    List,

    /// Remove exclusion patterns by number (e.g. "2", "1-3 5", "all")
    Remove {
        #[arg(required = true, num_args = 1..)]
        selection: Vec<String>,
    },
}

//! Exclude command implementation.

use anyhow::Result;
use std::path::Path;

use crate::cleaner::parse_selection;
use crate::cli::ExcludeCommand;
use crate::commands::{load_or_default, plural, resolve_config_path};
use crate::scanner::ExclusionMatcher;

/// Run an exclude subcommand against the config file at `config_path`
/// (or the default location). A missing file starts from defaults.
pub fn run(command: ExcludeCommand, config_path: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_path)?;
    let mut config = load_or_default(&path)?;

    match command {
        ExcludeCommand::Add { patterns } => {
            ExclusionMatcher::compile_strict(&patterns)?;
            let added = config.add_exclusions(&patterns);
            if added == 0 {
                println!("All patterns already excluded.");
                return Ok(());
            }
            config.save(&path)?;
            println!("Added {}.", plural(added, "pattern", "patterns"));
        }
        ExcludeCommand::List => {
            if config.exclusions.is_empty() {
                println!("No exclusion patterns.");
            }
            for (i, pattern) in config.exclusions.iter().enumerate() {
                println!("{:>4}  {}", i + 1, pattern);
            }
        }
        ExcludeCommand::Remove { selection } => {
            let indices = parse_selection(&selection.join(" "), config.exclusions.len())?;
            let removed = config.remove_exclusions(&indices);
            config.save(&path)?;
            for pattern in &removed {
                println!("Removed {}", pattern);
            }
        }
    }

    Ok(())
}

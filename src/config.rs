use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::scanner::{ScanConfig, ScanMode, SizeMetric, SYSTEM_EXCLUSIONS};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Glob patterns excluded from every scan
    pub exclusions: Vec<String>,
    pub scan: ScanSettings,
    pub temp: TempSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Entries below this size (MB) are not reported
    pub min_size_mb: f64,
    /// Number of entries to rank
    pub top: usize,
    /// What to rank: directories or files
    pub mode: ScanMode,
    /// Skip names starting with '.'
    pub ignore_dot_entries: bool,
    /// Report only the root's immediate children
    pub scan_root_only: bool,
    /// Stay on the root's filesystem
    pub one_file_system: bool,
    /// apparent or disk-usage
    pub size_metric: SizeMetric,
    /// Go straight to the removal prompt after every scan
    pub interactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempSettings {
    /// Patterns removed by `clean`
    pub patterns: Vec<String>,
    /// Roots searched for relative patterns (empty = system temp dir)
    pub roots: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclusions: SYSTEM_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            scan: ScanSettings::default(),
            temp: TempSettings::default(),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            min_size_mb: 0.0,
            top: 20,
            mode: ScanMode::Directories,
            ignore_dot_entries: true,
            scan_root_only: false,
            one_file_system: false,
            size_metric: SizeMetric::Apparent,
            interactive: false,
        }
    }
}

impl Default for TempSettings {
    fn default() -> Self {
        Self {
            patterns: vec![
                "~/.cache/*".to_string(),
                "/tmp/*".to_string(),
                "~/.local/share/Trash/*".to_string(),
                "/var/tmp/*".to_string(),
            ],
            roots: vec![],
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub top: Option<usize>,
    /// Bytes
    pub min_size: Option<u64>,
    pub mode: Option<ScanMode>,
    pub include_dot_entries: bool,
    pub scan_root_only: bool,
    pub max_depth: Option<usize>,
    pub one_file_system: bool,
    pub disk_usage: bool,
    /// Drop the configured exclusions (system paths included) for this scan
    pub include_os: bool,
    /// Added to the configured exclusions
    pub exclusions: Vec<String>,
}

/// Boolean settings that can be flipped from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Rank files instead of directories
    Files,
    /// Rank directories instead of files
    Directories,
    DotEntries,
    Interactive,
}

impl Toggle {
    /// Setting name as shown to the user
    pub fn name(&self) -> &'static str {
        match self {
            Toggle::Files => "scan_files",
            Toggle::Directories => "scan_directories",
            Toggle::DotEntries => "ignore_dot_entries",
            Toggle::Interactive => "interactive",
        }
    }
}

impl Config {
    /// Default config location: `$XDG_CONFIG_HOME/diskface/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("diskface").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and defaults are used if nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::load_from(&default)?,
                _ => {
                    tracing::debug!("No config file, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse the TOML file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.top == 0 {
            return Err(ConfigError::Invalid("scan.top must be at least 1".into()).into());
        }
        if !self.scan.min_size_mb.is_finite() || self.scan.min_size_mb < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scan.min_size_mb must be a non-negative number, got {}",
                self.scan.min_size_mb
            ))
            .into());
        }
        Ok(())
    }

    /// Write the config as pretty TOML, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Merge file settings and command-line overrides into one scan config.
    pub fn scan_config(&self, overrides: &ScanOverrides) -> ScanConfig {
        let min_size = overrides
            .min_size
            .unwrap_or((self.scan.min_size_mb * BYTES_PER_MB) as u64);

        let size_metric = if overrides.disk_usage {
            SizeMetric::DiskUsage
        } else {
            self.scan.size_metric
        };

        let mut patterns = if overrides.include_os {
            Vec::new()
        } else {
            self.exclusions.clone()
        };
        for pattern in &overrides.exclusions {
            if !patterns.contains(pattern) {
                patterns.push(pattern.clone());
            }
        }

        ScanConfig::new()
            .with_min_size(min_size)
            .with_top_n(overrides.top.unwrap_or(self.scan.top))
            .with_mode(overrides.mode.unwrap_or(self.scan.mode))
            .with_ignore_dot_entries(self.scan.ignore_dot_entries && !overrides.include_dot_entries)
            .with_root_only(self.scan.scan_root_only || overrides.scan_root_only)
            .with_max_depth(overrides.max_depth)
            .with_one_file_system(self.scan.one_file_system || overrides.one_file_system)
            .with_size_metric(size_metric)
            .with_patterns(patterns)
    }

    /// Flip a boolean setting and return its new value.
    ///
    /// Only one kind is ranked at a time, so `Files` and `Directories` both
    /// switch `scan.mode`; the value returned says whether that kind is now on.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Files | Toggle::Directories => {
                self.scan.mode = match self.scan.mode {
                    ScanMode::Directories => ScanMode::Files,
                    ScanMode::Files => ScanMode::Directories,
                };
                let wanted = if toggle == Toggle::Files {
                    ScanMode::Files
                } else {
                    ScanMode::Directories
                };
                self.scan.mode == wanted
            }
            Toggle::DotEntries => {
                self.scan.ignore_dot_entries = !self.scan.ignore_dot_entries;
                self.scan.ignore_dot_entries
            }
            Toggle::Interactive => {
                self.scan.interactive = !self.scan.interactive;
                self.scan.interactive
            }
        }
    }

    /// Add exclusion patterns, ignoring ones already present. Returns how many were added.
    pub fn add_exclusions<S: AsRef<str>>(&mut self, patterns: &[S]) -> usize {
        let mut added = 0;
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if !self.exclusions.iter().any(|p| p == pattern) {
                self.exclusions.push(pattern.to_string());
                added += 1;
            }
        }
        added
    }

    /// Remove exclusions by 1-based index. Returns the removed patterns.
    pub fn remove_exclusions(&mut self, indices: &[usize]) -> Vec<String> {
        let mut removed = Vec::new();
        let mut kept = Vec::new();
        for (i, pattern) in self.exclusions.drain(..).enumerate() {
            if indices.contains(&(i + 1)) {
                removed.push(pattern);
            } else {
                kept.push(pattern);
            }
        }
        self.exclusions = kept;
        removed
    }
}

//! Glob-based exclusion matching.
//!
//! Every pattern is tested against the final path component and against the
//! full path, so a bare name like `.git` excludes that name at any depth while
//! `/var/cache/*` only matches under that absolute prefix. A relative pattern
//! with several components (`build/cache`) matches that run of components
//! wherever it appears.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::InvalidPatternError;

/// A compiled set of exclusion patterns.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    set: GlobSet,
    patterns: Vec<String>,
    rejected: Vec<InvalidPatternError>,
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExclusionMatcher {
    /// A matcher that matches nothing.
    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Compile `patterns`, skipping (and logging) any that are malformed.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for raw in patterns {
            match compile_one(raw.as_ref()) {
                Ok((pattern, globs)) => {
                    for glob in globs {
                        builder.add(glob);
                    }
                    accepted.push(pattern);
                }
                Err(err) => {
                    tracing::warn!(pattern = %err.pattern, reason = %err.reason, "Skipping invalid pattern");
                    rejected.push(err);
                }
            }
        }

        let set = builder.build().unwrap_or_else(|err| {
            tracing::warn!(%err, "Failed to build pattern set, excluding nothing");
            GlobSet::empty()
        });

        Self {
            set,
            patterns: accepted,
            rejected,
        }
    }

    /// Compile `patterns`, failing on the first malformed one.
    pub fn compile_strict<S: AsRef<str>>(patterns: &[S]) -> Result<Self, InvalidPatternError> {
        let mut builder = GlobSetBuilder::new();
        let mut accepted = Vec::new();

        for raw in patterns {
            let (pattern, globs) = compile_one(raw.as_ref())?;
            for glob in globs {
                builder.add(glob);
            }
            accepted.push(pattern);
        }

        let set = builder.build().map_err(|err| InvalidPatternError {
            pattern: accepted.join(", "),
            reason: err.to_string(),
        })?;

        Ok(Self {
            set,
            patterns: accepted,
            rejected: Vec::new(),
        })
    }

    /// True if any pattern matches the path's name or the full path.
    pub fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        if let Some(name) = path.file_name() {
            if self.set.is_match(name) {
                return true;
            }
        }
        self.set.is_match(path)
    }

    /// Like [`matches`](Self::matches), but the path test uses the path relative to `base`.
    pub fn matches_within(&self, path: &Path, base: &Path) -> bool {
        match path.strip_prefix(base) {
            Ok(relative) if !relative.as_os_str().is_empty() => {
                if self.patterns.is_empty() {
                    return false;
                }
                path.file_name().is_some_and(|name| self.set.is_match(name))
                    || self.set.is_match(relative)
            }
            _ => self.matches(path),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns that compiled successfully
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Patterns that were skipped
    pub fn rejected(&self) -> &[InvalidPatternError] {
        &self.rejected
    }
}

fn compile_one(raw: &str) -> Result<(String, Vec<Glob>), InvalidPatternError> {
    let trimmed = raw.trim();
    let pattern = if trimmed.len() > 1 {
        trimmed.trim_end_matches('/')
    } else {
        trimmed
    };

    if pattern.is_empty() {
        return Err(InvalidPatternError {
            pattern: raw.to_string(),
            reason: "empty pattern".to_string(),
        });
    }

    let invalid = |err: globset::Error| InvalidPatternError {
        pattern: raw.to_string(),
        reason: err.kind().to_string(),
    };

    let mut globs = vec![Glob::new(pattern).map_err(invalid)?];
    if is_floating(pattern) {
        globs.push(Glob::new(&format!("**/{}", pattern)).map_err(invalid)?);
    }
    Ok((pattern.to_string(), globs))
}

/// Relative, multi-component and not already anchored with `**/`.
fn is_floating(pattern: &str) -> bool {
    !pattern.starts_with('/') && !pattern.starts_with("**/") && pattern.contains('/')
}

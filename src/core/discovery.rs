// FlagSleuth - core/discovery.rs
//
// Recursive directory traversal for batch mode: finds analysis result files.
//
// Reads only file metadata (size, mtime), never contents; loading is owned
// by platform::fs.
//
// Per-file I/O errors are non-fatal and collected as warnings. Exclude
// patterns short-circuit directory descent via filter_entry, so excluded
// subtrees (e.g. node_modules/) are never traversed.

use crate::util::constants;
use crate::util::error::DiscoveryError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Types
// =============================================================================

/// A result file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredResult {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of files returned; extra files are dropped with a warning.
    pub max_files: usize,

    /// Filename globs a file must match. Empty means "everything not excluded".
    pub include_patterns: Vec<String>,

    /// Globs matched against filenames, and (for literal patterns) against
    /// directory names to prune descent.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: to_strings(constants::DEFAULT_INCLUDE_PATTERNS),
            exclude_patterns: to_strings(constants::DEFAULT_EXCLUDE_PATTERNS),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Output of a discovery run.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Accepted files, sorted by path.
    pub files: Vec<DiscoveredResult>,
    /// Non-fatal problems, human readable.
    pub warnings: Vec<String>,
    /// Matching files found before the `max_files` limit was applied.
    pub total_found: usize,
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover result files under `root`.
///
/// Returns `Err` only if the root is missing or not a directory.
pub fn discover_results(root: &Path, config: &DiscoveryConfig) -> Result<Discovery, DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_files = config
        .max_files
        .clamp(constants::MIN_MAX_FILES, constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut files: Vec<DiscoveredResult> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.file_type().is_dir() && e.depth() > 0 {
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                let msg = format!("Cannot read metadata for '{}': {e}", path.display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        let size = metadata.len();
        files.push(DiscoveredResult {
            path: path.to_path_buf(),
            size,
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    let total_found = files.len();

    // Over the limit: keep the most recently modified files. Files without
    // an mtime count as oldest.
    if total_found > max_files {
        files.sort_unstable_by(|a, b| match (b.modified, a.modified) {
            (Some(bm), Some(am)) => bm.cmp(&am),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        files.truncate(max_files);

        warnings.push(format!(
            "{total_found} result files were found but the limit is {max_files}. \
             Only the {max_files} most recently modified files are processed."
        ));
        tracing::info!(total_found, limit = max_files, "Result file list truncated");
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    tracing::debug!(
        total_found,
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok(Discovery {
        files,
        warnings,
        total_found,
    })
}

// =============================================================================
// Glob helpers
// =============================================================================

fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Literal (wildcard-free) exclude patterns also prune directories.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================

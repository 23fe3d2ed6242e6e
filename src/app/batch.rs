// FlagSleuth - app/batch.rs
//
// Batch search: one pattern over every result file under a directory.
// Each file gets its own Session; workers share only the compiled Matcher.
// Per-file failures are recorded in the report, never fatal.

use crate::app::session::{SearchOutcome, Session, SessionOptions};
use crate::core::discovery::{discover_results, DiscoveredResult, DiscoveryConfig};
use crate::core::model::Flag;
use crate::core::pattern::Matcher;
use crate::platform::fs::read_result;
use crate::util::error::DiscoveryError;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Search outcome for a single result file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Distinct matches of the pattern in this file.
    pub matches: Vec<String>,
    /// Flags the search added on top of the file's own flags.
    pub added: Vec<String>,
    /// Full flag set after the merge.
    pub flags: Vec<Flag>,
    /// Load failure, if the file could not be processed.
    pub error: Option<String>,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub pattern: String,
    /// Per-file reports, in path order.
    pub files: Vec<FileReport>,
    /// Discovery warnings.
    pub warnings: Vec<String>,
}

impl BatchReport {
    pub fn files_with_matches(&self) -> usize {
        self.files.iter().filter(|f| !f.matches.is_empty()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Discover result files under `root` and search each one with `matcher`.
pub fn run_batch(
    root: &Path,
    matcher: &Matcher,
    discovery: &DiscoveryConfig,
    options: &SessionOptions,
) -> Result<BatchReport, DiscoveryError> {
    let found = discover_results(root, discovery)?;

    tracing::info!(
        root = %root.display(),
        files = found.files.len(),
        "Batch search starting"
    );

    // par_iter preserves input order in the collected Vec.
    let files: Vec<FileReport> = found
        .files
        .par_iter()
        .map(|file| search_file(file, matcher, options))
        .collect();

    let report = BatchReport {
        root: root.to_path_buf(),
        pattern: matcher.input().to_string(),
        files,
        warnings: found.warnings,
    };

    tracing::info!(
        files = report.files.len(),
        with_matches = report.files_with_matches(),
        failed = report.failed(),
        "Batch search complete"
    );
    Ok(report)
}

fn search_file(file: &DiscoveredResult, matcher: &Matcher, options: &SessionOptions) -> FileReport {
    let mut report = FileReport {
        path: file.path.clone(),
        matches: Vec::new(),
        added: Vec::new(),
        flags: Vec::new(),
        error: None,
    };

    let result = match read_result(&file.path) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "Skipping result file");
            report.error = Some(e.to_string());
            return report;
        }
    };

    let mut session = Session::new(options.clone());
    session.load_result(result);

    match session.search_with(matcher) {
        Ok(SearchOutcome::Matches { matches, added }) => {
            report.matches = matches.into_vec();
            report.added = added;
        }
        Ok(_) => {}
        Err(e) => report.error = Some(e.to_string()),
    }
    report.flags = session.flags().as_slice().to_vec();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::compile;
    use std::fs;

    fn matcher(p: &str) -> Matcher {
        compile(p).unwrap().unwrap()
    }

    #[test]
    fn test_batch_searches_each_file_independently() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"flags": {"flags": [{"flag": "FLAG{a}", "source": "strings"}]}, "x": "FLAG{shared}"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"flags": {"flags": []}, "y": "nothing"}"#,
        )
        .unwrap();

        let report = run_batch(
            dir.path(),
            &matcher("FLAG{}"),
            &DiscoveryConfig::default(),
            &SessionOptions::default(),
        )
        .unwrap();

        assert_eq!(report.files.len(), 2);
        let a = &report.files[0];
        assert!(a.path.ends_with("a.json"));
        assert_eq!(a.matches, vec!["FLAG{a}".to_string(), "FLAG{shared}".to_string()]);
        assert_eq!(a.added, vec!["FLAG{shared}".to_string()]);
        assert_eq!(a.flags.len(), 2);

        let b = &report.files[1];
        assert!(b.matches.is_empty());
        assert!(b.flags.is_empty(), "flags must not leak between files");
        assert_eq!(report.files_with_matches(), 1);
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.json"), "{oops").unwrap();
        fs::write(dir.path().join("good.json"), r#"{"k": "CTF{ok}"}"#).unwrap();

        let report = run_batch(
            dir.path(),
            &matcher("CTF{}"),
            &DiscoveryConfig::default(),
            &SessionOptions::default(),
        )
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(report.files[0].error.is_some());
        assert_eq!(report.files[1].matches, vec!["CTF{ok}".to_string()]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = run_batch(
            Path::new("/nonexistent/flagsleuth"),
            &matcher("x"),
            &DiscoveryConfig::default(),
            &SessionOptions::default(),
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }
}

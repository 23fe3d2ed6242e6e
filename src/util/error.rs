// FlagSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use crate::util::constants;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all FlagSleuth operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum FlagSleuthError {
    /// A search pattern could not be compiled.
    Pattern(PatternError),

    /// A custom search could not run.
    Search(SearchError),

    /// An analysis result file could not be loaded.
    Load(LoadError),

    /// Result file discovery failed.
    Discovery(DiscoveryError),

    /// Export operation failed.
    Export(ExportError),
}

impl fmt::Display for FlagSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "Pattern error: {e}"),
            Self::Search(e) => write!(f, "Search error: {e}"),
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for FlagSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern errors
// ---------------------------------------------------------------------------

/// Errors produced by the pattern compiler.
///
/// Both variants surface to the user as "invalid pattern"; the detail is kept
/// for diagnostic logging.
#[derive(Debug)]
pub enum PatternError {
    /// The pattern is not a valid regular expression.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// The raw regex pattern exceeds the maximum allowed length.
    TooLong { length: usize, max_length: usize },
}

impl PatternError {
    /// Short user-facing status string.
    pub fn status_message(&self) -> &'static str {
        constants::STATUS_INVALID_PATTERN
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid search pattern '{pattern}': {source}")
            }
            Self::TooLong { length, max_length } => write!(
                f,
                "Search pattern is {length} bytes, exceeds maximum of {max_length}"
            ),
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            Self::TooLong { .. } => None,
        }
    }
}

impl From<PatternError> for FlagSleuthError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Search errors
// ---------------------------------------------------------------------------

/// Recoverable, user-facing conditions that stop a custom search.
///
/// An empty pattern is not an error; see `app::session::SearchOutcome`.
#[derive(Debug)]
pub enum SearchError {
    /// A search was requested before any analysis result was loaded.
    NoResultLoaded,

    /// The pattern could not be compiled.
    InvalidPattern(PatternError),
}

impl SearchError {
    /// Short user-facing status string. Each condition has its own message.
    pub fn status_message(&self) -> &'static str {
        match self {
            Self::NoResultLoaded => constants::STATUS_NO_RESULT,
            Self::InvalidPattern(e) => e.status_message(),
        }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResultLoaded => write!(f, "No analysis result is loaded"),
            Self::InvalidPattern(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoResultLoaded => None,
            Self::InvalidPattern(e) => Some(e),
        }
    }
}

impl From<PatternError> for SearchError {
    fn from(e: PatternError) -> Self {
        Self::InvalidPattern(e)
    }
}

impl From<SearchError> for FlagSleuthError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors related to reading an analysis result file.
#[derive(Debug)]
pub enum LoadError {
    /// I/O error reading the file.
    Io { path: PathBuf, source: io::Error },

    /// The file is not valid JSON.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file exceeds the maximum allowed size.
    TooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// The JSON root is not an object of named sections.
    NotAnObject { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot read result '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "Result '{}' is not valid JSON: {source}", path.display())
            }
            Self::TooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Result '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::NotAnObject { path } => write!(
                f,
                "Result '{}' must be a JSON object of named sections",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<LoadError> for FlagSleuthError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to result file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Batch path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Batch path '{}' is not a directory", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<DiscoveryError> for FlagSleuthError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The export path has no recognised extension.
    UnknownFormat { path: PathBuf },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::UnknownFormat { path } => write!(
                f,
                "Cannot infer export format for '{}'. Use a .csv or .json extension.",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for FlagSleuthError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for FlagSleuth results.
pub type Result<T> = std::result::Result<T, FlagSleuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_statuses_are_distinct() {
        let no_result = SearchError::NoResultLoaded;
        let invalid = SearchError::InvalidPattern(PatternError::TooLong {
            length: 5_000,
            max_length: 4_096,
        });
        assert_eq!(no_result.status_message(), constants::STATUS_NO_RESULT);
        assert_eq!(invalid.status_message(), constants::STATUS_INVALID_PATTERN);
        assert_ne!(no_result.status_message(), invalid.status_message());
    }

    #[test]
    fn test_error_chain_preserves_source() {
        use std::error::Error;
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err: FlagSleuthError = PatternError::InvalidRegex {
            pattern: "(".to_string(),
            source: regex_err,
        }
        .into();
        let inner = err.source().expect("top-level error should expose its cause");
        assert!(inner.source().is_some(), "regex error should be chained");
        assert!(err.to_string().starts_with("Pattern error: "));
    }
}

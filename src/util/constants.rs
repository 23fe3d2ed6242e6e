// FlagSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "FlagSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "FlagSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Pattern search
// =============================================================================

/// Hard upper bound on the number of distinct matches collected by a single
/// custom pattern search. Protects the caller from patterns that match an
/// enormous number of substrings in a large corpus.
pub const MAX_CUSTOM_MATCHES: usize = 50;

/// Two-character placeholder meaning "a brace-delimited fragment here".
pub const WILDCARD_PLACEHOLDER: &str = "{}";

/// Regex fragment substituted for the placeholder: a `{`, the shortest run of
/// any characters (newlines included), then `}`.
pub const WILDCARD_BODY_REGEX: &str = r"(?s:\{.*?\})";

/// Maximum raw regex pattern length, in bytes, accepted from the user.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Compiled program size limit handed to `regex::RegexBuilder`.
pub const REGEX_SIZE_LIMIT: usize = 8 * 1024 * 1024; // 8 MiB

/// Provenance tag for flags discovered by a user pattern search.
pub const CUSTOM_PATTERN_SOURCE: &str = "custom pattern";

/// Provenance tag for backend flags that arrive without a `source` field.
pub const UNKNOWN_SOURCE: &str = "unknown";

// =============================================================================
// User-facing status strings
// =============================================================================

/// Empty or whitespace-only pattern.
pub const STATUS_NO_PATTERN: &str = "No pattern.";

/// Pattern failed to compile.
pub const STATUS_INVALID_PATTERN: &str = "Invalid pattern.";

/// Pattern compiled but found nothing.
pub const STATUS_NO_MATCHES: &str = "No matches for this pattern.";

/// Search requested before any analysis result was loaded.
pub const STATUS_NO_RESULT: &str = "Run analysis first.";

/// Session state after a reset.
pub const STATUS_IDLE: &str = "Idle.";

// =============================================================================
// Built-in flag detection
// =============================================================================

/// Patterns used by the built-in detector, applied case-insensitively and in
/// this order to every scanned text field.
pub const BUILTIN_FLAG_PATTERNS: &[&str] = &[r"flag\{.*?\}", r"ctf\{.*?\}", r"genzipher\{.*?\}"];

// =============================================================================
// Highlighting and panels
// =============================================================================

/// CSS class applied to the highlight marker span.
pub const DEFAULT_MARKER_CLASS: &str = "flag-hit";

/// Maximum number of string-dump sample lines shown in a strings panel.
pub const STRINGS_PANEL_MAX_LINES: usize = 300;

/// Result sections rendered as pretty-printed JSON panels, with their titles.
pub const JSON_PANEL_SECTIONS: &[(&str, &str)] = &[
    ("file_info", "File Info"),
    ("exif", "EXIF"),
    ("header_footer", "Header / Footer"),
    ("binwalk", "Binwalk"),
    ("lsb", "LSB"),
    ("zsteg", "zsteg"),
    ("steghide", "Steghide"),
    ("outguess_openstego", "OutGuess / OpenStego"),
    ("compression", "Compression"),
    ("encodings", "Encodings"),
];

// =============================================================================
// Result file loading
// =============================================================================

/// Maximum size of a result JSON file accepted for loading.
pub const MAX_RESULT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

/// Result files at or above this size are memory-mapped instead of read.
pub const LARGE_RESULT_THRESHOLD: u64 = 16 * 1024 * 1024; // 16 MB

// =============================================================================
// Discovery limits (batch mode)
// =============================================================================

/// Default maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Default maximum number of result files discovered in one batch.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files.
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Default include glob patterns for result file discovery.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.json"];

/// Default exclude glob patterns for result file discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "*.tmp",
    "package.json",
    "node_modules",
    ".git",
    "__pycache__",
];

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a pattern or value included in debug output.
pub const DEBUG_MAX_PREVIEW: usize = 120;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

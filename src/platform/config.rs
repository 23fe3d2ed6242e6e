// FlagSleuth - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation. Invalid values produce warnings and fall back to defaults.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::discovery::DiscoveryConfig;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml for this platform, if one can be resolved.
pub fn default_config_path() -> Option<PathBuf> {
    match ProjectDirs::from("", "", constants::APP_ID) {
        Some(dirs) => {
            let path = dirs.config_dir().join(constants::CONFIG_FILE_NAME);
            tracing::debug!(path = %path.display(), "Default config path resolved");
            Some(path)
        }
        None => {
            tracing::debug!("Could not determine platform config directory");
            None
        }
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are ignored so newer config files work with older binaries.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub search: SearchSection,
    pub highlight: HighlightSection,
    pub flags: FlagsSection,
    pub discovery: DiscoverySection,
    pub logging: LoggingSection,
}

/// `[search]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Distinct-match cap for custom searches (1-50).
    pub max_matches: Option<usize>,
}

/// `[highlight]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct HighlightSection {
    /// CSS class of the highlight span.
    pub marker_class: Option<String>,
}

/// `[flags]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FlagsSection {
    /// Run built-in detection when the result has no usable flag list.
    pub detect_when_missing: Option<bool>,
}

/// `[discovery]` config section (batch mode).
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_depth: Option<usize>,
    pub max_files: Option<usize>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub max_matches: usize,
    pub marker_class: String,
    pub detect_when_missing: bool,
    pub max_depth: usize,
    pub max_files: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    /// Logging level string (used before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let discovery = DiscoveryConfig::default();
        Self {
            max_matches: constants::MAX_CUSTOM_MATCHES,
            marker_class: constants::DEFAULT_MARKER_CLASS.to_string(),
            detect_when_missing: true,
            max_depth: discovery.max_depth,
            max_files: discovery.max_files,
            include_patterns: discovery.include_patterns,
            exclude_patterns: discovery.exclude_patterns,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Discovery settings for batch mode.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            max_depth: self.max_depth,
            max_files: self.max_files,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load and validate config.toml.
///
/// `explicit` is the `--config` path; without it the platform default is
/// tried. A missing default file is a normal first run and yields defaults
/// silently. A missing explicit file, an unreadable file, or a parse failure
/// yields defaults plus a warning.
pub fn load_config(explicit: Option<&Path>) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return (AppConfig::default(), warnings),
        },
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let (config, parse_warnings) = parse_config(&content, &path);
    warnings.extend(parse_warnings);
    (config, warnings)
}

/// Parse and validate config.toml text. `path` is used in messages only.
pub fn parse_config(content: &str, path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    let raw: RawConfig = match toml::from_str(content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let mut config = AppConfig::default();

    // -- Search: max_matches --
    if let Some(n) = raw.search.max_matches {
        if (1..=constants::MAX_CUSTOM_MATCHES).contains(&n) {
            config.max_matches = n;
        } else {
            warnings.push(format!(
                "[search] max_matches = {n} is out of range (1-{}). Using default ({}).",
                constants::MAX_CUSTOM_MATCHES,
                constants::MAX_CUSTOM_MATCHES,
            ));
        }
    }

    // -- Highlight: marker_class --
    if let Some(class) = raw.highlight.marker_class {
        let valid = !class.is_empty()
            && class
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            config.marker_class = class;
        } else {
            warnings.push(format!(
                "[highlight] marker_class = \"{class}\" must be non-empty and use only \
                 letters, digits, '-' or '_'. Using default ({}).",
                constants::DEFAULT_MARKER_CLASS,
            ));
        }
    }

    if let Some(detect) = raw.flags.detect_when_missing {
        config.detect_when_missing = detect;
    }

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    if let Some(files) = raw.discovery.max_files {
        if (constants::MIN_MAX_FILES..=constants::ABSOLUTE_MAX_FILES).contains(&files) {
            config.max_files = files;
        } else {
            warnings.push(format!(
                "[discovery] max_files = {files} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_FILES,
                constants::ABSOLUTE_MAX_FILES,
                constants::DEFAULT_MAX_FILES,
            ));
        }
    }

    if let Some(include) = raw.discovery.include_patterns {
        config.include_patterns = include;
    }
    if let Some(exclude) = raw.discovery.exclude_patterns {
        config.exclude_patterns = exclude;
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> (AppConfig, Vec<String>) {
        parse_config(content, Path::new("config.toml"))
    }

    #[test]
    fn test_empty_config_gives_defaults() {
        let (config, warnings) = parse("");
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
        assert_eq!(config.max_matches, 50);
        assert!(config.detect_when_missing);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let (config, warnings) = parse(
            r#"
            [search]
            max_matches = 10
            [highlight]
            marker_class = "hit_2"
            [flags]
            detect_when_missing = false
            [discovery]
            max_depth = 3
            include_patterns = ["*_result.json"]
            [logging]
            level = "debug"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.max_matches, 10);
        assert_eq!(config.marker_class, "hit_2");
        assert!(!config.detect_when_missing);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.include_patterns, vec!["*_result.json".to_string()]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_max_matches_cannot_exceed_hard_cap() {
        let (config, warnings) = parse("[search]\nmax_matches = 500\n");
        assert_eq!(config.max_matches, constants::MAX_CUSTOM_MATCHES);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("max_matches"));
    }

    #[test]
    fn test_invalid_marker_class_falls_back() {
        let (config, warnings) = parse("[highlight]\nmarker_class = \"a\\\" onclick\"\n");
        assert_eq!(config.marker_class, constants::DEFAULT_MARKER_CLASS);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_invalid_log_level_warns() {
        let (config, warnings) = parse("[logging]\nlevel = \"loud\"\n");
        assert!(config.log_level.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unparseable_config_gives_defaults_with_warning() {
        let (config, warnings) = parse("[search\nmax_matches = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let (config, warnings) = load_config(Some(Path::new("/nonexistent/flagsleuth.toml")));
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_config_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[search]\nmax_matches = 5\n").unwrap();
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(config.max_matches, 5);
        assert_eq!(config.discovery_config().max_files, constants::DEFAULT_MAX_FILES);
    }
}

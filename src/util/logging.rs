// FlagSleuth - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr, so CLI stdout stays machine-readable.
// Never logs full result contents; values are truncated via `preview`.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Logging initialised"
        );
    }
}

/// Truncate `text` to at most `DEBUG_MAX_PREVIEW` characters for log output.
pub fn preview(text: &str) -> String {
    let max = super::constants::DEBUG_MAX_PREVIEW;
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("CTF{}"), "CTF{}");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        let out = preview(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), super::super::constants::DEBUG_MAX_PREVIEW + 3);
    }
}

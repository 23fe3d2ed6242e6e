// FlagSleuth - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Dispatch to one subcommand, each driving its own Session
//
// Results go to stdout; status lines, warnings and logs go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use flagsleuth::app::batch::{run_batch, BatchReport};
use flagsleuth::app::session::{SearchOutcome, Session, SessionOptions};
use flagsleuth::core::export;
use flagsleuth::core::highlight::Marker;
use flagsleuth::core::model::{Flag, FlagSet};
use flagsleuth::core::pattern;
use flagsleuth::platform::config::{load_config, AppConfig};
use flagsleuth::platform::fs::read_result;
use flagsleuth::util::error::{ExportError, FlagSleuthError, SearchError};
use flagsleuth::util::{constants, logging};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// FlagSleuth - find, merge and highlight CTF flags in stego analysis results.
#[derive(Parser, Debug)]
#[command(name = "flagsleuth", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Read configuration from this file instead of the platform default.
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the flags of an analysis result.
    Flags {
        result: PathBuf,
        /// Also run the built-in detector and merge its hits.
        #[arg(long)]
        detect: bool,
        #[arg(short = 'f', long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
    /// Search a result with a custom pattern and merge the matches.
    Search {
        result: PathBuf,
        /// Regex, or a literal with `{}` standing for a brace-delimited run.
        pattern: String,
        #[arg(short = 'm', long, value_parser = clap::value_parser!(u16).range(1..=50))]
        max_matches: Option<u16>,
        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Print the raw-text panels of a result with flags highlighted.
    Highlight {
        result: PathBuf,
        /// Run this custom search first so its matches are highlighted too.
        #[arg(short = 'p', long)]
        pattern: Option<String>,
        /// Only print the panel with this name (e.g. `exif`, `strings.ascii`).
        #[arg(long)]
        panel: Option<String>,
    },
    /// Write the flag set to a .csv or .json file.
    Export {
        result: PathBuf,
        out: PathBuf,
        #[arg(short = 'p', long)]
        pattern: Option<String>,
    },
    /// Search every result file under a directory.
    Batch {
        dir: PathBuf,
        pattern: String,
        #[arg(short = 'f', long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ListFormat {
    Text,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_warnings) = load_config(cli.config.as_deref());
    logging::init(cli.debug, config.log_level.as_deref());

    tracing::debug!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "FlagSleuth starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    match run(cli.command, &config) {
        Ok(code) => code,
        Err(e) => {
            if let FlagSleuthError::Search(ref search) = e {
                eprintln!("{}", search.status_message());
            }
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn session_options(config: &AppConfig) -> SessionOptions {
    SessionOptions {
        max_matches: config.max_matches,
        detect_when_missing: config.detect_when_missing,
        marker: Marker::span(&config.marker_class),
    }
}

fn load_session(path: &Path, options: SessionOptions) -> Result<Session, FlagSleuthError> {
    let result = read_result(path)?;
    let mut session = Session::new(options);
    session.load_result(result);
    Ok(session)
}

fn run(command: Command, config: &AppConfig) -> Result<ExitCode, FlagSleuthError> {
    match command {
        Command::Flags {
            result,
            detect,
            format,
        } => {
            let mut session = load_session(&result, session_options(config))?;
            if detect {
                let added = session.detect_builtin()?;
                tracing::info!(added, "Built-in detection applied");
            }
            print_flags(session.flags(), format)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Search {
            result,
            pattern,
            max_matches,
            format,
        } => {
            let mut options = session_options(config);
            if let Some(n) = max_matches {
                options.max_matches = usize::from(n);
            }
            let mut session = load_session(&result, options)?;
            let outcome = session.run_custom_search(&pattern)?;
            print_search(&pattern, &session, &outcome, format)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Highlight {
            result,
            pattern,
            panel,
        } => {
            let mut session = load_session(&result, session_options(config))?;
            if let Some(p) = pattern {
                let outcome = session.run_custom_search(&p)?;
                eprintln!("{}", outcome.status_message());
            }

            let panels = session.render_panels();
            let selected: Vec<_> = panels
                .iter()
                .filter(|p| panel.as_deref().map_or(true, |name| p.name == name))
                .collect();
            if selected.is_empty() {
                let known: Vec<&str> = panels.iter().map(|p| p.name.as_str()).collect();
                eprintln!(
                    "Unknown panel '{}'. Available: {}",
                    panel.unwrap_or_default(),
                    known.join(", ")
                );
                return Ok(ExitCode::from(2));
            }

            let mut out = std::io::stdout().lock();
            for p in selected {
                writeln!(out, "== {} ==\n{}\n", p.title, p.markup).map_err(|e| {
                    stdout_error(ExportError::Io {
                        path: PathBuf::from("<stdout>"),
                        source: e,
                    })
                })?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Export {
            result,
            out,
            pattern,
        } => {
            let mut session = load_session(&result, session_options(config))?;
            if let Some(p) = pattern {
                let outcome = session.run_custom_search(&p)?;
                eprintln!("{}", outcome.status_message());
            }
            let count = export::export_to_file(session.flags(), &out)?;
            eprintln!("Exported {count} flag(s) to {}", out.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Batch {
            dir,
            pattern,
            format,
        } => {
            let matcher = match pattern::compile(&pattern) {
                Ok(Some(m)) => m,
                Ok(None) => {
                    eprintln!("{}", SearchOutcome::NoPattern.status_message());
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(SearchError::InvalidPattern(e).into()),
            };
            let report = run_batch(
                &dir,
                &matcher,
                &config.discovery_config(),
                &session_options(config),
            )?;
            print_batch(&report, format)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// =============================================================================
// Output
// =============================================================================

fn stdout_error(e: ExportError) -> FlagSleuthError {
    FlagSleuthError::Export(e)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), FlagSleuthError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        stdout_error(ExportError::Json {
            path: PathBuf::from("<stdout>"),
            source: e,
        })
    })?;
    println!("{text}");
    Ok(())
}

fn print_flags(flags: &FlagSet, format: ListFormat) -> Result<(), FlagSleuthError> {
    match format {
        ListFormat::Text => {
            if flags.is_empty() {
                eprintln!("No flags.");
            }
            for flag in flags {
                println!("{}\t{}", flag.value, flag.source);
            }
        }
        ListFormat::Json => print_json(flags)?,
        ListFormat::Csv => {
            export::export_csv(flags, std::io::stdout().lock(), Path::new("<stdout>"))?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SearchReport<'a> {
    pattern: &'a str,
    status: String,
    matches: Vec<&'a str>,
    added: Vec<&'a str>,
    flags: &'a [Flag],
}

fn print_search(
    pattern: &str,
    session: &Session,
    outcome: &SearchOutcome,
    format: ReportFormat,
) -> Result<(), FlagSleuthError> {
    let (matches, added): (Vec<&str>, Vec<&str>) = match outcome {
        SearchOutcome::Matches { matches, added } => (
            matches.iter().collect(),
            added.iter().map(String::as_str).collect(),
        ),
        _ => (Vec::new(), Vec::new()),
    };

    match format {
        ReportFormat::Json => print_json(&SearchReport {
            pattern,
            status: outcome.status_message(),
            matches,
            added,
            flags: session.flags().as_slice(),
        }),
        ReportFormat::Text => {
            eprintln!("{}", outcome.status_message());
            for value in &matches {
                let marker = if added.contains(value) { "+" } else { " " };
                println!("{marker} {value}");
            }
            Ok(())
        }
    }
}

fn print_batch(report: &BatchReport, format: ReportFormat) -> Result<(), FlagSleuthError> {
    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }
    match format {
        ReportFormat::Json => print_json(report),
        ReportFormat::Text => {
            for file in &report.files {
                match &file.error {
                    Some(err) => println!("{}: error: {err}", file.path.display()),
                    None if file.matches.is_empty() => {
                        println!("{}: {}", file.path.display(), constants::STATUS_NO_MATCHES)
                    }
                    None => {
                        println!(
                            "{}: {} match(es), {} new",
                            file.path.display(),
                            file.matches.len(),
                            file.added.len()
                        );
                        for value in &file.matches {
                            println!("  {value}");
                        }
                    }
                }
            }
            eprintln!(
                "{} file(s) searched, {} with matches, {} failed.",
                report.files.len(),
                report.files_with_matches(),
                report.failed()
            );
            Ok(())
        }
    }
}

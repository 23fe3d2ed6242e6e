// FlagSleuth - app/session.rs
//
// One analysis session: the most recently received result and the active
// flag set. Every host (CLI command, batch worker, test) owns its own
// Session; nothing is shared between sessions except compiled matchers.
//
// Lifecycle:
//   Idle --load_result--> Loaded --run_custom_search--> Loaded (flags grown)
//   any  --reset-------> Idle
//
// Loading a new result discards the previous flags entirely; custom matches
// never carry over from one result to the next.

use crate::core::detect::FlagDetector;
use crate::core::highlight::{self, Marker};
use crate::core::merge;
use crate::core::model::{AnalysisResult, FlagSet, MatchSet};
use crate::core::panels::{self, RenderedPanel};
use crate::core::pattern::{self, Matcher};
use crate::core::scanner;
use crate::util::constants;
use crate::util::error::SearchError;
use crate::util::logging::preview;
use chrono::{DateTime, Utc};

// =============================================================================
// Options and outcomes
// =============================================================================

/// Per-session behaviour, usually derived from config.toml.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Distinct-match cap for custom searches; clamped to the hard cap.
    pub max_matches: usize,
    /// Run built-in detection when a result has no usable flag list.
    pub detect_when_missing: bool,
    /// Markup wrapped around highlighted flag occurrences.
    pub marker: Marker,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_matches: constants::MAX_CUSTOM_MATCHES,
            detect_when_missing: true,
            marker: Marker::default(),
        }
    }
}

/// Successful outcome of a custom search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The pattern was empty. Nothing was scanned and flags are unchanged.
    NoPattern,
    /// The pattern compiled but matched nothing.
    NoMatches,
    /// At least one match was found.
    Matches {
        /// Every distinct match, including values already known.
        matches: MatchSet,
        /// Values the merge actually added to the flag set.
        added: Vec<String>,
    },
}

impl SearchOutcome {
    /// User-facing status line.
    pub fn status_message(&self) -> String {
        match self {
            Self::NoPattern => constants::STATUS_NO_PATTERN.to_string(),
            Self::NoMatches => constants::STATUS_NO_MATCHES.to_string(),
            Self::Matches { matches, added } => format!(
                "{} match{} found, {} new.",
                matches.len(),
                if matches.len() == 1 { "" } else { "es" },
                added.len()
            ),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    options: SessionOptions,
    result: Option<AnalysisResult>,
    flags: FlagSet,
    last_matches: Option<MatchSet>,
    loaded_at: Option<DateTime<Utc>>,
    status: String,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            result: None,
            flags: FlagSet::new(),
            last_matches: None,
            loaded_at: None,
            status: constants::STATUS_IDLE.to_string(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The active flag set.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// MatchSet of the most recent custom search against the current result.
    pub fn last_matches(&self) -> Option<&MatchSet> {
        self.last_matches.as_ref()
    }

    /// When the current result was loaded.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Status line of the last operation.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Replace the current result and reseed the flag set from it.
    ///
    /// When the result carries no usable flag list and detection is enabled,
    /// the built-in detector seeds the flags instead.
    pub fn load_result(&mut self, result: AnalysisResult) {
        let mut flags = result.reported_flags();
        let detected = if !result.has_flags_section() && self.options.detect_when_missing {
            flags = FlagDetector::builtin().detect(&result);
            true
        } else {
            false
        };

        tracing::info!(
            flags = flags.len(),
            detected,
            "Analysis result loaded into session"
        );

        self.status = format!("Loaded result with {} flag(s).", flags.len());
        self.flags = flags;
        self.result = Some(result);
        self.last_matches = None;
        self.loaded_at = Some(Utc::now());
    }

    /// Run built-in detection on the current result and merge the hits after
    /// the existing flags. Returns the number of flags added.
    pub fn detect_builtin(&mut self) -> Result<usize, SearchError> {
        let result = self.result.as_ref().ok_or(SearchError::NoResultLoaded)?;
        let detected = FlagDetector::builtin().detect(result);

        let before = self.flags.len();
        let mut merged = self.flags.clone();
        for flag in &detected {
            merged.push(flag.clone());
        }
        let added = merged.len() - before;
        self.flags = merged;

        tracing::debug!(detected = detected.len(), added, "Built-in detection merged");
        Ok(added)
    }

    /// Discard the result, flags and matches.
    pub fn reset(&mut self) {
        self.result = None;
        self.flags = FlagSet::new();
        self.last_matches = None;
        self.loaded_at = None;
        self.status = constants::STATUS_IDLE.to_string();
        tracing::debug!("Session reset");
    }

    /// Compile `pattern`, scan the current result, and merge the matches
    /// into the active flag set.
    ///
    /// A result must be loaded before the pattern is even looked at.
    pub fn run_custom_search(&mut self, pattern: &str) -> Result<SearchOutcome, SearchError> {
        if self.result.is_none() {
            return Err(self.fail(SearchError::NoResultLoaded));
        }

        let matcher = match pattern::compile(pattern) {
            Ok(Some(m)) => m,
            Ok(None) => {
                self.status = constants::STATUS_NO_PATTERN.to_string();
                return Ok(SearchOutcome::NoPattern);
            }
            Err(e) => return Err(self.fail(SearchError::InvalidPattern(e))),
        };

        self.search_with(&matcher)
    }

    /// Run a full search cycle with an already compiled matcher.
    pub fn search_with(&mut self, matcher: &Matcher) -> Result<SearchOutcome, SearchError> {
        let Some(result) = self.result.as_ref() else {
            return Err(self.fail(SearchError::NoResultLoaded));
        };

        let matches = scanner::scan(result, matcher, self.options.max_matches);
        let merged = merge::merge_custom(&self.flags, &matches);
        let added: Vec<String> = merge::added_values(&self.flags, &merged)
            .into_iter()
            .map(str::to_string)
            .collect();

        tracing::debug!(
            pattern = %preview(matcher.input()),
            matches = matches.len(),
            added = added.len(),
            "Custom search complete"
        );

        self.flags = merged;
        self.last_matches = Some(matches.clone());

        let outcome = if matches.is_empty() {
            SearchOutcome::NoMatches
        } else {
            SearchOutcome::Matches { matches, added }
        };
        self.status = outcome.status_message();
        Ok(outcome)
    }

    /// Highlight arbitrary text against the active flag set.
    pub fn highlight(&self, text: &str) -> String {
        highlight::highlight_with(text, &self.flags, &self.options.marker)
    }

    /// Render every raw-text panel of the current result. Empty when idle.
    pub fn render_panels(&self) -> Vec<RenderedPanel> {
        match &self.result {
            Some(result) => panels::render_panels(result, &self.flags, &self.options.marker),
            None => Vec::new(),
        }
    }

    fn fail(&mut self, error: SearchError) -> SearchError {
        tracing::debug!(error = %error, "Custom search rejected");
        self.status = error.status_message().to_string();
        error
    }
}

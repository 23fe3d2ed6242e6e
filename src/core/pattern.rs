// FlagSleuth - core/pattern.rs
//
// Pattern compiler: turns a user search string into a reusable matcher.
// Core layer: pure logic, no I/O or presentation dependencies.
//
// Two input forms:
//   - `PREFIX{}SUFFIX`: `{}` means "a brace-delimited fragment here". Prefix
//     and suffix are matched literally.
//   - anything else: a regular expression.
// Both are case-insensitive.

use crate::util::constants;
use crate::util::error::PatternError;
use regex::{Regex, RegexBuilder};

/// How the user's input was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Contained the `{}` placeholder.
    Wildcard,
    /// Compiled verbatim as a regular expression.
    Regex,
}

/// A compiled, reusable search predicate.
///
/// `Matcher` is `Send + Sync` and can be shared between independent sessions.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    input: String,
    kind: PatternKind,
}

impl Matcher {
    /// The trimmed user input this matcher was compiled from.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// The regular expression actually executed.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Compile a user search string.
///
/// Returns `Ok(None)` for an empty or whitespace-only pattern ("no pattern"),
/// and `Err` when the pattern cannot be compiled ("invalid pattern").
/// Never panics on user input.
pub fn compile(pattern: &str) -> Result<Option<Matcher>, PatternError> {
    let raw = pattern.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let (expr, kind) = match raw.split_once(constants::WILDCARD_PLACEHOLDER) {
        Some((prefix, suffix)) => (wildcard_expression(prefix, suffix), PatternKind::Wildcard),
        None => {
            if raw.len() > constants::MAX_REGEX_PATTERN_LENGTH {
                return Err(PatternError::TooLong {
                    length: raw.len(),
                    max_length: constants::MAX_REGEX_PATTERN_LENGTH,
                });
            }
            (raw.to_string(), PatternKind::Regex)
        }
    };

    // Wildcard input is escaped literals around a fixed body and cannot blow
    // up; only raw user regex is held to the compiled size limit.
    let size_limit = match kind {
        PatternKind::Wildcard => usize::MAX,
        PatternKind::Regex => constants::REGEX_SIZE_LIMIT,
    };

    let regex = RegexBuilder::new(&expr)
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
        .map_err(|e| PatternError::InvalidRegex {
            pattern: raw.to_string(),
            source: e,
        })?;

    tracing::debug!(
        pattern = %crate::util::logging::preview(raw),
        ?kind,
        "Search pattern compiled"
    );

    Ok(Some(Matcher {
        regex,
        input: raw.to_string(),
        kind,
    }))
}

/// Build the expression for `prefix{}suffix`. Only the first `{}` is the
/// placeholder; anything after it, including further `{}`, is literal.
fn wildcard_expression(prefix: &str, suffix: &str) -> String {
    format!(
        "{}{}{}",
        regex::escape(prefix),
        constants::WILDCARD_BODY_REGEX,
        regex::escape(suffix)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_all(matcher: &Matcher, text: &str) -> Vec<String> {
        matcher
            .regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_empty_pattern_is_no_pattern() {
        assert!(compile("").unwrap().is_none());
        assert!(compile("   \t\n").unwrap().is_none());
    }

    #[test]
    fn test_wildcard_matches_brace_fragment() {
        let m = compile("CTF{}").unwrap().unwrap();
        assert_eq!(m.kind(), PatternKind::Wildcard);
        assert_eq!(find_all(&m, "...CTF{abc123}..."), vec!["CTF{abc123}"]);
    }

    #[test]
    fn test_wildcard_is_case_insensitive() {
        let m = compile("flag{}").unwrap().unwrap();
        assert_eq!(find_all(&m, "xx FLAG{Mixed} yy"), vec!["FLAG{Mixed}"]);
    }

    #[test]
    fn test_wildcard_is_non_greedy() {
        let m = compile("CTF{}").unwrap().unwrap();
        assert_eq!(
            find_all(&m, "CTF{one} and CTF{two}"),
            vec!["CTF{one}", "CTF{two}"]
        );
    }

    #[test]
    fn test_wildcard_spans_newlines() {
        let m = compile("CTF{}").unwrap().unwrap();
        assert_eq!(find_all(&m, "CTF{multi\nline}"), vec!["CTF{multi\nline}"]);
    }

    #[test]
    fn test_wildcard_requires_braces() {
        let m = compile("CTF{}").unwrap().unwrap();
        assert!(!m.is_match("CTF is a game"));
    }

    #[test]
    fn test_wildcard_escapes_prefix_and_suffix() {
        // `.` and `+` are literal on both sides of the placeholder.
        let m = compile("a.b+{}.end").unwrap().unwrap();
        assert!(m.is_match("a.b+{x}.end"));
        assert!(!m.is_match("axbb{x}xend"));
    }

    #[test]
    fn test_only_first_placeholder_is_special() {
        let m = compile("A{}B{}").unwrap().unwrap();
        assert!(m.is_match("A{zz}B{}"));
        assert!(!m.is_match("A{zz}B{yy}"));
    }

    #[test]
    fn test_bare_placeholder_matches_any_brace_fragment() {
        let m = compile("{}").unwrap().unwrap();
        assert_eq!(find_all(&m, r#"{"a":1}"#), vec![r#"{"a":1}"#]);
    }

    #[test]
    fn test_regex_pattern_is_case_insensitive() {
        let m = compile(r"key_[0-9]+").unwrap().unwrap();
        assert_eq!(m.kind(), PatternKind::Regex);
        assert_eq!(find_all(&m, "KEY_42 key_7"), vec!["KEY_42", "key_7"]);
    }

    #[test]
    fn test_pattern_is_trimmed() {
        let m = compile("  CTF{}  ").unwrap().unwrap();
        assert_eq!(m.input(), "CTF{}");
    }

    #[test]
    fn test_invalid_regex_is_error_not_panic() {
        for bad in ["(", "[abc", "*", "a{2,1}"] {
            let result = compile(bad);
            assert!(
                matches!(result, Err(PatternError::InvalidRegex { .. })),
                "expected InvalidRegex for {bad:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_overlong_regex_rejected() {
        let long = "a".repeat(constants::MAX_REGEX_PATTERN_LENGTH + 1);
        assert!(matches!(compile(&long), Err(PatternError::TooLong { .. })));
    }

    #[test]
    fn test_long_wildcard_literal_still_compiles() {
        let long = format!("{}{{}}", "p".repeat(constants::MAX_REGEX_PATTERN_LENGTH + 10));
        assert!(compile(&long).unwrap().is_some());
    }

    #[test]
    fn test_very_long_case_folding_prefix_compiles() {
        // `k` also folds to the Kelvin sign, so each prefix char grows the
        // compiled program well past a plain literal.
        let prefix = "k".repeat(50_000);
        let matcher = compile(&format!("{prefix}{{}}"))
            .expect("wildcard input must always compile")
            .expect("non-empty pattern");
        assert_eq!(matcher.kind(), PatternKind::Wildcard);
        assert!(matcher.is_match(&format!("xx{}{{v}}", prefix.to_uppercase())));
    }

    #[test]
    fn test_too_long_message_counts_bytes() {
        let long = "é".repeat(constants::MAX_REGEX_PATTERN_LENGTH);
        let err = compile(&long).unwrap_err();
        assert!(
            err.to_string().contains(&format!("{} bytes", long.len())),
            "got: {err}"
        );
    }
}

// FlagSleuth - core/scanner.rs
//
// Corpus scanner: runs a compiled matcher over the serialised analysis
// result and collects a bounded, deduplicated set of matches.
// Core layer: pure logic, no I/O or presentation dependencies.
//
// Termination: every iteration moves the search position strictly forward.
// A zero-length match advances by one character, so matchers such as `a*`
// cannot stall the scan.

use crate::core::model::{AnalysisResult, MatchSet};
use crate::core::pattern::Matcher;

/// Scan the whole analysis result for `matcher`.
///
/// Collects at most `cap` distinct non-empty matches (clamped to
/// `MAX_CUSTOM_MATCHES`) in first-seen order. Does not mutate `result`.
pub fn scan(result: &AnalysisResult, matcher: &Matcher, cap: usize) -> MatchSet {
    let corpus = result.corpus();
    scan_text(&corpus, matcher, cap)
}

/// Scan an already-built corpus. See [`scan`].
pub fn scan_text(corpus: &str, matcher: &Matcher, cap: usize) -> MatchSet {
    let mut matches = MatchSet::with_cap(cap);
    let regex = matcher.regex();
    let mut pos = 0usize;
    let mut empty_hits = 0usize;

    while pos <= corpus.len() && !matches.is_full() {
        let Some(m) = regex.find_at(corpus, pos) else {
            break;
        };

        if m.start() == m.end() {
            empty_hits += 1;
            match next_char_boundary(corpus, m.end()) {
                Some(next) => pos = next,
                None => break,
            }
            continue;
        }

        matches.insert(m.as_str());
        pos = m.end();
    }

    tracing::debug!(
        corpus_len = corpus.len(),
        matches = matches.len(),
        cap = matches.cap(),
        truncated = matches.is_full(),
        empty_hits,
        "Corpus scan complete"
    );

    matches
}

/// Byte offset of the character after the one starting at `idx`, or `None`
/// at the end of `text`.
fn next_char_boundary(text: &str, idx: usize) -> Option<usize> {
    text[idx..].chars().next().map(|c| idx + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::compile;
    use crate::util::constants::MAX_CUSTOM_MATCHES;
    use serde_json::json;

    fn matcher(pattern: &str) -> Matcher {
        compile(pattern).unwrap().unwrap()
    }

    #[test]
    fn test_scan_dedupes_values() {
        let out = scan_text("aa aa aa", &matcher("aa"), MAX_CUSTOM_MATCHES);
        assert_eq!(out.as_slice(), &["aa"]);
    }

    #[test]
    fn test_scan_keeps_first_seen_order() {
        let out = scan_text("CTF{b} CTF{a} CTF{b}", &matcher("CTF{}"), 50);
        assert_eq!(out.as_slice(), &["CTF{b}", "CTF{a}"]);
    }

    #[test]
    fn test_scan_respects_cap() {
        let corpus: String = (0..500).map(|i| format!("k{i} ")).collect();
        let out = scan_text(&corpus, &matcher(r"k\d+"), MAX_CUSTOM_MATCHES);
        assert_eq!(out.len(), MAX_CUSTOM_MATCHES);
        assert_eq!(out.as_slice()[0], "k0");
        assert_eq!(out.as_slice()[49], "k49");
    }

    #[test]
    fn test_scan_cap_above_ceiling_is_clamped() {
        let corpus: String = (0..500).map(|i| format!("k{i} ")).collect();
        let out = scan_text(&corpus, &matcher(r"k\d+"), 10_000);
        assert_eq!(out.len(), MAX_CUSTOM_MATCHES);
    }

    #[test]
    fn test_scan_zero_cap_returns_empty() {
        let out = scan_text("aaa", &matcher("a"), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_width_matcher_terminates() {
        let corpus = "b".repeat(10_000);
        let out = scan_text(&corpus, &matcher("a*"), MAX_CUSTOM_MATCHES);
        assert!(out.is_empty());
    }

    #[test]
    fn test_zero_width_matcher_still_collects_real_matches() {
        let corpus = format!("{}aaa{}a", "x".repeat(5_000), "y".repeat(5_000));
        let out = scan_text(&corpus, &matcher("a*"), MAX_CUSTOM_MATCHES);
        assert_eq!(out.as_slice(), &["aaa", "a"]);
    }

    #[test]
    fn test_zero_width_matcher_with_multibyte_text() {
        let out = scan_text("ééé→→", &matcher("x?"), MAX_CUSTOM_MATCHES);
        assert!(out.is_empty());
    }

    #[test]
    fn test_anchor_only_pattern_terminates() {
        let out = scan_text("line one\nline two", &matcher("(?m)^"), MAX_CUSTOM_MATCHES);
        assert!(out.is_empty());
    }

    #[test]
    fn test_scan_result_reads_nested_fields() {
        let result = AnalysisResult::new(json!({
            "strings": {"ascii": {"sample": ["noise", "FLAG{def}"]}},
            "flags": {"flags": [{"flag": "FLAG{abc}", "source": "strings"}]}
        }));
        let out = scan(&result, &matcher("FLAG{}"), MAX_CUSTOM_MATCHES);
        assert!(out.contains("FLAG{def}"));
        assert!(out.contains("FLAG{abc}"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let result = AnalysisResult::new(json!({
            "z": "CTF{1}", "a": "CTF{2}", "m": {"k": "CTF{3}"}
        }));
        let first = scan(&result, &matcher("CTF{}"), 50);
        let second = scan(&result, &matcher("CTF{}"), 50);
        assert_eq!(first, second);
        assert_eq!(first.as_slice(), &["CTF{2}", "CTF{3}", "CTF{1}"]);
    }
}

// FlagSleuth - core/highlight.rs
//
// Highlighter: marks every occurrence of every known flag value in a block
// of raw text and escapes the result for embedding in HTML.
// Core layer: pure logic, no I/O or presentation dependencies.
//
// All spans are found against the original text in one pass and overlaps are
// resolved by earliest start, then longest match. The result does not depend
// on the order of the flag set. Output is built in a single pass, so text is
// escaped exactly once and marker tags are never escaped or re-matched.

use crate::core::model::FlagSet;
use crate::util::constants;
use aho_corasick::{AhoCorasick, MatchKind};

/// Opening and closing markup wrapped around each highlighted span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    open: String,
    close: String,
}

impl Marker {
    /// An inline `<span>` with the given CSS class.
    ///
    /// The class is escaped; callers that accept classes from configuration
    /// should still validate them.
    pub fn span(class: &str) -> Self {
        Self {
            open: format!("<span class=\"{}\">", escape_html(class)),
            close: "</span>".to_string(),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::span(constants::DEFAULT_MARKER_CLASS)
    }
}

/// One resolved highlight region of the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Byte offset of the first highlighted character.
    pub start: usize,
    /// Byte offset one past the last highlighted character.
    pub end: usize,
    /// Index into the flag set of the flag that produced this span.
    pub flag_index: usize,
}

/// Highlight all flag occurrences in `text` with the default marker.
pub fn highlight(text: &str, flags: &FlagSet) -> String {
    highlight_with(text, flags, &Marker::default())
}

/// Highlight all flag occurrences in `text` with `marker`.
///
/// Matching is literal and case-sensitive. With no flags, the result is the
/// escaped input.
pub fn highlight_with(text: &str, flags: &FlagSet, marker: &Marker) -> String {
    let spans = spans(text, flags);
    let mut out = String::with_capacity(text.len() + spans.len() * 32);
    let mut last = 0usize;

    for span in &spans {
        push_escaped(&mut out, &text[last..span.start]);
        out.push_str(&marker.open);
        push_escaped(&mut out, &text[span.start..span.end]);
        out.push_str(&marker.close);
        last = span.end;
    }
    push_escaped(&mut out, &text[last..]);

    out
}

/// Resolve the non-overlapping highlight spans of `text`, in text order.
pub fn spans(text: &str, flags: &FlagSet) -> Vec<HighlightSpan> {
    // Pattern ids map back to flag positions; empty values would match
    // everywhere and are skipped.
    let mut patterns: Vec<&str> = Vec::with_capacity(flags.len());
    let mut flag_indices: Vec<usize> = Vec::with_capacity(flags.len());
    for (idx, value) in flags.values().enumerate() {
        if !value.is_empty() {
            patterns.push(value);
            flag_indices.push(idx);
        }
    }

    if patterns.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let automaton = match AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&patterns)
    {
        Ok(a) => a,
        Err(e) => {
            tracing::warn!(
                error = %e,
                patterns = patterns.len(),
                "Failed to build highlight automaton; rendering without highlights"
            );
            return Vec::new();
        }
    };

    automaton
        .find_iter(text)
        .map(|m| HighlightSpan {
            start: m.start(),
            end: m.end(),
            flag_index: flag_indices[m.pattern().as_usize()],
        })
        .collect()
}

/// Escape `text` for safe embedding in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Flag;

    const OPEN: &str = "<span class=\"flag-hit\">";
    const CLOSE: &str = "</span>";

    fn flags(values: &[&str]) -> FlagSet {
        values.iter().map(|v| Flag::new(*v, "test")).collect()
    }

    fn mark(s: &str) -> String {
        format!("{OPEN}{s}{CLOSE}")
    }

    #[test]
    fn test_empty_flag_set_returns_escaped_text() {
        assert_eq!(highlight("a < b & c", &FlagSet::new()), "a &lt; b &amp; c");
    }

    #[test]
    fn test_no_flag_substrings_is_escaped_identity() {
        let text = "plain text with \"quotes\" and 'apostrophes'";
        assert_eq!(
            highlight(text, &flags(&["FLAG{zzz}"])),
            escape_html(text)
        );
    }

    #[test]
    fn test_highlights_every_occurrence() {
        let out = highlight("FLAG{a} x FLAG{a}", &flags(&["FLAG{a}"]));
        assert_eq!(out, format!("{} x {}", mark("FLAG{a}"), mark("FLAG{a}")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let out = highlight("flag{a}", &flags(&["FLAG{a}"]));
        assert_eq!(out, "flag{a}");
    }

    #[test]
    fn test_flag_value_is_literal_not_regex() {
        let out = highlight("a.b axb", &flags(&["a.b"]));
        assert_eq!(out, format!("{} axb", mark("a.b")));
    }

    #[test]
    fn test_flag_with_markup_characters_is_escaped_inside_marker() {
        let out = highlight("x <b>&</b> y", &flags(&["<b>&</b>"]));
        assert_eq!(out, format!("x {} y", mark("&lt;b&gt;&amp;&lt;/b&gt;")));
    }

    #[test]
    fn test_longest_match_wins_regardless_of_order() {
        let text = "FLAG{abc}";
        let short_first = highlight(text, &flags(&["abc", "FLAG{abc}"]));
        let long_first = highlight(text, &flags(&["FLAG{abc}", "abc"]));
        assert_eq!(short_first, mark("FLAG{abc}"));
        assert_eq!(short_first, long_first);
    }

    #[test]
    fn test_earliest_start_wins_on_partial_overlap() {
        // "abcd" and "cdef" overlap on "cd"; "abcd" starts first.
        let out = highlight("abcdef", &flags(&["cdef", "abcd"]));
        assert_eq!(out, format!("{}ef", mark("abcd")));
    }

    #[test]
    fn test_marker_text_is_never_rematched() {
        // A flag equal to part of the marker markup must not corrupt output.
        let out = highlight("span class", &flags(&["span", "class"]));
        assert_eq!(out, format!("{} {}", mark("span"), mark("class")));
    }

    #[test]
    fn test_spans_report_flag_index() {
        let set = flags(&["zz", "ab"]);
        let found = spans("ab zz", &set);
        assert_eq!(
            found,
            vec![
                HighlightSpan { start: 0, end: 2, flag_index: 1 },
                HighlightSpan { start: 3, end: 5, flag_index: 0 },
            ]
        );
    }

    #[test]
    fn test_empty_flag_value_is_ignored() {
        let set: FlagSet = vec![Flag::new("", "test"), Flag::new("x", "test")].into();
        assert_eq!(highlight("axa", &set), format!("a{}a", mark("x")));
    }

    #[test]
    fn test_custom_marker_class_is_escaped() {
        let marker = Marker::span("a\"b");
        assert_eq!(marker.open(), "<span class=\"a&quot;b\">");
    }

    #[test]
    fn test_multibyte_text_round_trips() {
        let out = highlight("→ CTF{é} ←", &flags(&["CTF{é}"]));
        assert_eq!(out, format!("→ {} ←", mark("CTF{é}")));
    }
}

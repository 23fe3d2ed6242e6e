// FlagSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// presentation dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// =============================================================================
// Analysis result
// =============================================================================

/// One complete backend analysis result: a read-only tree of named sections
/// (`file_info`, `strings`, `flags`, ...).
///
/// Immutable once received. A new analysis run replaces the whole value; it is
/// never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    value: Value,
}

impl AnalysisResult {
    /// Wrap an already-parsed JSON value.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// The underlying JSON tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// A top-level named section, if present.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.value.get(name)
    }

    /// Serialise the whole result into the flat search corpus.
    ///
    /// Compact JSON with object keys in sorted order at every level, so
    /// equal results always produce identical corpora.
    pub fn corpus(&self) -> String {
        canonicalize(&self.value).to_string()
    }

    /// True if the result carries a `flags` section with a `flags` array.
    ///
    /// The backend replaces a failed module's section with `{"error": ...}`,
    /// in which case there is no usable array.
    pub fn has_flags_section(&self) -> bool {
        self.reported_flag_entries().is_some()
    }

    /// The flags reported by the backend (`flags.flags[]`), in report order.
    ///
    /// Entries without a string `flag` field are skipped. A missing or
    /// non-string `source` becomes `"unknown"`.
    pub fn reported_flags(&self) -> FlagSet {
        let Some(entries) = self.reported_flag_entries() else {
            return FlagSet::new();
        };

        let mut set = FlagSet::new();
        let mut skipped = 0usize;
        for entry in entries {
            match entry.get("flag").and_then(Value::as_str) {
                Some(value) => {
                    let source = entry
                        .get("source")
                        .and_then(Value::as_str)
                        .unwrap_or(constants::UNKNOWN_SOURCE);
                    set.push(Flag::new(value, source));
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Ignored malformed backend flag entries");
        }
        set
    }

    fn reported_flag_entries(&self) -> Option<&Vec<Value>> {
        self.section("flags")
            .and_then(|flags| flags.get("flags"))
            .and_then(Value::as_array)
    }
}

/// Rebuild `value` with every object's keys inserted in sorted order.
///
/// Holds whether or not serde_json's `preserve_order` feature is active.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

impl From<Value> for AnalysisResult {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

// =============================================================================
// Flags
// =============================================================================

/// A string believed to be an artifact of interest, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flag {
    /// The literal matched text.
    pub value: String,

    /// Tool name or source path, or `"custom pattern"` for user-found matches.
    pub source: String,
}

impl Flag {
    pub fn new(value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }
}

/// Insertion-ordered sequence of flags, unique on `value`.
///
/// The first flag pushed for a value wins; later duplicates are dropped, never
/// overwritten. Sets only grow; there is no removal API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Flag>", into = "Vec<Flag>")]
pub struct FlagSet {
    flags: Vec<Flag>,
    seen: HashSet<String>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `flag` unless its value is already present.
    /// Returns true if the flag was added.
    pub fn push(&mut self, flag: Flag) -> bool {
        if self.seen.contains(&flag.value) {
            return false;
        }
        self.seen.insert(flag.value.clone());
        self.flags.push(flag);
        true
    }

    /// True if a flag with this exact value is present.
    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        self.flags.iter()
    }

    pub fn as_slice(&self) -> &[Flag] {
        &self.flags
    }

    /// Flag values in set order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|f| f.value.as_str())
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut set = FlagSet::new();
        for flag in iter {
            set.push(flag);
        }
        set
    }
}

impl From<Vec<Flag>> for FlagSet {
    fn from(flags: Vec<Flag>) -> Self {
        flags.into_iter().collect()
    }
}

impl From<FlagSet> for Vec<Flag> {
    fn from(set: FlagSet) -> Self {
        set.flags
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a Flag;
    type IntoIter = std::slice::Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

// =============================================================================
// Match set
// =============================================================================

/// Capped, deduplicated, insertion-ordered matched substrings of one search.
///
/// Ephemeral: recomputed on every search and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<String>")]
pub struct MatchSet {
    values: Vec<String>,
    seen: HashSet<String>,
    cap: usize,
}

impl MatchSet {
    /// Create an empty set holding at most `cap` values.
    ///
    /// `cap` is clamped to `MAX_CUSTOM_MATCHES`.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            values: Vec::new(),
            seen: HashSet::new(),
            cap: cap.min(constants::MAX_CUSTOM_MATCHES),
        }
    }

    /// Record a matched value. Empty, duplicate, and over-cap values are
    /// ignored. Returns true if the value was added.
    pub fn insert(&mut self, value: &str) -> bool {
        if value.is_empty() || self.is_full() || self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.values.push(value.to_string());
        true
    }

    /// True once the set holds `cap` values.
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.cap
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }
}

impl From<MatchSet> for Vec<String> {
    fn from(set: MatchSet) -> Self {
        set.values
    }
}

impl Default for MatchSet {
    fn default() -> Self {
        Self::with_cap(constants::MAX_CUSTOM_MATCHES)
    }
}

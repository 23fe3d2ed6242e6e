// FlagSleuth - core/merge.rs
//
// Flag merger: combines the known flag list with newly discovered values.
// Pure function; the caller decides whether to adopt the merged set.

use crate::core::model::{Flag, FlagSet, MatchSet};
use crate::util::constants::CUSTOM_PATTERN_SOURCE;

/// Merge `new_matches` into a copy of `existing`.
///
/// Every flag of `existing` is kept, in order. Each new value not already
/// present is appended with `source`, in discovery order. Nothing is ever
/// removed, so merging the same values twice adds nothing the second time.
pub fn merge<I, S>(existing: &FlagSet, new_matches: I, source: &str) -> FlagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut merged = existing.clone();
    for value in new_matches {
        let value = value.as_ref();
        if value.is_empty() {
            continue;
        }
        merged.push(Flag::new(value, source));
    }
    merged
}

/// Merge the results of a custom pattern search, tagged `"custom pattern"`.
pub fn merge_custom(existing: &FlagSet, matches: &MatchSet) -> FlagSet {
    merge(existing, matches.iter(), CUSTOM_PATTERN_SOURCE)
}

/// Values present in `merged` but not in `existing`, in merged order.
pub fn added_values<'a>(existing: &FlagSet, merged: &'a FlagSet) -> Vec<&'a str> {
    merged.values().filter(|v| !existing.contains(v)).collect()
}

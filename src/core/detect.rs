// FlagSleuth - core/detect.rs
//
// Built-in flag detector. Re-derives the backend's flag list from a result
// whose `flags` section is missing or failed, by scanning the string fields
// of the known analysis sections with the built-in flag patterns.
//
// Each hit is tagged with the dotted path of the field it came from
// (`strings.ascii`, `exif.exiftool.Comment`, ...).

use crate::core::model::{AnalysisResult, Flag, FlagSet};
use crate::util::constants::BUILTIN_FLAG_PATTERNS;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

/// Compiled built-in patterns, in detection order.
#[derive(Debug, Clone)]
pub struct FlagDetector {
    patterns: Vec<Regex>,
}

impl FlagDetector {
    /// Compile the built-in patterns.
    ///
    /// A pattern that fails to compile is logged and skipped.
    pub fn builtin() -> Self {
        let patterns = BUILTIN_FLAG_PATTERNS
            .iter()
            .filter_map(|p| {
                match RegexBuilder::new(p).case_insensitive(true).build() {
                    Ok(r) => Some(r),
                    Err(e) => {
                        tracing::warn!(pattern = p, error = %e, "Invalid built-in flag pattern, skipping");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Detect flags in every known text field of `result`.
    pub fn detect(&self, result: &AnalysisResult) -> FlagSet {
        let mut found = FlagSet::new();
        let mut hits = 0usize;
        for (source, text) in text_fields(result) {
            for pattern in &self.patterns {
                for m in pattern.find_iter(&text) {
                    hits += 1;
                    found.push(Flag::new(m.as_str(), source.as_str()));
                }
            }
        }
        tracing::debug!(hits, unique = found.len(), "Built-in flag detection complete");
        found
    }
}

/// Convenience wrapper: detect with the built-in patterns.
pub fn detect_flags(result: &AnalysisResult) -> FlagSet {
    FlagDetector::builtin().detect(result)
}

/// Collect `(source path, text)` for every field the detector inspects.
fn text_fields(result: &AnalysisResult) -> Vec<(String, String)> {
    let mut fields = Vec::new();

    if let Some(file_info) = object(result.section("file_info")) {
        push_string_values(&mut fields, "file_info", file_info);
    }

    if let Some(exif) = object(result.section("exif")) {
        for (tool, data) in exif {
            if let Some(data) = data.as_object() {
                push_string_values(&mut fields, &format!("exif.{tool}"), data);
            }
        }
    }

    if let Some(strings) = result.section("strings") {
        for key in ["ascii", "utf16"] {
            let sample = strings
                .get(key)
                .and_then(|s| s.get("sample"))
                .and_then(Value::as_array);
            for line in sample.into_iter().flatten().filter_map(Value::as_str) {
                fields.push((format!("strings.{key}"), line.to_string()));
            }
        }
    }

    push_string_at(&mut fields, result, &["binwalk", "summary"], "binwalk.summary");
    push_string_at(&mut fields, result, &["zsteg", "stdout"], "zsteg.stdout");

    for section in ["info", "extract"] {
        for stream in ["stdout", "stderr"] {
            push_string_at(
                &mut fields,
                result,
                &["steghide", section, stream],
                &format!("steghide.{section}.{stream}"),
            );
        }
    }

    if let Some(encodings) = object(result.section("encodings")) {
        for (enc_type, entries) in encodings {
            let decoded = entries
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|e| e.get("decoded").and_then(Value::as_str));
            for text in decoded {
                fields.push((format!("encodings.{enc_type}"), text.to_string()));
            }
        }
    }

    if let Some(lsb) = object(result.section("lsb")) {
        for (name, section) in lsb {
            let text = match section {
                Value::Object(_) => section.get("preview").and_then(Value::as_str),
                Value::String(s) => Some(s.as_str()),
                _ => None,
            };
            if let Some(text) = text {
                fields.push((format!("lsb.{name}"), text.to_string()));
            }
        }
    }

    fields
}

fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

fn push_string_values(fields: &mut Vec<(String, String)>, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        if let Some(text) = value.as_str() {
            fields.push((format!("{prefix}.{key}"), text.to_string()));
        }
    }
}

fn push_string_at(
    fields: &mut Vec<(String, String)>,
    result: &AnalysisResult,
    path: &[&str],
    source: &str,
) {
    let mut node = result.value();
    for key in path {
        match node.get(key) {
            Some(next) => node = next,
            None => return,
        }
    }
    if let Some(text) = node.as_str() {
        fields.push((source.to_string(), text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AnalysisResult {
        AnalysisResult::new(json!({
            "file_info": {"name": "input.png", "comment": "see FLAG{from_info}", "size": 10},
            "exif": {"exiftool": {"Comment": "ctf{exif_hit}", "Width": 10}},
            "strings": {
                "ascii": {"count": 2, "sample": ["junk", "genzipher{strings_hit}"]},
                "utf16": {"count": 0, "sample": []}
            },
            "binwalk": {"summary": "nothing here"},
            "zsteg": {"stdout": "b1,rgb,lsb,xy .. text: \"flag{zsteg_hit}\""},
            "steghide": {"info": {"stdout": "", "stderr": "CTF{steg_err}"}},
            "encodings": {"base64": [{"raw": "RkxBR3s=", "decoded": "FLAG{b64}"}]},
            "lsb": {"rgb": {"preview": "flag{lsb_hit}"}, "raw": "CTF{lsb_raw}"},
            "unrelated": "FLAG{not_scanned}"
        }))
    }

    #[test]
    fn test_detects_known_sections_with_source_paths() {
        let flags = detect_flags(&sample());
        let pairs: Vec<(&str, &str)> = flags
            .iter()
            .map(|f| (f.value.as_str(), f.source.as_str()))
            .collect();

        assert!(pairs.contains(&("FLAG{from_info}", "file_info.comment")));
        assert!(pairs.contains(&("ctf{exif_hit}", "exif.exiftool.Comment")));
        assert!(pairs.contains(&("genzipher{strings_hit}", "strings.ascii")));
        assert!(pairs.contains(&("flag{zsteg_hit}", "zsteg.stdout")));
        assert!(pairs.contains(&("CTF{steg_err}", "steghide.info.stderr")));
        assert!(pairs.contains(&("FLAG{b64}", "encodings.base64")));
        assert!(pairs.contains(&("flag{lsb_hit}", "lsb.rgb")));
        assert!(pairs.contains(&("CTF{lsb_raw}", "lsb.raw")));
    }

    #[test]
    fn test_sections_outside_the_known_set_are_ignored() {
        let flags = detect_flags(&sample());
        assert!(!flags.contains("FLAG{not_scanned}"));
    }

    #[test]
    fn test_error_sections_follow_field_rules() {
        let result = AnalysisResult::new(json!({
            "strings": {"error": "strings failed", "module": "strings"},
            "lsb": {"error": "FLAG{in_error_message}"}
        }));
        // `lsb.error` is a string section value, so it is scanned like a preview.
        let flags = detect_flags(&result);
        assert_eq!(flags.values().collect::<Vec<_>>(), vec!["FLAG{in_error_message}"]);
    }

    #[test]
    fn test_duplicate_hits_keep_first_source() {
        let result = AnalysisResult::new(json!({
            "file_info": {"a": "FLAG{same}"},
            "zsteg": {"stdout": "FLAG{same}"}
        }));
        let flags = detect_flags(&result);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.as_slice()[0].source, "file_info.a");
    }

    #[test]
    fn test_field_order_follows_result_order() {
        let result: AnalysisResult = serde_json::from_str::<Value>(
            r#"{"file_info": {"zeta": "FLAG{same}", "alpha": "FLAG{same}"}}"#,
        )
        .unwrap()
        .into();
        let flags = detect_flags(&result);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags.as_slice()[0].source, "file_info.zeta");
    }

    #[test]
    fn test_detection_is_non_greedy() {
        let result = AnalysisResult::new(json!({
            "binwalk": {"summary": "flag{a} and flag{b}"}
        }));
        let flags = detect_flags(&result);
        assert_eq!(flags.values().collect::<Vec<_>>(), vec!["flag{a}", "flag{b}"]);
    }
}

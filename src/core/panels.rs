// FlagSleuth - core/panels.rs
//
// Raw-text panels derived from an analysis result: the string-dump samples
// and pretty-printed JSON views of the tool sections. Every panel is passed
// through the highlighter before it reaches a display surface.

use crate::core::highlight::{highlight_with, Marker};
use crate::core::model::{AnalysisResult, FlagSet};
use crate::util::constants::{JSON_PANEL_SECTIONS, STRINGS_PANEL_MAX_LINES};
use serde::Serialize;
use serde_json::Value;

/// Which kind of content a panel holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    /// String-dump sample lines.
    Strings,
    /// Pretty-printed JSON of one result section.
    Json,
}

/// One block of raw text ready for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPanel {
    /// Stable identifier (`strings.ascii`, `exif`, ...).
    pub name: String,
    /// Display title.
    pub title: String,
    pub kind: PanelKind,
    /// Total item count reported by the backend (strings panels only).
    pub count: Option<u64>,
    /// The raw, unescaped text.
    pub text: String,
}

/// A panel after highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPanel {
    pub name: String,
    pub title: String,
    pub kind: PanelKind,
    pub count: Option<u64>,
    /// Escaped markup with flag occurrences marked.
    pub markup: String,
}

/// The ASCII and UTF-16 string-dump panels.
///
/// Each shows at most `STRINGS_PANEL_MAX_LINES` sample lines joined by `\n`.
/// A missing section yields an empty panel with a count of 0.
pub fn strings_panels(result: &AnalysisResult) -> Vec<TextPanel> {
    let strings = result.section("strings");
    [("ascii", "ASCII"), ("utf16", "UTF-16")]
        .into_iter()
        .map(|(key, title)| {
            let data = strings.and_then(|s| s.get(key));
            let count = data
                .and_then(|d| d.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let lines: Vec<&str> = data
                .and_then(|d| d.get("sample"))
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .take(STRINGS_PANEL_MAX_LINES)
                .map(|line| line.as_str().unwrap_or_default())
                .collect();
            TextPanel {
                name: format!("strings.{key}"),
                title: title.to_string(),
                kind: PanelKind::Strings,
                count: Some(count),
                text: lines.join("\n"),
            }
        })
        .collect()
}

/// Pretty-printed JSON panel for one section. Absent sections render `null`.
pub fn json_panel(result: &AnalysisResult, section: &str, title: &str) -> TextPanel {
    let value = result.section(section).unwrap_or(&Value::Null);
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        tracing::warn!(section, error = %e, "Failed to pretty-print section");
        value.to_string()
    });
    TextPanel {
        name: section.to_string(),
        title: title.to_string(),
        kind: PanelKind::Json,
        count: None,
        text,
    }
}

/// Every raw-text panel: JSON panels first, then the strings panels.
pub fn text_panels(result: &AnalysisResult) -> Vec<TextPanel> {
    let mut panels: Vec<TextPanel> = JSON_PANEL_SECTIONS
        .iter()
        .map(|(section, title)| json_panel(result, section, title))
        .collect();
    panels.extend(strings_panels(result));
    panels
}

/// Highlight one panel.
pub fn render_panel(panel: &TextPanel, flags: &FlagSet, marker: &Marker) -> RenderedPanel {
    RenderedPanel {
        name: panel.name.clone(),
        title: panel.title.clone(),
        kind: panel.kind,
        count: panel.count,
        markup: highlight_with(&panel.text, flags, marker),
    }
}

/// Highlight every raw-text panel of `result` against `flags`.
pub fn render_panels(result: &AnalysisResult, flags: &FlagSet, marker: &Marker) -> Vec<RenderedPanel> {
    text_panels(result)
        .iter()
        .map(|panel| render_panel(panel, flags, marker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Flag;
    use serde_json::json;

    #[test]
    fn test_strings_panel_caps_sample_lines() {
        let sample: Vec<String> = (0..400).map(|i| format!("line{i}")).collect();
        let result = AnalysisResult::new(json!({
            "strings": {"ascii": {"count": 9000, "sample": sample}}
        }));
        let panels = strings_panels(&result);
        let ascii = &panels[0];
        assert_eq!(ascii.name, "strings.ascii");
        assert_eq!(ascii.count, Some(9000));
        assert_eq!(ascii.text.lines().count(), STRINGS_PANEL_MAX_LINES);
        assert!(ascii.text.ends_with("line299"));
    }

    #[test]
    fn test_missing_strings_section_gives_empty_panels() {
        let panels = strings_panels(&AnalysisResult::new(json!({})));
        assert_eq!(panels.len(), 2);
        assert!(panels.iter().all(|p| p.text.is_empty() && p.count == Some(0)));
        assert_eq!(panels[1].title, "UTF-16");
    }

    #[test]
    fn test_json_panel_for_absent_section_is_null() {
        let panel = json_panel(&AnalysisResult::new(json!({})), "exif", "EXIF");
        assert_eq!(panel.text, "null");
    }

    #[test]
    fn test_render_panels_highlights_every_panel() {
        let result = AnalysisResult::new(json!({
            "zsteg": {"stdout": "hit FLAG{z}"},
            "strings": {"ascii": {"count": 1, "sample": ["<FLAG{z}>"]}}
        }));
        let flags: FlagSet = vec![Flag::new("FLAG{z}", "zsteg.stdout")].into();
        let rendered = render_panels(&result, &flags, &Marker::default());

        assert_eq!(rendered.len(), JSON_PANEL_SECTIONS.len() + 2);
        let zsteg = rendered.iter().find(|p| p.name == "zsteg").unwrap();
        assert!(zsteg.markup.contains("<span class=\"flag-hit\">FLAG{z}</span>"));
        let ascii = rendered.iter().find(|p| p.name == "strings.ascii").unwrap();
        assert_eq!(
            ascii.markup,
            "&lt;<span class=\"flag-hit\">FLAG{z}</span>&gt;"
        );
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON output for machine consumption (`-format=json`).

use jacy_ast::{SourceMap, Span};
use serde::Serialize;

use crate::{SuggKind, Suggestion};

/// All suggestions of one stage.
#[derive(Debug, Serialize)]
pub struct SuggestionReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    /// Stage that produced the suggestions ("lex", "parse", "resolve").
    pub stage: String,
    pub success: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub suggestions: Vec<JsonSuggestion>,
}

#[derive(Debug, Serialize)]
pub struct JsonSuggestion {
    pub kind: SuggKind,
    pub message: String,
    pub location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<JsonLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonLink {
    pub message: String,
    pub location: SourceLocation,
}

/// 1-based line and column.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl SuggestionReport {
    pub fn new(stage: &str, suggestions: &[Suggestion], source_map: &SourceMap) -> Self {
        let error_count = suggestions.iter().filter(|s| s.kind() == SuggKind::Error).count();
        Self {
            version: 1,
            stage: stage.to_string(),
            success: error_count == 0,
            error_count,
            warning_count: suggestions.len() - error_count,
            suggestions: suggestions.iter().map(|s| to_json(s, source_map)).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn to_json(sugg: &Suggestion, source_map: &SourceMap) -> JsonSuggestion {
    match sugg {
        Suggestion::Msg { kind, message, span } => JsonSuggestion {
            kind: *kind,
            message: message.clone(),
            location: location(*span, source_map),
            link: None,
            help: None,
        },
        Suggestion::MsgSpanLink { kind, span_msg, span, link_msg, link } => JsonSuggestion {
            kind: *kind,
            message: span_msg.clone(),
            location: location(*span, source_map),
            link: Some(JsonLink { message: link_msg.clone(), location: location(*link, source_map) }),
            help: None,
        },
        Suggestion::Help { inner, help } => {
            let mut json = to_json(inner, source_map);
            json.help = Some(help.clone());
            json
        }
    }
}

fn location(span: Span, source_map: &SourceMap) -> SourceLocation {
    let file = source_map
        .get_source_file(span.file)
        .map(|f| f.path.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let (line, col) = source_map.span_to_line_col(span).unwrap_or((1, 0));
    SourceLocation { file, line, column: col + 1, length: span.len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::LineMap;

    #[test]
    fn report_carries_location_link_and_help() {
        let mut sm = SourceMap::new();
        let file = sm.add_source("main.jc");
        let src = "val x = 1\nval x = 2";
        sm.set_source(file, src, LineMap::new(src));

        let sugg = Suggestion::error("duplicate", Span::new(14, 1, file))
            .with_link("first here", Span::new(4, 1, file))
            .with_help("rename it");
        let report = SuggestionReport::new("resolve", &[sugg], &sm);

        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        let s = &report.suggestions[0];
        assert_eq!(s.location, SourceLocation { file: "main.jc".into(), line: 2, column: 5, length: 1 });
        assert_eq!(s.link.as_ref().map(|l| l.location.line), Some(1));
        assert_eq!(s.help.as_deref(), Some("rename it"));

        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"error\""));
        assert!(json.contains("\"stage\": \"resolve\""));
    }
}

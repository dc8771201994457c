//! Parsed prompt templates.
//!
//! A template is raw text with named placeholders delimited by `◄` and `►`,
//! e.g. `Hello, ◄name►!`. Placeholder names are lower-cased at parse time so
//! references match case-insensitively.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use parley_types::error::TemplateError;

/// Marker opening a placeholder.
pub const PLACEHOLDER_START: char = '◄';

/// Marker closing a placeholder.
pub const PLACEHOLDER_END: char = '►';

/// One placeholder occurrence inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Lower-cased referenced key.
    pub name: String,
    /// Byte span of the occurrence in the raw text, markers included.
    pub span: Range<usize>,
}

/// Immutable parsed representation of one raw text blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
    placeholders: Vec<Placeholder>,
}

impl Template {
    /// Parse raw markup.
    ///
    /// Scans left to right for a start marker and the next end marker after
    /// it. An end marker with no preceding start marker is literal text; a
    /// start marker with no end marker after it is an error.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TemplateError> {
        let raw = raw.into();
        let mut placeholders = Vec::new();
        let mut search_from = 0;

        while let Some(rel_start) = raw[search_from..].find(PLACEHOLDER_START) {
            let start = search_from + rel_start;
            let name_start = start + PLACEHOLDER_START.len_utf8();
            let rel_end = raw[name_start..]
                .find(PLACEHOLDER_END)
                .ok_or(TemplateError::UnmatchedStartMarker { position: start })?;
            let name_end = name_start + rel_end;
            let end = name_end + PLACEHOLDER_END.len_utf8();

            placeholders.push(Placeholder {
                name: raw[name_start..name_end].to_lowercase(),
                span: start..end,
            });
            search_from = end;
        }

        Ok(Self { raw, placeholders })
    }

    /// The original text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Every placeholder occurrence, in text order.
    pub fn occurrences(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Distinct placeholder names referenced anywhere in the template.
    pub fn placeholder_names(&self) -> BTreeSet<String> {
        self.placeholders.iter().map(|p| p.name.clone()).collect()
    }

    /// A template with no placeholders renders to itself.
    pub fn is_leaf(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Substitute a value at every placeholder occurrence.
    ///
    /// Fails listing every distinct name that has no value. Literal text
    /// between placeholders is copied unchanged.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let missing: BTreeSet<&str> = self
            .placeholders
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| !values.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::MissingValues {
                names: missing.into_iter().map(String::from).collect(),
            });
        }

        let mut out = String::with_capacity(self.raw.len());
        let mut last = 0;
        for placeholder in &self.placeholders {
            out.push_str(&self.raw[last..placeholder.span.start]);
            out.push_str(&values[&placeholder.name]);
            last = placeholder.span.end;
        }
        out.push_str(&self.raw[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_templating() {
        let template = Template::parse("Hello, ◄name►! I'm ◄bot_name►.").unwrap();
        let names = template.placeholder_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains("name"));
        assert!(names.contains("bot_name"));
        let rendered = template
            .render(&values(&[("name", "John"), ("bot_name", "ChatBot")]))
            .unwrap();
        assert_eq!(rendered, "Hello, John! I'm ChatBot.");
    }

    #[test]
    fn test_placeholder_at_start_and_end() {
        let template = Template::parse("◄name►! I'm ◄bot_name►").unwrap();
        let rendered = template
            .render(&values(&[("name", "John"), ("bot_name", "ChatBot")]))
            .unwrap();
        assert_eq!(rendered, "John! I'm ChatBot");
    }

    #[test]
    fn test_no_placeholders_renders_unchanged() {
        let template = Template::parse("Hello, Bill! I'm Bot").unwrap();
        assert!(template.is_leaf());
        assert_eq!(
            template.render(&values(&[("name", "John")])).unwrap(),
            "Hello, Bill! I'm Bot"
        );
        assert_eq!(template.render(&HashMap::new()).unwrap(), "Hello, Bill! I'm Bot");
    }

    #[test]
    fn test_empty_template() {
        let template = Template::parse("").unwrap();
        assert!(template.is_leaf());
        assert_eq!(template.render(&HashMap::new()).unwrap(), "");
    }

    #[test]
    fn test_adjacent_placeholders() {
        let template = Template::parse("◄a►◄b►").unwrap();
        assert_eq!(template.occurrences().len(), 2);
        assert_eq!(
            template.render(&values(&[("a", "1"), ("b", "2")])).unwrap(),
            "12"
        );
    }

    #[test]
    fn test_repeated_placeholder_substituted_everywhere() {
        let template = Template::parse("◄x► and ◄X► and ◄x►").unwrap();
        assert_eq!(template.occurrences().len(), 3);
        assert_eq!(template.placeholder_names().len(), 1);
        assert_eq!(
            template.render(&values(&[("x", "v")])).unwrap(),
            "v and v and v"
        );
    }

    #[test]
    fn test_names_are_lowercased() {
        let template = Template::parse("◄User-Name►").unwrap();
        assert_eq!(template.occurrences()[0].name, "user-name");
    }

    #[test]
    fn test_spans_are_byte_offsets_including_markers() {
        let raw = "ab◄cd►ef";
        let template = Template::parse(raw).unwrap();
        let span = template.occurrences()[0].span.clone();
        assert_eq!(&raw[span], "◄cd►");
    }

    #[test]
    fn test_unmatched_start_marker_fails() {
        let err = Template::parse("Hello ◄name").unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedStartMarker { position: 6 });
    }

    #[test]
    fn test_end_marker_before_start_is_literal() {
        let template = Template::parse("► then ◄a►").unwrap();
        assert_eq!(template.placeholder_names().len(), 1);
        assert_eq!(
            template.render(&values(&[("a", "x")])).unwrap(),
            "► then x"
        );
    }

    #[test]
    fn test_render_lists_every_missing_name() {
        let template = Template::parse("◄b► ◄a► ◄c► ◄a►").unwrap();
        let err = template.render(&values(&[("c", "3")])).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingValues {
                names: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_roundtrip_preserves_literal_text() {
        let raw = "x ◄one► y ◄two►z◄one►";
        let template = Template::parse(raw).unwrap();
        let rendered = template
            .render(&values(&[("one", "◄one►"), ("two", "◄two►")]))
            .unwrap();
        assert_eq!(rendered, raw);
    }
}

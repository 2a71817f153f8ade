//! Placeholder scanning for raw templates.
//!
//! A raw template is literal text interleaved with `{{.TypeName}}` markers. Whitespace
//! inside the braces is ignored (`{{ .TypeName }}`), a stray `}}` is ordinary text, and an
//! opening `{{` without its closing `}}` is a syntax error.

use crate::core::{PhrasegenError, Result};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One chunk of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Placeholder(String),
}

/// Split a raw template into literal and placeholder segments.
///
/// Adjacent literal text is merged, so segments alternate except where two placeholders
/// touch.
pub(crate) fn parse_segments(raw: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = raw;

    while let Some(open) = rest.find(OPEN) {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            let offset = raw.len() - rest.len() + open;
            return Err(syntax_error(raw, format!("unclosed '{OPEN}' at byte {offset}")));
        };

        let name = placeholder_name(raw, &after_open[..close])?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder(name.to_string()));
        rest = &after_open[close + CLOSE.len()..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn placeholder_name<'a>(raw: &str, inner: &'a str) -> Result<&'a str> {
    let inner = inner.trim();
    let Some(name) = inner.strip_prefix('.') else {
        return Err(syntax_error(
            raw,
            format!("placeholder '{inner}' must reference a type as '.TypeName'"),
        ));
    };
    if !is_valid_name(name) {
        return Err(syntax_error(raw, format!("invalid placeholder name '{name}'")));
    }
    Ok(name)
}

/// Letters or `_` first, then letters, digits or `_`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn syntax_error(raw: &str, reason: String) -> PhrasegenError {
    PhrasegenError::TemplateSyntax {
        template: raw.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn ph(s: &str) -> Segment {
        Segment::Placeholder(s.to_string())
    }

    #[test]
    fn test_parse_segments() {
        assert_eq!(
            parse_segments("aaa{{.NestTest}}ccc").unwrap(),
            vec![lit("aaa"), ph("NestTest"), lit("ccc")]
        );
        assert_eq!(
            parse_segments("{{.A}}{{ .B }}").unwrap(),
            vec![ph("A"), ph("B")]
        );
        assert_eq!(parse_segments("plain text").unwrap(), vec![lit("plain text")]);
        assert!(parse_segments("").unwrap().is_empty());
    }

    #[test]
    fn test_unicode_names_and_stray_close() {
        assert_eq!(
            parse_segments("こんにちは{{.名前}}さん }}").unwrap(),
            vec![lit("こんにちは"), ph("名前"), lit("さん }}")]
        );
    }

    #[test]
    fn test_syntax_errors() {
        for raw in ["aaa{{.Open", "{{Name}}", "{{.}}", "{{.1abc}}", "{{.a-b}}", "{{ }}"] {
            let err = parse_segments(raw).unwrap_err();
            assert!(
                matches!(err, PhrasegenError::TemplateSyntax { .. }),
                "{raw} should fail to parse"
            );
        }
    }
}

//! `@import` extraction
//!
//! A small tokenizer that walks CSS text, skipping comments, strings and
//! blocks, and reports every top-level `@import` statement together with the
//! byte range it occupies. Removal of consumed statements splices those ranges
//! out, so it does not depend on how the statement was formatted.
//!
//! Anything the tokenizer does not recognise is skipped; malformed statements
//! produce no match rather than an error.

use std::ops::Range;

const IMPORT_KEYWORD: &[u8] = b"@import";

/// One `@import` statement found in a stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// The imported path exactly as written (quotes and `url()` removed)
    pub path: String,
    /// Media query list following the path, if any
    pub condition: Option<String>,
    /// `layer` or `layer(name)`; an empty name is an anonymous layer
    pub layer: Option<String>,
    /// Contents of a `supports(...)` clause
    pub supports: Option<String>,
    /// Byte range of the whole statement, including the terminating `;`
    pub span: Range<usize>,
}

impl ImportStatement {
    /// Raw statement text as it appears in `css`
    #[must_use]
    pub fn raw<'a>(&self, css: &'a str) -> &'a str {
        &css[self.span.clone()]
    }
}

/// Find every top-level `@import` statement in `css`, in source order
#[must_use]
pub fn extract_imports(css: &str) -> Vec<ImportStatement> {
    let bytes = css.as_bytes();
    let mut imports = Vec::new();
    let mut depth = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                pos = skip_comment(bytes, pos);
            }
            quote @ (b'"' | b'\'') => {
                pos = string_end(bytes, pos, quote);
            }
            b'{' => {
                depth += 1;
                pos += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                pos += 1;
            }
            b'@' if depth == 0 && starts_with_keyword(bytes, pos) => {
                match parse_import(css, pos) {
                    Some(import) => {
                        pos = import.span.end;
                        imports.push(import);
                    }
                    None => pos += IMPORT_KEYWORD.len(),
                }
            }
            _ => pos += 1,
        }
    }

    imports
}

/// Remove the given statements from `css`.
///
/// `statements` must come from [`extract_imports`] on the same text.
#[must_use]
pub fn strip_statements(css: &str, statements: &[ImportStatement]) -> String {
    let mut out = String::with_capacity(css.len());
    let mut last = 0usize;

    for statement in statements {
        if statement.span.start < last {
            continue;
        }
        out.push_str(&css[last..statement.span.start]);
        last = statement.span.end;
    }

    out.push_str(&css[last..]);
    out
}

fn starts_with_keyword(bytes: &[u8], pos: usize) -> bool {
    let end = pos + IMPORT_KEYWORD.len();
    if end > bytes.len() || !bytes[pos..end].eq_ignore_ascii_case(IMPORT_KEYWORD) {
        return false;
    }
    // `@imports` or `@import-foo` is a different at-rule
    bytes
        .get(end)
        .is_none_or(|b| !(b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_'))
}

fn parse_import(css: &str, start: usize) -> Option<ImportStatement> {
    let bytes = css.as_bytes();
    let mut pos = skip_whitespace(bytes, start + IMPORT_KEYWORD.len());

    let path = match bytes.get(pos)? {
        quote @ (b'"' | b'\'') => {
            let (value, end) = skip_string(bytes, pos, *quote)?;
            pos = end;
            value
        }
        _ if bytes[pos..].len() >= 4 && bytes[pos..pos + 4].eq_ignore_ascii_case(b"url(") => {
            let (value, end) = parse_url_function(bytes, pos + 4)?;
            pos = end;
            value
        }
        _ => return None,
    };

    let path = css.get(path)?.trim();
    if path.is_empty() {
        return None;
    }

    // Condition runs to the terminating `;` (or end of input)
    let condition_start = pos;
    let mut end = bytes.len();
    let mut condition_end = bytes.len();
    while pos < bytes.len() {
        match bytes[pos] {
            b';' => {
                condition_end = pos;
                end = pos + 1;
                break;
            }
            b'{' | b'}' => return None,
            quote @ (b'"' | b'\'') => {
                pos = skip_string(bytes, pos, quote)?.1;
            }
            _ => pos += 1,
        }
    }

    let (layer, supports, condition) = split_conditions(&css[condition_start..condition_end]);

    Some(ImportStatement {
        path: path.to_string(),
        condition,
        layer,
        supports,
        span: start..end,
    })
}

/// Split the text after the path into layer, supports and media parts.
///
/// `layer` and `supports(...)` are only recognised in that order and ahead of
/// the media query list.
fn split_conditions(tail: &str) -> (Option<String>, Option<String>, Option<String>) {
    let mut rest = tail.trim_start();

    let layer = if let Some((name, after)) = function_args(rest, "layer") {
        rest = after;
        Some(name.trim().to_string())
    } else if starts_with_ident(rest, "layer") {
        rest = &rest["layer".len()..];
        Some(String::new())
    } else {
        None
    };

    rest = rest.trim_start();
    let supports = match function_args(rest, "supports") {
        Some((args, after)) => {
            rest = after;
            Some(args.trim().to_string())
        }
        None => None,
    };

    let media = rest.trim();
    (layer, supports, (!media.is_empty()).then(|| media.to_string()))
}

/// Arguments of `name(...)` at the start of `text` and what follows the `)`
fn function_args<'a>(text: &'a str, name: &str) -> Option<(&'a str, &'a str)> {
    let open = name.len();
    if !text.get(..open)?.eq_ignore_ascii_case(name) || text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[open + 1..offset], &text[offset + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `text` starts with the bare identifier `ident`
fn starts_with_ident(text: &str, ident: &str) -> bool {
    text.get(..ident.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(ident))
        && text.as_bytes().get(ident.len()).is_none_or(u8::is_ascii_whitespace)
}

/// Parse the inside of `url(...)` starting right after the `(`.
/// Returns the value range and the position after `)`.
fn parse_url_function(bytes: &[u8], pos: usize) -> Option<(Range<usize>, usize)> {
    let mut pos = skip_whitespace(bytes, pos);

    let value = match bytes.get(pos)? {
        quote @ (b'"' | b'\'') => {
            let (value, end) = skip_string(bytes, pos, *quote)?;
            pos = end;
            value
        }
        _ => {
            let value_start = pos;
            while pos < bytes.len() && bytes[pos] != b')' && !bytes[pos].is_ascii_whitespace() {
                if matches!(bytes[pos], b'"' | b'\'' | b'(') {
                    return None;
                }
                pos += 1;
            }
            value_start..pos
        }
    };

    pos = skip_whitespace(bytes, pos);
    (bytes.get(pos) == Some(&b')')).then_some((value, pos + 1))
}

/// Skip a quoted string starting at `pos`.
/// Returns the range of its contents and the position after the closing quote.
fn skip_string(bytes: &[u8], pos: usize, quote: u8) -> Option<(Range<usize>, usize)> {
    let mut cursor = pos + 1;
    while cursor < bytes.len() {
        match bytes[cursor] {
            b'\\' => cursor += 2,
            b'\n' => return None,
            b if b == quote => return Some((pos + 1..cursor, cursor + 1)),
            _ => cursor += 1,
        }
    }
    None
}

/// End of a string token for scanning purposes; a bad string stops at the newline
fn string_end(bytes: &[u8], pos: usize, quote: u8) -> usize {
    skip_string(bytes, pos, quote).map_or_else(
        || {
            bytes[pos + 1..]
                .iter()
                .position(|b| *b == b'\n')
                .map_or(bytes.len(), |offset| pos + 1 + offset)
        },
        |(_, end)| end,
    )
}

fn skip_comment(bytes: &[u8], pos: usize) -> usize {
    let mut cursor = pos + 2;
    while cursor + 1 < bytes.len() {
        if bytes[cursor] == b'*' && bytes[cursor + 1] == b'/' {
            return cursor + 2;
        }
        cursor += 1;
    }
    bytes.len()
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_and_url_forms() {
        let css = "@import \"a.css\";\n@import 'b.css';\n@import url(c.css);\n@import url( \"d.css\" );";
        let paths: Vec<_> = extract_imports(css).into_iter().map(|i| i.path).collect();
        assert_eq!(paths, vec!["a.css", "b.css", "c.css", "d.css"]);
    }

    #[test]
    fn test_condition_and_raw_statement() {
        let css = "@import url(\"sub.css\") screen;\nbody { color: red; }";
        let imports = extract_imports(css);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "sub.css");
        assert_eq!(imports[0].condition.as_deref(), Some("screen"));
        assert_eq!(imports[0].raw(css), "@import url(\"sub.css\") screen;");
    }

    #[test]
    fn test_media_query_list_condition() {
        let css = "@import 'print.css' print, (max-width: 600px);";
        let imports = extract_imports(css);
        assert_eq!(
            imports[0].condition.as_deref(),
            Some("print, (max-width: 600px)")
        );
    }

    #[test]
    fn test_layer_and_supports_are_split_from_media() {
        let css = "@import url(base.css) layer(base);\n\
@import 'reset.css' layer;\n\
@import \"grid.css\" LAYER( theme.grid ) supports(display: grid) screen and (min-width: 600px);\n\
@import 'flex.css' supports(not (display: grid));";
        let imports = extract_imports(css);
        assert_eq!(imports.len(), 4);

        assert_eq!(imports[0].layer.as_deref(), Some("base"));
        assert_eq!(imports[0].condition, None);

        assert_eq!(imports[1].layer.as_deref(), Some(""));
        assert_eq!(imports[1].condition, None);

        assert_eq!(imports[2].layer.as_deref(), Some("theme.grid"));
        assert_eq!(imports[2].supports.as_deref(), Some("display: grid"));
        assert_eq!(
            imports[2].condition.as_deref(),
            Some("screen and (min-width: 600px)")
        );

        assert_eq!(imports[3].layer, None);
        assert_eq!(imports[3].supports.as_deref(), Some("not (display: grid)"));
        assert_eq!(imports[3].condition, None);
    }

    #[test]
    fn test_layer_prefix_of_media_type_is_not_a_layer() {
        let imports = extract_imports("@import 'a.css' layered, print;");
        assert_eq!(imports[0].layer, None);
        assert_eq!(imports[0].condition.as_deref(), Some("layered, print"));
    }

    #[test]
    fn test_strip_removes_only_statements() {
        let css = "@import \"a.css\";\n  @IMPORT url(b.css)  print ;\nbody{margin:0}";
        let imports = extract_imports(css);
        assert_eq!(imports.len(), 2);
        assert_eq!(strip_statements(css, &imports), "\n  \nbody{margin:0}");
    }

    #[test]
    fn test_ignores_comments_strings_and_blocks() {
        let css = r#"/* @import "nope.css"; */
a::before { content: "@import 'nope.css';"; }
@media screen { @import "nested.css"; }
@import "yes.css";"#;
        let imports = extract_imports(css);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].path, "yes.css");
    }

    #[test]
    fn test_malformed_statements_are_skipped() {
        for css in [
            "@import ;",
            "@import \"unterminated.css;\nbody{}",
            "@import url(a b.css);",
            "@import \"\";",
            "@import \"x.css\" { }",
            "@imports \"x.css\";",
        ] {
            assert!(extract_imports(css).is_empty(), "expected no match in {css:?}");
        }
    }

    #[test]
    fn test_statement_without_semicolon_at_end_of_input() {
        let css = "@import 'last.css'";
        let imports = extract_imports(css);
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].span, 0..css.len());
        assert_eq!(strip_statements(css, &imports), "");
    }

    #[test]
    fn test_non_ascii_content_keeps_spans_on_char_boundaries() {
        let css = "/* ünïcödé */ @import \"ä.css\";";
        let imports = extract_imports(css);
        assert_eq!(imports[0].path, "ä.css");
        assert_eq!(strip_statements(css, &imports), "/* ünïcödé */ ");
    }
}

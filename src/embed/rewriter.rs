//! Resource URL rewriting for fetched stylesheets
//!
//! Once a stylesheet is moved into the document, its relative `url(...)`
//! references would resolve against the page instead of the stylesheet. The
//! rewriter absolutizes them against the address the stylesheet was fetched
//! from.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::utils::has_scheme;

// Matches url("..."), url('...') and url(...), capturing only the value so the
// surrounding quoting and whitespace can be kept as written
static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?xi)
        \burl\(
        \s*
        (?:
            "(?P<double>[^"]*)"
            |
            '(?P<single>[^']*)'
            |
            (?P<unquoted>[^)"'\s]*)
        )
        \s*
        \)
        "#,
    )
    .expect("CSS_URL_RE: hardcoded regex is valid")
});

// Markup that leaked into a stylesheet, typically from an inline SVG data URI
static NESTED_STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>.*?</style\s*>").expect("NESTED_STYLE_RE: hardcoded regex is valid")
});

static STYLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(style)").expect("STYLE_CLOSE_RE: hardcoded regex is valid"));

/// Rewrite every scheme-less `url(...)` in `css` to an absolute URL resolved
/// against `stylesheet_url`.
///
/// Values that already carry a scheme (`http:`, `data:`, ...), empty values and
/// fragment references such as `url(#filter)` are left untouched. If
/// `stylesheet_url` is not an absolute URL the input is returned unchanged.
#[must_use]
pub fn absolutize_css_urls(css: &str, stylesheet_url: &str) -> String {
    let base = match Url::parse(stylesheet_url) {
        Ok(base) => base,
        Err(e) => {
            log::warn!("Cannot rewrite urls relative to '{stylesheet_url}': {e}");
            return css.to_string();
        }
    };

    let mut out = String::with_capacity(css.len());
    let mut last = 0usize;

    for caps in CSS_URL_RE.captures_iter(css) {
        let Some(value) = caps
            .name("double")
            .or_else(|| caps.name("single"))
            .or_else(|| caps.name("unquoted"))
        else {
            continue;
        };

        let raw = value.as_str().trim();
        if raw.is_empty() || raw.starts_with('#') || has_scheme(raw) {
            continue;
        }

        match base.join(raw) {
            Ok(resolved) => {
                out.push_str(&css[last..value.start()]);
                out.push_str(resolved.as_str());
                last = value.end();
            }
            Err(e) => {
                log::debug!("Leaving unresolvable url({raw}) in {stylesheet_url}: {e}");
            }
        }
    }

    out.push_str(&css[last..]);
    out
}

/// Remove `<style>...</style>` markup that appears literally inside a
/// stylesheet body and neutralise any remaining `</style` sequence, so the body
/// cannot close the `<style>` element it is embedded in.
#[must_use]
pub fn strip_nested_style_tags(css: &str) -> Cow<'_, str> {
    let stripped = NESTED_STYLE_RE.replace_all(css, "");
    if STYLE_CLOSE_RE.is_match(&stripped) {
        // `\/` is a valid CSS escape for `/`
        Cow::Owned(STYLE_CLOSE_RE.replace_all(&stripped, r"<\/$1").into_owned())
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "http://example.com/css/main.css";

    #[test]
    fn test_relative_to_stylesheet_not_page() {
        assert_eq!(
            absolutize_css_urls("a{background:url(bg.png)}", SHEET),
            "a{background:url(http://example.com/css/bg.png)}"
        );
        assert_eq!(
            absolutize_css_urls("a{background:url(assets/bg.png)}", SHEET),
            "a{background:url(http://example.com/css/assets/bg.png)}"
        );
        assert_eq!(
            absolutize_css_urls("a{background:url(../img/bg.png)}", SHEET),
            "a{background:url(http://example.com/img/bg.png)}"
        );
    }

    #[test]
    fn test_keeps_quotes_and_whitespace() {
        let css = r#"a{b:url( "x.png" )} c{d:url('y.png')} e{f:URL(  z.png  )}"#;
        assert_eq!(
            absolutize_css_urls(css, SHEET),
            r#"a{b:url( "http://example.com/css/x.png" )} c{d:url('http://example.com/css/y.png')} e{f:URL(  http://example.com/css/z.png  )}"#
        );
    }

    #[test]
    fn test_leaves_fragments_and_schemes() {
        let css = "a{filter:url(#blur)} b{c:url(data:image/png;base64,AAAA)} d{e:url(https://cdn.io/x.png)} f{g:url()}";
        assert_eq!(absolutize_css_urls(css, SHEET), css);
    }

    #[test]
    fn test_protocol_and_root_relative() {
        assert_eq!(
            absolutize_css_urls("a{b:url(//cdn.io/x.png)} c{d:url(/x.png)}", SHEET),
            "a{b:url(http://cdn.io/x.png)} c{d:url(http://example.com/x.png)}"
        );
    }

    #[test]
    fn test_unparsable_stylesheet_url_is_noop() {
        let css = "a{b:url(x.png)}";
        assert_eq!(absolutize_css_urls(css, "main.css"), css);
    }

    #[test]
    fn test_strip_nested_style_tags() {
        let css = r#"a{b:url("data:image/svg+xml,<svg><style>.c{fill:red}</style></svg>")}"#;
        assert_eq!(
            strip_nested_style_tags(css),
            r#"a{b:url("data:image/svg+xml,<svg></svg>")}"#
        );
    }

    #[test]
    fn test_stray_closing_tag_is_escaped() {
        assert_eq!(strip_nested_style_tags("a{content:'</style>'}"), r"a{content:'<\/style>'}");
        assert!(matches!(strip_nested_style_tags("a{}"), Cow::Borrowed(_)));
    }
}

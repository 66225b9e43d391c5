//! URL normalization utilities.
//!
//! Every stylesheet href goes through [`normalize_href`] before it is used as a
//! deduplication key or fetch target, so two spellings of the same address
//! collapse into one.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`, then `:`
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("SCHEME_RE: hardcoded regex is valid")
});

/// Percent-encode the characters of `href` that are not valid URL code points.
///
/// Existing `%XX` escapes are kept as they are, which makes the function
/// idempotent: encoding an already-encoded href returns it unchanged. A `%`
/// that does not start a valid escape is encoded as `%25`.
#[must_use]
pub fn encode_href(href: &str) -> String {
    let bytes = href.as_bytes();
    let mut encoded = String::with_capacity(href.len());
    let mut buf = [0u8; 4];

    for (idx, ch) in href.char_indices() {
        if ch == '%' {
            let valid_escape = bytes.len() > idx + 2
                && bytes[idx + 1].is_ascii_hexdigit()
                && bytes[idx + 2].is_ascii_hexdigit();
            encoded.push_str(if valid_escape { "%" } else { "%25" });
        } else if is_url_code_point(ch) {
            encoded.push(ch);
        } else {
            encoded.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }

    encoded
}

fn is_url_code_point(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '!' | '#' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '-' | '.' | '/' | ':'
                | ';' | '=' | '?' | '@' | '[' | ']' | '_' | '~'
        )
}

/// Normalize a raw stylesheet href into the address used for deduplication
/// and fetching.
///
/// The href is trimmed and percent-encoded first. With a `base`, it is then
/// resolved using standard reference resolution, so absolute, protocol-relative
/// (`//host/path`), root-relative (`/path`) and dot-segment (`./`, `../`)
/// references all produce an absolute address. Without a base, or when the base
/// cannot be parsed, the encoded href is returned unresolved.
#[must_use]
pub fn normalize_href(raw_href: &str, base: Option<&str>) -> String {
    let encoded = encode_href(raw_href.trim());

    let Some(base) = base else {
        return encoded;
    };

    match Url::parse(base).and_then(|base_url| base_url.join(&encoded)) {
        Ok(resolved) => resolved.to_string(),
        Err(e) => {
            log::warn!("Failed to resolve '{encoded}' against base '{base}': {e}");
            encoded
        }
    }
}

/// Check whether a URL value carries its own scheme (`http:`, `data:`, ...)
#[must_use]
pub fn has_scheme(value: &str) -> bool {
    SCHEME_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_trailing_slash_is_irrelevant() {
        assert_eq!(
            normalize_href("main.css", Some("http://example.com")),
            "http://example.com/main.css"
        );
        assert_eq!(
            normalize_href("main.css", Some("http://example.com/")),
            "http://example.com/main.css"
        );
    }

    #[test]
    fn test_relative_forms_resolve_to_same_address() {
        let base = Some("http://example.com");
        for href in ["up/../main.css", "/main.css", "./main.css"] {
            assert_eq!(
                normalize_href(href, base),
                "http://example.com/main.css",
                "href {href} should resolve to the root stylesheet"
            );
        }
    }

    #[test]
    fn test_absolute_hrefs_ignore_base() {
        assert_eq!(
            normalize_href("http://example.com/main.css", Some("http://example.com")),
            "http://example.com/main.css"
        );
        assert_eq!(
            normalize_href("https://example.com/main.css", Some("https://example.com")),
            "https://example.com/main.css"
        );
    }

    #[test]
    fn test_protocol_relative_inherits_scheme() {
        assert_eq!(
            normalize_href("//external.io/assets/main.css", Some("http://example.com")),
            "http://external.io/assets/main.css"
        );
        assert_eq!(
            normalize_href("//example.com/assets/main.css", Some("https://example.com")),
            "https://example.com/assets/main.css"
        );
    }

    #[test]
    fn test_root_relative_discards_base_path() {
        assert_eq!(
            normalize_href("/main.css", Some("http://example.com/blog/post/")),
            "http://example.com/main.css"
        );
    }

    #[test]
    fn test_without_base_returns_encoded_href() {
        assert_eq!(normalize_href("my styles/main.css", None), "my%20styles/main.css");
        assert_eq!(normalize_href(" main.css ", None), "main.css");
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let once = encode_href("fonts/Ünïcode name.css?family=a|b");
        assert_eq!(once, "fonts/%C3%9Cn%C3%AFcode%20name.css?family=a%7Cb");
        assert_eq!(encode_href(&once), once);
    }

    #[test]
    fn test_stray_percent_is_encoded() {
        assert_eq!(encode_href("100%.css"), "100%25.css");
        assert_eq!(encode_href("a%2Fb.css"), "a%2Fb.css");
    }

    #[test]
    fn test_unparsable_base_falls_back_to_encoded() {
        assert_eq!(normalize_href("main.css", Some("not a url")), "main.css");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://example.com/a.png"));
        assert!(has_scheme("data:image/png;base64,AAAA"));
        assert!(!has_scheme("//cdn.example.com/a.png"));
        assert!(!has_scheme("assets/a.png"));
        assert!(!has_scheme("#filter"));
    }
}

//! Narrow `url(...)` rewriting over CSS text
//!
//! This is not a CSS parser. It scans for `url(` followed by an optional
//! quote, a reference, the matching quote and `)`, and hands each reference
//! to a resolver. Everything between matches is copied through untouched, so
//! stylesheets the scanner does not understand are never damaged.
//!
//! A match is replaced by the normalized form `url('<absolute>')` only when
//! the resolver returns an `http` or `https` URL; quotes, backslashes and
//! line breaks in it are percent-encoded. Empty, unresolvable and
//! non-HTTP references (`data:` images, fragment-only SVG references) keep
//! their original text.
//!
//! ```rust
//! use html_rebaser::css::rewrite_css_urls;
//!
//! let css = "body { background: url(bg.png) } .x { background: url('') }";
//! let out = rewrite_css_urls(css, |r| Some(format!("https://example.com/{r}")));
//! assert_eq!(out, "body { background: url('https://example.com/bg.png') } .x { background: url('') }");
//! ```

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn url_token_regex() -> Option<&'static Regex> {
    static URL_TOKEN_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    URL_TOKEN_REGEX
        .get_or_init(|| {
            Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^'"\s)][^)]*?))\s*\)"#).ok()
        })
        .as_ref()
}

/// Rewrite every `url(...)` reference in `css` through `resolve`
///
/// Returns the input borrowed when nothing changed.
pub fn rewrite_css_urls<F>(css: &str, mut resolve: F) -> Cow<'_, str>
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(regex) = url_token_regex() else {
        return Cow::Borrowed(css);
    };

    let rewritten = regex.replace_all(css, |caps: &Captures| {
        let original = caps.get(0).map_or("", |m| m.as_str()).to_string();
        let Some(reference) = caps.get(1).or(caps.get(2)).or(caps.get(3)) else {
            return original;
        };
        let reference = reference.as_str().trim();
        if reference.is_empty() {
            return original;
        }

        match resolve(reference) {
            Some(absolute) if is_http_url(&absolute) => {
                format!("url('{}')", escape_css_string(&absolute))
            }
            _ => original,
        }
    });

    // `replace_all` returns an owned string whenever a closure replacer ran,
    // even if every replacement equals its match.
    if rewritten == css {
        Cow::Borrowed(css)
    } else {
        Cow::Owned(rewritten.into_owned())
    }
}

/// Percent-encode the characters that would end or break a single-quoted
/// CSS string
fn escape_css_string(url: &str) -> Cow<'_, str> {
    if !url.contains(['\'', '\\', '\n', '\r', '\x0C']) {
        return Cow::Borrowed(url);
    }
    let mut escaped = String::with_capacity(url.len() + 8);
    for c in url.chars() {
        match c {
            '\'' => escaped.push_str("%27"),
            '\\' => escaped.push_str("%5C"),
            '\n' => escaped.push_str("%0A"),
            '\r' => escaped.push_str("%0D"),
            '\x0C' => escaped.push_str("%0C"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn is_http_url(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

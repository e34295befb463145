//! Origin context and reference resolution
//!
//! An [`Origin`] is the effective URL a document was retrieved from, after
//! redirects. It is the resolution base for every relative reference in the
//! document and is immutable for one pipeline run.
//!
//! # Resolution rules
//!
//! - Leading and trailing ASCII whitespace is ignored, as browsers do
//! - References that already carry a valid scheme are returned unchanged,
//!   byte for byte (`https://other.org/x` stays `https://other.org/x`),
//!   except a special scheme with no `//` authority (`http:page.html`),
//!   which is joined onto the base like any relative reference
//! - Relative, root-relative and protocol-relative references are joined
//!   onto the base with WHATWG URL semantics
//! - A reference whose leading segment looks like a scheme but is not a
//!   valid one (`ht!tp://`) is malformed, as is anything the URL parser
//!   rejects (`http://[::1`)
//!
//! ```rust
//! use html_rebaser::origin::Origin;
//!
//! let origin = Origin::parse("https://example.com/a/").unwrap();
//! assert_eq!(origin.resolve("b.html").as_deref(), Some("https://example.com/a/b.html"));
//! assert_eq!(origin.resolve("//cdn.example.net/x.png").as_deref(), Some("https://cdn.example.net/x.png"));
//! assert_eq!(origin.resolve("https://other.org/x").as_deref(), Some("https://other.org/x"));
//! assert_eq!(origin.resolve("ht!tp://"), None);
//! ```

use std::fmt;
use url::Url;

use crate::error::RebaseError;

/// Validated absolute `http`/`https` URL used as the resolution base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    url: Url,
}

impl Origin {
    /// Parse and validate an origin URL
    ///
    /// # Errors
    ///
    /// Returns `RebaseError::InvalidOrigin` if the value is not an absolute
    /// URL, its scheme is not `http` or `https`, or it has no host.
    pub fn parse(origin_url: &str) -> Result<Self, RebaseError> {
        let url = Url::parse(origin_url.trim())
            .map_err(|e| RebaseError::InvalidOrigin(format!("{}: {}", origin_url, e)))?;
        Self::from_url(url)
    }

    /// Validate an already parsed URL as an origin
    pub fn from_url(url: Url) -> Result<Self, RebaseError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RebaseError::InvalidOrigin(format!(
                "{}: scheme must be http or https",
                url
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(RebaseError::InvalidOrigin(format!("{}: missing host", url)));
        }
        Ok(Self { url })
    }

    /// The origin URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Host name, used as the fallback document title
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Resolve a reference against this origin
    ///
    /// Returns `None` if the reference is malformed. See the module
    /// documentation for the rules.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim_matches(|c: char| c.is_ascii_whitespace());

        match leading_scheme(reference) {
            Scheme::Valid if is_scheme_relative(reference) => {
                self.url.join(reference).ok().map(String::from)
            }
            Scheme::Valid => Url::parse(reference).ok().map(|_| reference.to_string()),
            Scheme::Invalid => None,
            Scheme::None => self.url.join(reference).ok().map(String::from),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Classification of the text before a reference's first `:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    /// No scheme delimiter before the path, query or fragment starts
    None,
    /// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`
    Valid,
    /// Something scheme-shaped that no URL parser would accept
    Invalid,
}

fn leading_scheme(reference: &str) -> Scheme {
    let Some(end) = reference.find([':', '/', '?', '#']) else {
        return Scheme::None;
    };
    if !reference[end..].starts_with(':') {
        return Scheme::None;
    }

    let candidate = &reference[..end];
    let mut chars = candidate.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if starts_alpha && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Scheme::Valid
    } else {
        Scheme::Invalid
    }
}

/// Whether a reference names a special scheme without an authority
///
/// `http:page.html` carries a scheme but is still resolved against the base
/// by the URL standard, so it cannot be kept verbatim.
fn is_scheme_relative(reference: &str) -> bool {
    const SPECIAL_SCHEMES: [&str; 6] = ["http", "https", "ws", "wss", "ftp", "file"];

    let Some((scheme, rest)) = reference.split_once(':') else {
        return false;
    };
    SPECIAL_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme))
        && !rest
            .get(..2)
            .is_some_and(|lead| lead.chars().all(|c| matches!(c, '/' | '\\')))
}

/// Lowercased scheme of a URL-bearing attribute value, if it has one
///
/// ASCII whitespace and control characters are ignored while reading the
/// scheme, because browsers strip them before parsing: `java\tscript:` is
/// still `javascript`.
pub fn url_scheme(value: &str) -> Option<String> {
    let mut scheme = String::new();
    for c in value.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_control() {
            continue;
        }
        match c {
            ':' => {
                return (!scheme.is_empty()).then_some(scheme);
            }
            '/' | '?' | '#' => return None,
            _ => scheme.push(c.to_ascii_lowercase()),
        }
    }
    None
}

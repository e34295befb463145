//! HTML5 parsing and serialization using html5ever
//!
//! The parser is the leaf of the rewrite pipeline. It uses html5ever, which
//! implements the WHATWG parsing algorithm, so malformed or hostile markup is
//! recovered from the same way a browser would: there is no input for which
//! parsing fails. The worst case is a degenerate tree (for example, all
//! content folded into a single text node under `<body>`).
//!
//! # Examples
//!
//! ```rust
//! use html_rebaser::parser::{parse_html, serialize_document};
//!
//! let dom = parse_html("<p>Unclosed <b>markup");
//! let html = serialize_document(&dom);
//! assert!(html.contains("<p>Unclosed <b>markup</b></p>"));
//! ```
//!
//! # Configuration
//!
//! The parser uses default html5ever configuration:
//! - **Scripting flag**: enabled, matching how a browser parses `<noscript>`
//!   (the sanitizer removes `<noscript>` regardless)
//! - **Error handling**: parse errors are recovered from, never surfaced
//! - **Tree builder**: `RcDom` reference-counted nodes

use html5ever::parse_document;
use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::charset::decode_html;
use crate::error::RebaseError;

/// Parse a UTF-8 string into a document tree
///
/// Never fails; see the module documentation.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Decode fetched bytes and parse them into a document tree
///
/// The charset is taken from a BOM, the `Content-Type` header, a `<meta>`
/// declaration, or defaults to UTF-8 (see [`crate::charset`]).
///
/// # Errors
///
/// - `RebaseError::EncodingError`: the bytes are invalid for the detected
///   charset, or the charset is unsupported
pub fn parse_html_bytes(html: &[u8], content_type: Option<&str>) -> Result<RcDom, RebaseError> {
    let text = decode_html(html, content_type)?;
    Ok(parse_html(&text))
}

/// Serialize a document tree back to markup
///
/// Serialization is the inverse of [`parse_html`] for trees the parser
/// produces; text under raw-text elements such as `<style>` is written
/// verbatim, everything else is escaped.
pub fn serialize_document(dom: &RcDom) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let handle = SerializableHandle::from(dom.document.clone());
    // Writing into a Vec cannot fail.
    if serialize(&mut buf, &handle, SerializeOpts::default()).is_err() {
        return String::new();
    }
    // The serializer only writes UTF-8 from UTF-8 tendrils.
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

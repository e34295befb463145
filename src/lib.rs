//! HTML Rebaser - sanitize untrusted HTML and rebase it onto its origin
//!
//! This library turns a document fetched from a remote origin into markup
//! that is safe to show inside an isolated viewer: active content is removed
//! and every relative reference is rewritten to an absolute URL, with a
//! fallback `<base>` installed for anything the rewrite does not cover.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `parser`: HTML5 parsing and serialization using html5ever
//! - `dom`: small helpers over `markup5ever_rcdom` handles
//! - `charset`: character encoding detection and decoding
//! - `origin`: validated origin URL and reference resolution
//! - `policy`: allow/deny configuration for tags, attributes and schemes
//! - `sanitizer`: policy-driven removal of unsafe structure
//! - `srcset`: `srcset` candidate parsing
//! - `css`: `url(...)` rewriting in CSS text
//! - `rebaser`: relative-to-absolute reference rewriting
//! - `metadata`: title extraction
//! - `pipeline`: the composed sanitize-and-rebase entry points
//!
//! Sanitization always runs before rebasing, so no reference is rewritten
//! before its scheme has been checked.

// Module declarations
pub mod charset;
pub mod css;
pub mod dom;
pub mod error;
pub mod metadata;
pub mod origin;
pub mod parser;
pub mod pipeline;
pub mod policy;
pub mod rebaser;
pub mod sanitizer;
pub mod srcset;

// Re-export main types for convenience
pub use error::RebaseError;
pub use origin::Origin;
pub use parser::{parse_html, serialize_document};
pub use pipeline::{
    CONTENT_SECURITY_POLICY, RewriteOptions, RewrittenPage, Rewriter, sanitize_and_rebase,
};
pub use policy::ContentPolicy;

//! The sanitize-and-rebase pipeline
//!
//! ```text
//! raw HTML + origin URL -> parse -> sanitize -> rebase -> serialize
//!                                      \-> title
//! ```
//!
//! Each run owns its document tree and only reads the [`ContentPolicy`], so
//! one policy can serve any number of concurrent runs. The transform itself
//! is synchronous and bounded by the size of one document; the only limits
//! are enforced at the byte boundary ([`Rewriter::rewrite_response`]) before
//! parsing starts.
//!
//! # Examples
//!
//! ```rust
//! use html_rebaser::pipeline::sanitize_and_rebase;
//!
//! let page = sanitize_and_rebase(
//!     r#"<title>Docs</title><script>alert(1)</script><a href="guide.html">Guide</a>"#,
//!     "https://example.com/docs/",
//! ).unwrap();
//!
//! assert_eq!(page.title, "Docs");
//! assert!(!page.html.contains("<script"));
//! assert!(page.html.contains(r#"href="https://example.com/docs/guide.html""#));
//! assert!(page.html.contains(r#"<base href="https://example.com/docs/">"#));
//! ```

use markup5ever_rcdom::RcDom;
use std::sync::OnceLock;
use tracing::debug;

use crate::charset::is_html_content_type;
use crate::error::RebaseError;
use crate::metadata::extract_title;
use crate::origin::Origin;
use crate::parser::{parse_html, parse_html_bytes, serialize_document};
use crate::policy::ContentPolicy;
use crate::rebaser::Rebaser;
use crate::sanitizer::Sanitizer;

/// `Content-Security-Policy` value the transport layer attaches to responses
/// carrying rewritten markup
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'";

/// Default cap on response bodies accepted by [`Rewriter::rewrite_response`]
pub const DEFAULT_MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

/// Pipeline options
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Largest body `rewrite_response` accepts, in bytes
    pub max_input_bytes: usize,
    /// Read the title from the document; when off, the origin host is used
    pub extract_title: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            extract_title: true,
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenPage {
    /// Sanitized, rebased markup
    pub html: String,
    /// Document title, or the origin host
    pub title: String,
    /// Normalized origin URL the document was rebased against
    pub url: String,
}

/// Pipeline bound to a read-only content policy
///
/// # Examples
///
/// ```rust
/// use html_rebaser::pipeline::{RewriteOptions, Rewriter};
/// use html_rebaser::policy::ContentPolicy;
///
/// let policy = ContentPolicy::default().allow_tags(["form"]);
/// let rewriter = Rewriter::with_options(&policy, RewriteOptions {
///     max_input_bytes: 1024 * 1024,
///     ..Default::default()
/// });
///
/// let page = rewriter
///     .sanitize_and_rebase(r#"<form action="/x"><input name="q"></form>"#, "https://example.com/")
///     .unwrap();
/// assert!(page.html.contains(r#"<form><input name="q"></form>"#));
/// ```
pub struct Rewriter<'p> {
    policy: &'p ContentPolicy,
    options: RewriteOptions,
}

impl<'p> Rewriter<'p> {
    /// Create a rewriter with default options
    pub fn new(policy: &'p ContentPolicy) -> Self {
        Self::with_options(policy, RewriteOptions::default())
    }

    /// Create a rewriter with custom options
    pub fn with_options(policy: &'p ContentPolicy, options: RewriteOptions) -> Self {
        Self { policy, options }
    }

    /// Sanitize and rebase an HTML string
    ///
    /// # Errors
    ///
    /// Returns `RebaseError::InvalidOrigin` if `origin_url` is not an
    /// absolute `http`/`https` URL. Any markup, however malformed, produces
    /// output.
    pub fn sanitize_and_rebase(
        &self,
        raw_html: &str,
        origin_url: &str,
    ) -> Result<RewrittenPage, RebaseError> {
        let origin = Origin::parse(origin_url)?;
        debug!(origin = %origin, input_bytes = raw_html.len(), "rewriting document");
        Ok(self.rewrite_document(parse_html(raw_html), &origin))
    }

    /// Sanitize and rebase a fetched response body
    ///
    /// This is the entry point for the network collaborator: it validates
    /// the origin, enforces the size cap, rejects non-HTML content types and
    /// decodes the body with the detected charset before running the
    /// pipeline. A missing content type is treated as HTML.
    ///
    /// # Errors
    ///
    /// - `RebaseError::InvalidOrigin`: `origin_url` is not `http`/`https`
    /// - `RebaseError::InputTooLarge`: body exceeds `max_input_bytes`
    /// - `RebaseError::UnsupportedContentType`: content type is not HTML
    /// - `RebaseError::EncodingError`: body is invalid for its charset
    pub fn rewrite_response(
        &self,
        body: &[u8],
        content_type: Option<&str>,
        origin_url: &str,
    ) -> Result<RewrittenPage, RebaseError> {
        let origin = Origin::parse(origin_url)?;

        if body.len() > self.options.max_input_bytes {
            return Err(RebaseError::InputTooLarge {
                size: body.len(),
                limit: self.options.max_input_bytes,
            });
        }
        if let Some(content_type) = content_type
            && !is_html_content_type(content_type)
        {
            return Err(RebaseError::UnsupportedContentType(content_type.to_string()));
        }

        debug!(origin = %origin, input_bytes = body.len(), content_type, "rewriting response");
        let dom = parse_html_bytes(body, content_type)?;
        Ok(self.rewrite_document(dom, &origin))
    }

    fn rewrite_document(&self, dom: RcDom, origin: &Origin) -> RewrittenPage {
        let sanitized = Sanitizer::new(self.policy).sanitize(&dom);
        let rebased = Rebaser::new(origin).rebase(&dom);
        debug!(
            removed_elements = sanitized.removed_elements,
            removed_attributes = sanitized.removed_attributes,
            rewritten = rebased.rewritten,
            unresolved = rebased.unresolved,
            "document rewritten"
        );

        let title = if self.options.extract_title {
            extract_title(&dom, origin)
        } else {
            origin.host().to_string()
        };

        RewrittenPage {
            html: serialize_document(&dom),
            title,
            url: origin.as_str().to_string(),
        }
    }
}

fn default_policy() -> &'static ContentPolicy {
    static DEFAULT_POLICY: OnceLock<ContentPolicy> = OnceLock::new();
    DEFAULT_POLICY.get_or_init(ContentPolicy::default)
}

/// Sanitize and rebase with the default policy and options
///
/// # Errors
///
/// Returns `RebaseError::InvalidOrigin` if `origin_url` is not an absolute
/// `http`/`https` URL.
pub fn sanitize_and_rebase(raw_html: &str, origin_url: &str) -> Result<RewrittenPage, RebaseError> {
    Rewriter::new(default_policy()).sanitize_and_rebase(raw_html, origin_url)
}

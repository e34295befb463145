//! Rewriting relative references to absolute URLs
//!
//! The rebaser walks a *sanitized* tree and makes every resource reference it
//! knows about independently resolvable. It only rewrites values the sanitizer
//! already accepted; it never adds an attribute other than `href` on the
//! fallback `<base>` and the internal-link marker.
//!
//! # Passes
//!
//! Each pass is an independent walk that skips what it does not target:
//!
//! 1. **Links**: `a@href`, `area@href`. Resolved values are written back and
//!    the element is marked with [`INTERNAL_LINK_ATTRIBUTE`]. A malformed
//!    value loses its `href`; the element and its text stay.
//! 2. **Sources**: every `src`, plus `link@href`. A malformed value is left
//!    as it is.
//! 3. **Responsive sources**: every `srcset`. Only URL tokens are resolved,
//!    descriptors are kept exactly, and malformed candidates pass through.
//! 4. **Stylesheets**: `url(...)` references in `<style>` text and in
//!    `style` attributes.
//! 5. **Base**: every existing `<base>`, wherever the parser placed it, is
//!    pinned to `href="<origin>"`; if there is none, `<base href="<origin>">`
//!    becomes the first child of `<head>`.
//!
//! References always resolve against the [`Origin`]. A document-declared
//! `<base href>` is never used as a resolution base.
//!
//! Already-absolute references are never touched, so running the rebaser
//! twice produces the same tree as running it once.

use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::borrow::Cow;
use tracing::trace;

use crate::css::rewrite_css_urls;
use crate::dom::{
    create_element, find_head, for_each_element, get_attr, is_element, prepend_child,
    remove_attr, set_attr,
};
use crate::origin::{Origin, url_scheme};
use crate::policy::INTERNAL_LINK_ATTRIBUTE;
use crate::srcset::{parse_srcset, serialize_srcset};

/// Counts of what a rebasing run changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RebaseReport {
    /// Attribute or text values that were written back
    pub rewritten: usize,
    /// References that failed to resolve
    pub unresolved: usize,
    /// Whether a fallback `<base>` was inserted
    pub base_inserted: bool,
}

/// Rebaser for one origin
pub struct Rebaser<'a> {
    origin: &'a Origin,
}

impl<'a> Rebaser<'a> {
    pub fn new(origin: &'a Origin) -> Self {
        Self { origin }
    }

    /// Rebase a sanitized document in place
    pub fn rebase(&self, dom: &RcDom) -> RebaseReport {
        let document = &dom.document;
        let origin = self.origin;

        let mut report = RebaseReport::default();
        rewrite_links(document, origin, &mut report);
        rewrite_sources(document, origin, &mut report);
        rewrite_srcsets(document, origin, &mut report);
        rewrite_stylesheets(document, origin, &mut report);

        if !pin_existing_bases(document, origin, &mut report)
            && let Some(head) = find_head(document)
        {
            prepend_child(&head, create_element("base", &[("href", origin.as_str())]));
            report.base_inserted = true;
        }

        report
    }
}

/// Point every `<base>` in the tree at the origin
///
/// Returns whether any `<base>` exists.
fn pin_existing_bases(document: &Handle, origin: &Origin, report: &mut RebaseReport) -> bool {
    let mut found = false;
    for_each_element(document, &mut |node| {
        if !is_element(node, "base") {
            return;
        }
        found = true;
        let href = get_attr(node, "href");
        if href.as_deref() != Some(origin.as_str()) {
            trace!(value = ?href, "pinning document base to origin");
            set_attr(node, "href", origin.as_str());
            report.rewritten += 1;
        }
    });
    found
}

fn rewrite_links(document: &Handle, origin: &Origin, report: &mut RebaseReport) {
    for_each_element(document, &mut |node| {
        if !(is_element(node, "a") || is_element(node, "area")) {
            return;
        }
        let Some(href) = get_attr(node, "href") else {
            return;
        };
        if matches!(url_scheme(&href).as_deref(), Some("javascript" | "data")) {
            return;
        }

        match origin.resolve(&href) {
            Some(absolute) => {
                if absolute != href {
                    set_attr(node, "href", &absolute);
                    report.rewritten += 1;
                }
                set_attr(node, INTERNAL_LINK_ATTRIBUTE, "true");
            }
            None => {
                trace!(attribute = "href", value = %href, "dropping unresolvable link");
                remove_attr(node, "href");
                report.unresolved += 1;
            }
        }
    });
}

fn rewrite_sources(document: &Handle, origin: &Origin, report: &mut RebaseReport) {
    for_each_element(document, &mut |node| {
        let attribute = if is_element(node, "link") { "href" } else { "src" };
        let Some(value) = get_attr(node, attribute) else {
            return;
        };

        match origin.resolve(&value) {
            Some(absolute) if absolute != value => {
                set_attr(node, attribute, &absolute);
                report.rewritten += 1;
            }
            Some(_) => {}
            None => {
                trace!(attribute, value = %value, "leaving unresolvable source");
                report.unresolved += 1;
            }
        }
    });
}

fn rewrite_srcsets(document: &Handle, origin: &Origin, report: &mut RebaseReport) {
    for_each_element(document, &mut |node| {
        let Some(value) = get_attr(node, "srcset") else {
            return;
        };
        let candidates = parse_srcset(&value);
        if candidates.is_empty() {
            return;
        }

        let rewritten = serialize_srcset(candidates.iter().map(|candidate| {
            let url = origin.resolve(candidate.url).unwrap_or_else(|| {
                trace!(attribute = "srcset", value = candidate.url, "leaving unresolvable candidate");
                report.unresolved += 1;
                candidate.url.to_string()
            });
            (url, candidate.descriptor)
        }));

        if rewritten != value {
            set_attr(node, "srcset", &rewritten);
            report.rewritten += 1;
        }
    });
}

fn rewrite_stylesheets(document: &Handle, origin: &Origin, report: &mut RebaseReport) {
    let resolve = |reference: &str| origin.resolve(reference);

    for_each_element(document, &mut |node| {
        if is_element(node, "style") {
            for child in node.children.borrow().iter() {
                if let NodeData::Text { ref contents } = child.data {
                    let mut contents = contents.borrow_mut();
                    let rewritten = match rewrite_css_urls(&contents, resolve) {
                        Cow::Owned(css) => Some(css),
                        Cow::Borrowed(_) => None,
                    };
                    if let Some(css) = rewritten {
                        *contents = StrTendril::from_slice(&css);
                        report.rewritten += 1;
                    }
                }
            }
        }

        if let Some(style) = get_attr(node, "style")
            && let Cow::Owned(css) = rewrite_css_urls(&style, resolve)
        {
            set_attr(node, "style", &css);
            report.rewritten += 1;
        }
    });
}

//! Policy-driven sanitization of a parsed document
//!
//! The sanitizer reduces a document tree to the structure a [`ContentPolicy`]
//! permits. It is the first of the two tree passes and must run before the
//! rebaser, so no URL is rewritten before its scheme has been checked.
//!
//! # Traversal
//!
//! Depth-first, pre-order. A removed element is dropped with its whole
//! subtree and its children are never visited; elements are never unwrapped,
//! since unwrapping could re-parent dangerous children into a permitted
//! context.
//!
//! # Per-element rules, in order
//!
//! 1. Forbidden or not-allowed tag, or nesting deeper than the policy's
//!    maximum depth: remove the subtree
//! 2. Each attribute is dropped if its name starts with `on` (always, whatever
//!    the policy says), is forbidden, matches no allow rule, or is a URL
//!    attribute whose scheme is dangerous for that element
//!
//! Comments are removed when the policy strips them. Sanitization is total and
//! silent: nothing is reported to the caller as an error.

use html5ever::Attribute;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::{debug, trace};

use crate::dom::element_name;
use crate::origin::url_scheme;
use crate::policy::{ContentPolicy, ElementVerdict};
use crate::srcset::parse_srcset;

/// Outcome of checking one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeVerdict {
    Keep,
    /// Name starts with `on`
    EventHandler,
    /// Listed in `forbidden_attributes`
    Forbidden,
    /// Matches no allow rule for the element
    NotAllowed,
    /// URL attribute with a dangerous scheme
    DangerousScheme,
}

/// Counts of what a sanitization pass removed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeReport {
    pub removed_elements: usize,
    pub removed_attributes: usize,
    pub removed_comments: usize,
}

/// Sanitizer bound to a read-only content policy
pub struct Sanitizer<'p> {
    policy: &'p ContentPolicy,
}

impl<'p> Sanitizer<'p> {
    pub fn new(policy: &'p ContentPolicy) -> Self {
        Self { policy }
    }

    /// Sanitize a document in place
    pub fn sanitize(&self, dom: &RcDom) -> SanitizeReport {
        let mut report = SanitizeReport::default();
        self.sanitize_children(&dom.document, 0, &mut report);
        report
    }

    /// Check one attribute of one element
    ///
    /// # Examples
    ///
    /// ```
    /// use html_rebaser::policy::ContentPolicy;
    /// use html_rebaser::sanitizer::{AttributeVerdict, Sanitizer};
    ///
    /// let policy = ContentPolicy::default();
    /// let sanitizer = Sanitizer::new(&policy);
    /// assert_eq!(sanitizer.check_attribute("img", "onerror", "x()"), AttributeVerdict::EventHandler);
    /// assert_eq!(sanitizer.check_attribute("a", "href", "javascript:x()"), AttributeVerdict::DangerousScheme);
    /// assert_eq!(sanitizer.check_attribute("a", "href", "/docs"), AttributeVerdict::Keep);
    /// ```
    pub fn check_attribute(&self, tag: &str, name: &str, value: &str) -> AttributeVerdict {
        let name = name.to_ascii_lowercase();

        if name.starts_with("on") {
            return AttributeVerdict::EventHandler;
        }
        if self.policy.forbids_attribute(&name) {
            return AttributeVerdict::Forbidden;
        }
        if !self.policy.is_attribute_allowed(tag, &name) {
            return AttributeVerdict::NotAllowed;
        }
        if self.policy.is_url_attribute(&name) && self.has_dangerous_url(tag, &name, value) {
            return AttributeVerdict::DangerousScheme;
        }

        AttributeVerdict::Keep
    }

    fn has_dangerous_url(&self, tag: &str, name: &str, value: &str) -> bool {
        let dangerous = |url: &str| {
            url_scheme(url).is_some_and(|scheme| self.policy.is_scheme_dangerous(tag, name, &scheme))
        };

        if name == "srcset" {
            parse_srcset(value).iter().any(|candidate| dangerous(candidate.url))
        } else {
            dangerous(value)
        }
    }

    fn sanitize_children(&self, parent: &Handle, depth: usize, report: &mut SanitizeReport) {
        let children = std::mem::take(&mut *parent.children.borrow_mut());
        let mut kept = Vec::with_capacity(children.len());

        for child in children {
            if self.visit(&child, depth + 1, report) == ElementVerdict::Keep {
                kept.push(child);
            } else {
                child.parent.set(None);
            }
        }

        *parent.children.borrow_mut() = kept;
    }

    fn visit(&self, node: &Handle, depth: usize, report: &mut SanitizeReport) -> ElementVerdict {
        match node.data {
            NodeData::Document => {
                self.sanitize_children(node, depth, report);
                ElementVerdict::Keep
            }
            NodeData::Doctype { .. } | NodeData::Text { .. } => ElementVerdict::Keep,
            NodeData::Comment { .. } => {
                if self.policy.strips_comments() {
                    report.removed_comments += 1;
                    ElementVerdict::Remove
                } else {
                    ElementVerdict::Keep
                }
            }
            NodeData::ProcessingInstruction { .. } => ElementVerdict::Remove,
            NodeData::Element {
                ref attrs,
                ref template_contents,
                ..
            } => {
                let tag = element_name(node).unwrap_or_default();

                if depth > self.policy.max_depth() {
                    debug!(tag = %tag, depth, "removing element nested beyond maximum depth");
                    report.removed_elements += 1;
                    return ElementVerdict::Remove;
                }
                if self.policy.check_element(&tag) == ElementVerdict::Remove {
                    debug!(tag = %tag, depth, "removing disallowed element subtree");
                    report.removed_elements += 1;
                    return ElementVerdict::Remove;
                }

                self.sanitize_attributes(&tag, &mut attrs.borrow_mut(), report);
                if let Some(contents) = template_contents.borrow().as_ref() {
                    self.sanitize_children(contents, depth, report);
                }
                self.sanitize_children(node, depth, report);
                ElementVerdict::Keep
            }
        }
    }

    fn sanitize_attributes(
        &self,
        tag: &str,
        attrs: &mut Vec<Attribute>,
        report: &mut SanitizeReport,
    ) {
        attrs.retain(|attr| {
            let name: &str = &attr.name.local;
            let verdict = self.check_attribute(tag, name, &attr.value);
            if verdict != AttributeVerdict::Keep {
                trace!(tag, attribute = name, reason = ?verdict, "dropping attribute");
                report.removed_attributes += 1;
                return false;
            }
            true
        });
    }
}

//! Tree helpers over `markup5ever_rcdom` handles
//!
//! The sanitizer and rebaser only ever need a handful of operations on the
//! document tree: read an element's name, read and write attributes, walk
//! elements, and insert a freshly created element. They live here so
//! neither pass touches `RefCell` borrows directly.
//!
//! Attribute keys are compared case-insensitively. html5ever already
//! lowercases HTML attribute names and drops duplicates while tokenizing, so
//! each element carries at most one attribute per key.

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData};
use std::cell::RefCell;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Lowercased local name of an element, `None` for other node kinds
pub fn element_name(node: &Handle) -> Option<String> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(local(name).to_ascii_lowercase()),
        _ => None,
    }
}

/// Check whether `node` is an element with the given (lowercase) name
pub fn is_element(node: &Handle, tag: &str) -> bool {
    match node.data {
        NodeData::Element { ref name, .. } => local(name).eq_ignore_ascii_case(tag),
        _ => false,
    }
}

/// Read an attribute value
pub fn get_attr(node: &Handle, key: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| local(&attr.name).eq_ignore_ascii_case(key))
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Write an attribute value, replacing an existing value in place
///
/// New attributes are appended, so existing attribute order is preserved.
pub fn set_attr(node: &Handle, key: &str, value: &str) {
    if let NodeData::Element { ref attrs, .. } = node.data {
        let mut attrs = attrs.borrow_mut();
        if let Some(attr) = attrs
            .iter_mut()
            .find(|attr| local(&attr.name).eq_ignore_ascii_case(key))
        {
            attr.value = StrTendril::from_slice(value);
        } else {
            attrs.push(new_attribute(key, value));
        }
    }
}

/// Remove an attribute, returning whether it was present
pub fn remove_attr(node: &Handle, key: &str) -> bool {
    match node.data {
        NodeData::Element { ref attrs, .. } => {
            let mut attrs = attrs.borrow_mut();
            let before = attrs.len();
            attrs.retain(|attr| !local(&attr.name).eq_ignore_ascii_case(key));
            attrs.len() != before
        }
        _ => false,
    }
}

/// First element child with the given name
pub fn find_child(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| is_element(child, tag))
        .cloned()
}

/// The `<head>` element of a parsed document
///
/// html5ever always synthesizes `html`, `head` and `body`, so this is only
/// `None` when a policy has removed them.
pub fn find_head(document: &Handle) -> Option<Handle> {
    let html = find_child(document, "html")?;
    find_child(&html, "head")
}

/// Visit every element below `node` in document order
///
/// The callback sees each element before its descendants.
pub fn for_each_element<F>(node: &Handle, visit: &mut F)
where
    F: FnMut(&Handle),
{
    for child in node.children.borrow().iter() {
        if let NodeData::Element { .. } = child.data {
            visit(child);
            for_each_element(child, visit);
        }
    }
}

/// Concatenated text of all text nodes below `node`
pub fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    let mut stack = vec![node.clone()];
    while let Some(current) = stack.pop() {
        if let NodeData::Text { ref contents } = current.data {
            output.push_str(&contents.borrow());
        }
        stack.extend(current.children.borrow().iter().rev().cloned());
    }
    output
}

/// Create a detached HTML element carrying the given attributes
pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(
            attributes
                .iter()
                .map(|(key, value)| new_attribute(key, value))
                .collect(),
        ),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Insert `child` as the first child of `parent`
pub fn prepend_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

fn local(name: &QualName) -> &str {
    &name.local
}

fn new_attribute(key: &str, value: &str) -> Attribute {
    Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(key)),
        value: StrTendril::from_slice(value),
    }
}

//! Document title extraction
//!
//! The title travels alongside the rewritten markup so the embedding viewer
//! can label the page without parsing it again. It is read from the first
//! `<title>` element in document order, after sanitization, with whitespace
//! collapsed the way a browser collapses it for the tab label. A missing or
//! blank title falls back to the origin's host name.
//!
//! ```rust
//! use html_rebaser::metadata::extract_title;
//! use html_rebaser::origin::Origin;
//! use html_rebaser::parser::parse_html;
//!
//! let origin = Origin::parse("https://example.com/path").unwrap();
//!
//! let dom = parse_html("<title>  My\n  Page </title>");
//! assert_eq!(extract_title(&dom, &origin), "My Page");
//!
//! let dom = parse_html("<p>untitled</p>");
//! assert_eq!(extract_title(&dom, &origin), "example.com");
//! ```

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{is_element, text_content};
use crate::origin::Origin;

/// Title of the document, or the origin host when it has none
pub fn extract_title(dom: &RcDom, origin: &Origin) -> String {
    find_title(dom).unwrap_or_else(|| origin.host().to_string())
}

/// Collapsed text of the first `<title>` element
///
/// Returns `None` if there is no `<title>` or its text is only whitespace.
pub fn find_title(dom: &RcDom) -> Option<String> {
    let title = find_element(&dom.document, "title")?;
    let text = collapse_whitespace(&text_content(&title));
    (!text.is_empty()).then_some(text)
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    match node.data {
        NodeData::Element { .. } if is_element(node, tag) => Some(node.clone()),
        NodeData::Element { .. } | NodeData::Document => node
            .children
            .borrow()
            .iter()
            .find_map(|child| find_element(child, tag)),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn origin() -> Origin {
        Origin::parse("https://example.com/path").expect("valid origin")
    }

    #[test]
    fn test_title_from_title_tag() {
        let dom = parse_html("<html><head><title>My Page</title></head></html>");
        assert_eq!(extract_title(&dom, &origin()), "My Page");
    }

    #[test]
    fn test_title_fallback_to_host() {
        let dom = parse_html("<html><head></head><body>x</body></html>");
        assert_eq!(extract_title(&dom, &origin()), "example.com");
    }

    #[test]
    fn test_blank_title_falls_back() {
        let dom = parse_html("<title> \n\t </title>");
        assert_eq!(find_title(&dom), None);
        assert_eq!(extract_title(&dom, &origin()), "example.com");
    }

    #[test]
    fn test_first_title_wins() {
        let dom = parse_html("<title>First</title><body><title>Second</title></body>");
        assert_eq!(find_title(&dom).as_deref(), Some("First"));
    }

    #[test]
    fn test_entities_decoded() {
        let dom = parse_html("<title>Fish &amp; Chips &lt;3</title>");
        assert_eq!(find_title(&dom).as_deref(), Some("Fish & Chips <3"));
    }

    #[test]
    fn test_title_markup_is_text() {
        // Title is an RCDATA element, tags inside it are not parsed.
        let dom = parse_html("<title><b>Bold</b> claim</title>");
        assert_eq!(find_title(&dom).as_deref(), Some("<b>Bold</b> claim"));
    }
}

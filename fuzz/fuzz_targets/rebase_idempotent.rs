#![no_main]

use html_rebaser::parser::{parse_html, serialize_document};
use html_rebaser::rebaser::Rebaser;
use html_rebaser::sanitizer::Sanitizer;
use html_rebaser::{ContentPolicy, Origin};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(origin) = Origin::parse("https://fuzz.example/dir/page.html") else {
        return;
    };
    let policy = ContentPolicy::default();
    let dom = parse_html(data);
    Sanitizer::new(&policy).sanitize(&dom);

    let rebaser = Rebaser::new(&origin);
    rebaser.rebase(&dom);
    let once = serialize_document(&dom);
    rebaser.rebase(&dom);
    assert_eq!(once, serialize_document(&dom), "rebasing is not idempotent");
});

//! Rewrite a page read from a file or stdin and print the result
//!
//! ```text
//! cargo run --example rewrite_page -- https://example.com/docs/ page.html
//! curl -s https://example.com/docs/ | cargo run --example rewrite_page -- https://example.com/docs/
//! ```

use std::io::Read;
use std::process::ExitCode;

use html_rebaser::{CONTENT_SECURITY_POLICY, ContentPolicy, Rewriter};

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(origin) = args.next() else {
        eprintln!("usage: rewrite_page <origin-url> [file]");
        return ExitCode::from(2);
    };

    let body = match args.next() {
        Some(path) => std::fs::read(&path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).map(|_| buf)
        }
    };
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            eprintln!("failed to read input: {e}");
            return ExitCode::FAILURE;
        }
    };

    let policy = ContentPolicy::default();
    match Rewriter::new(&policy).rewrite_response(&body, None, &origin) {
        Ok(page) => {
            eprintln!("Title: {}", page.title);
            eprintln!("URL: {}", page.url);
            eprintln!("Content-Security-Policy: {CONTENT_SECURITY_POLICY}");
            println!("{}", page.html);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error ({}): {e}", e.status_code());
            ExitCode::FAILURE
        }
    }
}

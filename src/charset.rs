//! Character encoding detection and transcoding for fetched documents
//!
//! Bytes handed over by the network collaborator are decoded to UTF-8 before
//! parsing. The encoding is chosen by the following cascade:
//!
//! 1. **Byte order mark**: a UTF-8 or UTF-16 BOM wins over any declaration
//! 2. **Content-Type header**: the `charset` parameter of the response header
//! 3. **HTML meta tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//!    within the first 1024 bytes
//! 4. **Default to UTF-8**
//!
//! # Examples
//!
//! ```rust
//! use html_rebaser::charset::detect_charset;
//!
//! let charset = detect_charset(Some("text/html; charset=ISO-8859-1"), b"<html></html>");
//! assert_eq!(charset, "ISO-8859-1");
//!
//! let html = b"<html><head><meta charset=\"UTF-8\"></head></html>";
//! assert_eq!(detect_charset(None, html), "UTF-8");
//! ```

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::RebaseError;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for meta charset tags
const META_SCAN_LIMIT: usize = 1024;

/// Media types accepted as HTML at the boundary
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Detect the declared charset of a document
///
/// Returns the charset label in uppercase. Always returns a label, defaulting
/// to `"UTF-8"` when nothing is declared.
pub fn detect_charset(content_type: Option<&str>, html: &[u8]) -> String {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding.name().to_uppercase();
    }

    if let Some(ct) = content_type
        && let Some(charset) = extract_charset_from_content_type(ct)
    {
        return charset.to_uppercase();
    }

    if let Some(charset) = extract_charset_from_html(html) {
        return charset.to_uppercase();
    }

    DEFAULT_CHARSET.to_string()
}

/// Extract the `charset` parameter from a Content-Type header value
///
/// ```rust
/// use html_rebaser::charset::extract_charset_from_content_type;
///
/// assert_eq!(
///     extract_charset_from_content_type("text/html; charset=\"ISO-8859-1\""),
///     Some("ISO-8859-1".to_string())
/// );
/// assert_eq!(extract_charset_from_content_type("text/html"), None);
/// ```
pub fn extract_charset_from_content_type(content_type: &str) -> Option<String> {
    static CHARSET_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = CHARSET_REGEX
        .get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"';,\s]+)"#).ok())
        .as_ref()?;

    regex
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract a charset declared by a `<meta>` tag near the top of the document
///
/// Both `<meta charset="...">` and the `http-equiv` form carry the label as
/// `charset=...` somewhere inside the tag, so a single pattern covers them.
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let prefix = &html[..html.len().min(META_SCAN_LIMIT)];
    let text = String::from_utf8_lossy(prefix);

    static META_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = META_REGEX
        .get_or_init(|| {
            Regex::new(r#"(?i)<meta\b[^>]*?\bcharset\s*=\s*["']?([^"'>;\s/]+)"#).ok()
        })
        .as_ref()?;

    regex
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check whether a Content-Type header names an HTML media type
///
/// Parameters and case are ignored: `Text/HTML; charset=utf-8` is HTML.
pub fn is_html_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    HTML_MEDIA_TYPES.contains(&media_type.as_str())
}

/// Decode fetched bytes to UTF-8 using the detected charset
///
/// # Errors
///
/// - `RebaseError::EncodingError` if the charset label is unknown or the
///   bytes are invalid for it.
pub fn decode_html<'a>(
    html: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, RebaseError> {
    let charset = detect_charset(content_type, html);
    let encoding = Encoding::for_label(charset.as_bytes()).ok_or_else(|| {
        RebaseError::EncodingError(format!("Unsupported charset '{}'", charset))
    })?;

    // A leading BOM is not document content.
    let body = match Encoding::for_bom(html) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &html[bom_len..],
        _ => html,
    };

    if encoding == UTF_8 {
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            RebaseError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}",
                e.valid_up_to()
            ))
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            RebaseError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                charset
            ))
        })
}

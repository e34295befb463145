//! `srcset` candidate lists
//!
//! A candidate is a URL token followed by an optional descriptor (`2x`,
//! `480w`). The URL token is the run of non-whitespace characters at the
//! start of a candidate, so commas inside it (as in `data:` URLs) do not
//! split the list; a URL token that ends in commas terminates its candidate.

/// One entry of a `srcset` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub url: &'a str,
    pub descriptor: Option<&'a str>,
}

/// Split a `srcset` value into candidates
pub fn parse_srcset(value: &str) -> Vec<Candidate<'_>> {
    let bytes = value.as_bytes();
    let mut candidates = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        let url_start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let url = &value[url_start..pos];

        if url.ends_with(',') {
            candidates.push(Candidate {
                url: url.trim_end_matches(','),
                descriptor: None,
            });
            continue;
        }

        let descriptor_start = pos;
        let mut in_parens = false;
        while pos < bytes.len() {
            match bytes[pos] {
                b'(' => in_parens = true,
                b')' => in_parens = false,
                b',' if !in_parens => break,
                _ => {}
            }
            pos += 1;
        }
        let descriptor = value[descriptor_start..pos].trim();
        candidates.push(Candidate {
            url,
            descriptor: (!descriptor.is_empty()).then_some(descriptor),
        });
    }

    candidates
}

/// Join candidates back into a `srcset` value, separated by `", "`
pub fn serialize_srcset<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = (String, Option<&'a str>)>,
{
    candidates
        .into_iter()
        .map(|(url, descriptor)| match descriptor {
            Some(descriptor) => format!("{} {}", url, descriptor),
            None => url,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

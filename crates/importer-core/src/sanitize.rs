//! Field sanitization for submitted edit forms.
//!
//! Free text loses markup and redundant whitespace, numbers become
//! non-negative integers, and anything that is not an absolute http(s) URL
//! becomes the empty string.

use url::Url;

/// Strip markup and collapse whitespace, the treatment for single-line text inputs.
pub fn sanitize_text_field(s: &str) -> String {
    strip_tags(s).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove HTML tags. `<script>` and `<style>` lose their contents too.
pub fn strip_tags(s: &str) -> String {
    let s = remove_element(s, "script");
    let s = remove_element(&s, "style");

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|n| n.is_ascii_alphabetic() || matches!(n, '/' | '!' | '?'));
        if opens_tag {
            // An unterminated tag swallows the rest of the input.
            for c in chars.by_ref() {
                if c == '>' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn remove_element(s: &str, tag: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `s`.
    let lower = s.to_ascii_lowercase();
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(&open) {
        let start = pos + found;
        out.push_str(&s[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => {
                pos = s.len();
                break;
            }
        }
    }
    out.push_str(&s[pos..]);
    out
}

/// Parse the leading integer of `s`, clamping negatives to 0.
///
/// `"12"` and `"12 episodes"` give 12, `"-5"` gives 0, `"abc"` gives 0.
pub fn non_negative_int(s: &str) -> u32 {
    let s = s.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(u32::MAX)
}

/// Keep `s` only if it is an absolute http(s) URL with a host.
pub fn sanitize_url(s: &str) -> String {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return String::new();
    }
    if s
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '\'' | '`'))
    {
        return String::new();
    }
    match Url::parse(s) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => s.to_string(),
        _ => String::new(),
    }
}

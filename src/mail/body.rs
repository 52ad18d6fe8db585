//! Best-effort plain-text body extraction.

use std::sync::LazyLock;

use mail_parser::{Message, MessagePart, MimeHeaders, PartType};
use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<]+?>").unwrap());

/// Remove anything delimited by angle brackets.
///
/// Lossy on purpose: no entity decoding, no whitespace normalization, and a
/// literal `<` in the text eats everything up to the next `>`.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Extract the readable text of a message. Never fails; may return "".
///
/// Composite messages yield the first non-attachment `text/plain` part,
/// falling back to the first `text/html` part with tags stripped. A single
/// part message yields its payload as text.
pub fn extract_body(message: &Message<'_>) -> String {
    let Some(root) = message.parts.first() else {
        return String::new();
    };
    let text = match &root.body {
        PartType::Multipart(_) => extract_from_parts(&message.parts[1..]),
        _ => single_part_text(root),
    };
    text.trim().to_string()
}

fn extract_from_parts(parts: &[MessagePart<'_>]) -> String {
    let mut html_fallback: Option<String> = None;

    for part in parts {
        if is_attachment(part) {
            continue;
        }
        match &part.body {
            PartType::Text(text) if is_plain_text(part) && !part.is_encoding_problem => {
                return text.to_string();
            }
            PartType::Html(html) if html_fallback.is_none() => {
                html_fallback = Some(strip_tags(html));
            }
            _ => {}
        }
    }

    html_fallback.unwrap_or_default()
}

fn single_part_text(part: &MessagePart<'_>) -> String {
    match &part.body {
        PartType::Text(text) | PartType::Html(text) => text.to_string(),
        // Not decodable as text: fall back to the raw payload.
        _ => String::from_utf8_lossy(part.contents()).into_owned(),
    }
}

fn is_attachment(part: &MessagePart<'_>) -> bool {
    part.content_disposition()
        .is_some_and(|d| d.ctype().eq_ignore_ascii_case("attachment"))
}

fn is_plain_text(part: &MessagePart<'_>) -> bool {
    match part.content_type() {
        // No Content-Type means text/plain.
        None => true,
        Some(ct) => {
            ct.ctype().eq_ignore_ascii_case("text")
                && ct.subtype().is_none_or(|s| s.eq_ignore_ascii_case("plain"))
        }
    }
}

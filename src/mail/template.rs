//! Reply templates and token substitution.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(SUBJECT|subject|BODY|body)\]").unwrap());

/// Subject and body patterns for the outgoing reply.
///
/// Recognized tokens: `[SUBJECT]`/`[subject]` and `[BODY]`/`[body]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyTemplate {
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

/// Values taken from the inbound message.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    pub subject: String,
    pub body: String,
}

/// Replace tokens in a single left-to-right pass.
///
/// Substituted text is never scanned again, so a body that itself contains
/// `[SUBJECT]` comes out verbatim.
pub fn render(template: &str, values: &TemplateValues) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures<'_>| {
            if caps[1].eq_ignore_ascii_case("subject") {
                values.subject.clone()
            } else {
                values.body.clone()
            }
        })
        .into_owned()
}

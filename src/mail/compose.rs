//! Reply composition: recipient resolution, rendering and message building.

use std::sync::LazyLock;

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use mail_parser::Message;
use regex::Regex;

use crate::error::ReplyError;
use crate::mail::body::{extract_body, strip_tags};
use crate::mail::headers::{decoded_reply_to, decoded_sender, decoded_subject};
use crate::mail::template::{ReplyTemplate, TemplateValues, render};

static ANGLE_ADDRESS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(.+?)>").unwrap());

/// A reply ready to be built: who gets it and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReply {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

/// Pull an address out of decoded header text.
///
/// The first `<...>` enclosed address wins; otherwise the trimmed text is
/// taken verbatim.
pub fn extract_address(decoded: &str) -> String {
    match ANGLE_ADDRESS.captures(decoded) {
        Some(caps) => caps[1].trim().to_string(),
        None => decoded.trim().to_string(),
    }
}

/// Work out who the reply goes to: `Reply-To` first, then `From`.
///
/// The result must be non-empty and contain an `@`.
pub fn resolve_recipient(message: &Message<'_>) -> Result<String, ReplyError> {
    let decoded = decoded_reply_to(message).unwrap_or_else(|| decoded_sender(message));
    let recipient = extract_address(&decoded);
    if recipient.is_empty() || !recipient.contains('@') {
        return Err(ReplyError::InvalidRecipient(recipient));
    }
    Ok(recipient)
}

/// Values the template tokens expand to for this message.
pub fn template_values(message: &Message<'_>) -> TemplateValues {
    TemplateValues {
        subject: decoded_subject(message),
        body: extract_body(message),
    }
}

/// Resolve the recipient and render both template patterns.
pub fn render_reply(
    message: &Message<'_>,
    template: &ReplyTemplate,
) -> Result<RenderedReply, ReplyError> {
    let recipient = resolve_recipient(message)?;
    let values = template_values(message);
    Ok(RenderedReply {
        recipient,
        subject: render(&template.subject, &values),
        body: render(&template.body, &values),
        is_html: template.is_html,
    })
}

/// Build the outgoing message.
///
/// HTML replies become `multipart/alternative` with a tag-stripped plain
/// part first and the HTML part second.
pub fn compose(reply: &RenderedReply, sender: &Mailbox) -> Result<lettre::Message, ReplyError> {
    let to: Mailbox = reply.recipient.parse().map_err(|e| {
        ReplyError::Compose(format!("Invalid to address '{}': {e}", reply.recipient))
    })?;

    let builder = lettre::Message::builder()
        .from(sender.clone())
        .to(to)
        .subject(reply.subject.as_str());

    let built = if reply.is_html {
        builder.multipart(MultiPart::alternative_plain_html(
            strip_tags(&reply.body),
            reply.body.clone(),
        ))
    } else {
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(reply.body.clone())
    };

    built.map_err(|e| ReplyError::Compose(format!("Failed to build email: {e}")))
}

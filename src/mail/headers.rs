//! Decoded header text.
//!
//! mail-parser already undoes RFC2047 encoded words while parsing: adjacent
//! words in different charsets are concatenated in order and bytes that do
//! not decode are replaced. The helpers here only flatten the parsed values
//! back into the plain strings the filter and composer work on.

use mail_parser::{Addr, Address, Message};

/// Render a parsed address header as `Name <addr>` entries joined by `", "`.
///
/// An entry without a display name renders as the bare address, an entry
/// without an address as the bare name.
pub fn render_address(address: &Address<'_>) -> String {
    let entries: Vec<String> = match address {
        Address::List(addrs) => addrs.iter().filter_map(render_addr).collect(),
        Address::Group(groups) => groups
            .iter()
            .flat_map(|g| g.addresses.iter().filter_map(render_addr))
            .collect(),
    };
    entries.join(", ")
}

fn render_addr(addr: &Addr<'_>) -> Option<String> {
    let name = addr.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let address = addr
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    match (name, address) {
        (Some(name), Some(address)) => Some(format!("{name} <{address}>")),
        (None, Some(address)) => Some(address.to_string()),
        (Some(name), None) => Some(name.to_string()),
        (None, None) => None,
    }
}

/// Decoded `From` header, empty when missing.
pub fn decoded_sender(message: &Message<'_>) -> String {
    message.from().map(render_address).unwrap_or_default()
}

/// Decoded `Reply-To` header, `None` when missing or blank.
pub fn decoded_reply_to(message: &Message<'_>) -> Option<String> {
    message
        .reply_to()
        .map(render_address)
        .filter(|s| !s.trim().is_empty())
}

/// Decoded `Subject` header, empty when missing.
pub fn decoded_subject(message: &Message<'_>) -> String {
    message.subject().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use mail_parser::MessageParser;

    use super::*;

    fn parse(raw: &str) -> Message<'_> {
        MessageParser::default().parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn sender_with_display_name() {
        let msg = parse("From: Alice <alice@example.com>\r\nSubject: x\r\n\r\nbody");
        assert_eq!(decoded_sender(&msg), "Alice <alice@example.com>");
    }

    #[test]
    fn sender_bare_address() {
        let msg = parse("From: alice@example.com\r\nSubject: x\r\n\r\nbody");
        assert_eq!(decoded_sender(&msg), "alice@example.com");
    }

    #[test]
    fn sender_encoded_word_is_decoded() {
        let msg = parse("From: =?UTF-8?Q?J=C3=B6rg?= <joerg@example.com>\r\n\r\nbody");
        assert_eq!(decoded_sender(&msg), "Jörg <joerg@example.com>");
    }

    #[test]
    fn subject_mixed_charsets_concatenated() {
        let msg = parse(
            "From: a@x.com\r\nSubject: =?ISO-8859-1?Q?caf=E9?= =?UTF-8?Q?_na=C3=AFve?=\r\n\r\nbody",
        );
        assert_eq!(decoded_subject(&msg), "café naïve");
    }

    #[test]
    fn missing_headers_are_empty() {
        let msg = parse("X-Other: 1\r\n\r\nbody");
        assert_eq!(decoded_sender(&msg), "");
        assert_eq!(decoded_subject(&msg), "");
        assert!(decoded_reply_to(&msg).is_none());
    }

    #[test]
    fn reply_to_with_quoted_name() {
        let msg = parse("From: s@w.com\r\nReply-To: \"Name\" <r@z.com>\r\n\r\nbody");
        assert_eq!(decoded_reply_to(&msg).as_deref(), Some("Name <r@z.com>"));
    }

    #[test]
    fn multiple_addresses_joined() {
        let msg = parse("From: a@x.com, Bob <b@y.com>\r\n\r\nbody");
        assert_eq!(decoded_sender(&msg), "a@x.com, Bob <b@y.com>");
    }
}

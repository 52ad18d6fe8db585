//! Minimal blocking IMAP4rev1 client.
//!
//! Tagged commands over any `Read + Write` stream; in production that is
//! rustls over TCP. Only the commands `MailStore` needs are implemented.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::MailboxError;
use crate::mailbox::{MailStore, Uid};

/// rustls client stream over TCP.
pub type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

static FETCH_UID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\*\s+\d+\s+FETCH\s+\(.*\bUID\s+(\d+)").unwrap());

/// Completion status of a tagged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    No,
    Bad,
}

/// One untagged response, with any `{n}` literals read out of band.
#[derive(Debug, Default)]
struct Untagged {
    text: String,
    literals: Vec<Vec<u8>>,
}

#[derive(Debug)]
struct Response {
    untagged: Vec<Untagged>,
    status: Status,
    /// Tagged status line without the tag.
    status_line: String,
}

/// An authenticated or not-yet-authenticated IMAP session.
pub struct ImapSession<S: Read + Write> {
    stream: BufReader<S>,
    tag_counter: u32,
}

impl ImapSession<TlsStream> {
    /// Open a TLS connection (implicit TLS, usually port 993) and read the
    /// server greeting.
    pub fn connect(host: &str, port: u16) -> Result<Self, MailboxError> {
        let connect_err = |reason: String| MailboxError::ConnectFailed {
            host: format!("{host}:{port}"),
            reason,
        };

        debug!("Connecting to IMAP server {host}:{port}");
        let tcp = TcpStream::connect((host, port)).map_err(|e| connect_err(e.to_string()))?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );
        let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
            .map_err(|e| connect_err(e.to_string()))?;
        let conn = rustls::ClientConnection::new(tls_config, server_name)
            .map_err(|e| connect_err(e.to_string()))?;

        Self::new(rustls::StreamOwned::new(conn, tcp), &format!("{host}:{port}"))
    }
}

impl<S: Read + Write> ImapSession<S> {
    /// Wrap an established stream and consume the greeting. `host` only
    /// labels errors.
    pub fn new(stream: S, host: &str) -> Result<Self, MailboxError> {
        let mut session = Self {
            stream: BufReader::new(stream),
            tag_counter: 0,
        };
        let greeting = session.read_line()?;
        let greeting = greeting.trim_end();
        let accepted = starts_with_ignore_case(greeting, "* OK")
            || starts_with_ignore_case(greeting, "* PREAUTH");
        if !accepted {
            return Err(MailboxError::ConnectFailed {
                host: host.to_string(),
                reason: format!("unexpected greeting: {greeting}"),
            });
        }
        Ok(session)
    }

    /// `LOGIN` with a plain username and password.
    pub fn login(&mut self, username: &str, password: &SecretString) -> Result<(), MailboxError> {
        let command = format!(
            "LOGIN {} {}",
            quote(username),
            quote(password.expose_secret())
        );
        let response = self.send(&command)?;
        if response.status != Status::Ok {
            return Err(MailboxError::LoginFailed(response.status_line));
        }
        debug!("Successfully logged in to IMAP server");
        Ok(())
    }

    fn next_tag(&mut self) -> String {
        self.tag_counter += 1;
        format!("A{}", self.tag_counter)
    }

    fn read_line(&mut self) -> Result<String, MailboxError> {
        let mut buf = Vec::new();
        if self.stream.read_until(b'\n', &mut buf)? == 0 {
            return Err(MailboxError::Closed);
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Read one logical response line, pulling in any literals it announces.
    fn read_response_line(&mut self) -> Result<Untagged, MailboxError> {
        let mut untagged = Untagged::default();
        loop {
            let line = self.read_line()?;
            let line = line.trim_end_matches(['\r', '\n']);
            match literal_len(line) {
                Some(len) => {
                    untagged.text.push_str(line);
                    let mut literal = vec![0u8; len];
                    self.stream.read_exact(&mut literal)?;
                    untagged.literals.push(literal);
                }
                None => {
                    untagged.text.push_str(line);
                    return Ok(untagged);
                }
            }
        }
    }

    /// Send a command and collect everything up to its tagged completion.
    fn send(&mut self, command: &str) -> Result<Response, MailboxError> {
        let tag = self.next_tag();
        let stream = self.stream.get_mut();
        stream.write_all(format!("{tag} {command}\r\n").as_bytes())?;
        stream.flush()?;

        let tag_prefix = format!("{tag} ");
        let mut untagged = Vec::new();
        loop {
            let line = self.read_response_line()?;
            if let Some(rest) = line.text.strip_prefix(&tag_prefix) {
                let status = parse_status(rest).ok_or_else(|| {
                    MailboxError::Protocol(format!("bad tagged response: {}", line.text))
                })?;
                return Ok(Response {
                    untagged,
                    status,
                    status_line: rest.to_string(),
                });
            }
            if line.text.starts_with('+') {
                return Err(MailboxError::Protocol(format!(
                    "unexpected continuation request: {}",
                    line.text
                )));
            }
            untagged.push(line);
        }
    }

    /// Send a command that must complete with `OK`.
    ///
    /// `name` is what shows up in errors and logs instead of the full command.
    fn send_ok(&mut self, name: &str, command: &str) -> Result<Response, MailboxError> {
        debug!(command = name, "IMAP command");
        let response = self.send(command)?;
        if response.status != Status::Ok {
            return Err(MailboxError::Rejected {
                command: name.to_string(),
                response: response.status_line,
            });
        }
        Ok(response)
    }
}

impl<S: Read + Write> MailStore for ImapSession<S> {
    fn select(&mut self, folder: &str) -> Result<(), MailboxError> {
        match self.send_ok("SELECT", &format!("SELECT {}", quote(folder))) {
            Ok(_) => Ok(()),
            Err(MailboxError::Rejected { .. }) => Err(MailboxError::FolderNotFound(folder.into())),
            Err(e) => Err(e),
        }
    }

    fn list_folders(&mut self) -> Result<Vec<String>, MailboxError> {
        let response = self.send_ok("LIST", "LIST \"\" \"*\"")?;
        Ok(response
            .untagged
            .iter()
            .filter_map(|line| match line.literals.last() {
                Some(name) => Some(String::from_utf8_lossy(name).into_owned()),
                None => parse_list_line(&line.text),
            })
            .collect())
    }

    fn search_all(&mut self) -> Result<Vec<u32>, MailboxError> {
        let response = self.send_ok("SEARCH", "SEARCH ALL")?;
        let mut seqs = Vec::new();
        for line in &response.untagged {
            let mut words = line.text.split_whitespace();
            if words.next() == Some("*")
                && words.next().is_some_and(|w| w.eq_ignore_ascii_case("SEARCH"))
            {
                seqs.extend(words.filter_map(|w| w.parse::<u32>().ok()));
            }
        }
        Ok(seqs)
    }

    fn fetch_rfc822(&mut self, seq: u32) -> Result<Vec<u8>, MailboxError> {
        let response = self.send_ok("FETCH RFC822", &format!("FETCH {seq} RFC822"))?;
        response
            .untagged
            .into_iter()
            .find_map(|line| line.literals.into_iter().next())
            .ok_or_else(|| MailboxError::Protocol(format!("no message body for index {seq}")))
    }

    fn fetch_uid(&mut self, seq: u32) -> Result<Uid, MailboxError> {
        let response = self.send_ok("FETCH UID", &format!("FETCH {seq} (UID)"))?;
        response
            .untagged
            .iter()
            .find_map(|line| parse_fetch_uid(&line.text))
            .ok_or_else(|| MailboxError::Protocol(format!("no UID for index {seq}")))
    }

    fn uid_copy(&mut self, uid: Uid, folder: &str) -> Result<(), MailboxError> {
        self.send_ok("UID COPY", &format!("UID COPY {uid} {}", quote(folder)))?;
        Ok(())
    }

    fn uid_flag_deleted(&mut self, uid: Uid) -> Result<(), MailboxError> {
        self.send_ok("UID STORE", &format!("UID STORE {uid} +FLAGS (\\Deleted)"))?;
        Ok(())
    }

    fn expunge(&mut self) -> Result<(), MailboxError> {
        self.send_ok("EXPUNGE", "EXPUNGE")?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), MailboxError> {
        self.send_ok("CLOSE", "CLOSE")?;
        Ok(())
    }

    fn logout(&mut self) -> Result<(), MailboxError> {
        self.send_ok("LOGOUT", "LOGOUT")?;
        Ok(())
    }
}

// ── Helpers (public for testing) ────────────────────────────────────

/// Quote a string argument, escaping `\` and `"`.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Extract the folder name from a `* LIST (flags) "delim" name` line.
///
/// Handles quoted and bare names and a `NIL` delimiter. Returns `None` for
/// anything else.
pub fn parse_list_line(line: &str) -> Option<String> {
    let line = line.trim();
    if !starts_with_ignore_case(line, "* LIST ") {
        return None;
    }
    let rest = line[7..].trim_start();

    let rest = match rest.strip_prefix('(') {
        Some(flags) => &flags[flags.find(')')? + 1..],
        None => rest,
    }
    .trim_start();

    let rest = match rest.strip_prefix('"') {
        Some(delim) => &delim[closing_quote(delim)? + 1..],
        None if starts_with_ignore_case(rest, "NIL") => &rest[3..],
        None => return None,
    }
    .trim();

    let name = match rest.strip_prefix('"') {
        Some(quoted) => unescape(&quoted[..closing_quote(quoted)?]),
        None => rest.to_string(),
    };
    (!name.is_empty()).then_some(name)
}

/// Parse the UID out of a `* n FETCH (UID m)` line.
pub fn parse_fetch_uid(line: &str) -> Option<Uid> {
    FETCH_UID.captures(line)?[1].parse().ok()
}

/// Byte count of a literal announced at the end of a line (`... {n}`).
fn literal_len(line: &str) -> Option<usize> {
    let body = line.strip_suffix('}')?;
    let open = body.rfind('{')?;
    body[open + 1..].trim_end_matches('+').parse().ok()
}

fn parse_status(rest: &str) -> Option<Status> {
    let word = rest.split_whitespace().next()?;
    match word.to_ascii_uppercase().as_str() {
        "OK" => Some(Status::Ok),
        "NO" => Some(Status::No),
        "BAD" => Some(Status::Bad),
        _ => None,
    }
}

/// Index of the first unescaped `"` in `s`.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return Some(i),
            _ => escaped = false,
        }
    }
    None
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Replays canned server output and records what the client writes.
    struct ScriptedStream {
        input: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl ScriptedStream {
        fn new(server: &[u8]) -> Self {
            Self {
                input: Cursor::new(server.to_vec()),
                written: Vec::new(),
            }
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn session(server: &str) -> ImapSession<ScriptedStream> {
        let script = format!("* OK IMAP4rev1 ready\r\n{server}");
        ImapSession::new(ScriptedStream::new(script.as_bytes()), "imap.test:993").unwrap()
    }

    fn written(session: &ImapSession<ScriptedStream>) -> String {
        String::from_utf8_lossy(&session.stream.get_ref().written).into_owned()
    }

    // ── Session tests ───────────────────────────────────────────────

    #[test]
    fn rejects_bye_greeting() {
        let stream = ScriptedStream::new(b"* BYE go away\r\n");
        let err = ImapSession::new(stream, "imap.test:993").err().unwrap();
        assert!(matches!(
            err,
            MailboxError::ConnectFailed { ref host, ref reason }
                if host == "imap.test:993" && reason.contains("* BYE go away")
        ));
        assert!(err.to_string().contains("imap.test:993"));
    }

    #[test]
    fn login_success_and_quoting() {
        let mut s = session("A1 OK LOGIN completed\r\n");
        s.login("user", &SecretString::from("p\"w".to_string())).unwrap();
        assert_eq!(written(&s), "A1 LOGIN \"user\" \"p\\\"w\"\r\n");
    }

    #[test]
    fn login_failure() {
        let mut s = session("A1 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n");
        let err = s.login("user", &SecretString::from("bad".to_string())).unwrap_err();
        assert!(matches!(err, MailboxError::LoginFailed(ref m) if m.contains("Invalid credentials")));
    }

    #[test]
    fn select_missing_folder() {
        let mut s = session("A1 NO Mailbox doesn't exist\r\n");
        assert!(matches!(
            s.select("Trash"),
            Err(MailboxError::FolderNotFound(ref f)) if f == "Trash"
        ));
    }

    #[test]
    fn select_ignores_untagged_data() {
        let mut s = session(
            "* 2 EXISTS\r\n* 0 RECENT\r\n* FLAGS (\\Seen \\Deleted)\r\nA1 OK [READ-WRITE] SELECT completed\r\n",
        );
        s.select("INBOX").unwrap();
        assert_eq!(written(&s), "A1 SELECT \"INBOX\"\r\n");
    }

    #[test]
    fn search_all_collects_sequence_numbers() {
        let mut s = session("* SEARCH 1 2 5\r\nA1 OK SEARCH completed\r\n");
        assert_eq!(s.search_all().unwrap(), vec![1, 2, 5]);
    }

    #[test]
    fn search_all_empty() {
        let mut s = session("* SEARCH\r\nA1 OK SEARCH completed\r\n");
        assert!(s.search_all().unwrap().is_empty());
    }

    #[test]
    fn fetch_rfc822_reads_literal() {
        let body = "From: a@x.com\r\nSubject: Hi\r\n\r\ntest\r\n";
        let mut s = session(&format!(
            "* 1 FETCH (RFC822 {{{}}}\r\n{body})\r\nA1 OK FETCH completed\r\n",
            body.len()
        ));
        let raw = s.fetch_rfc822(1).unwrap();
        assert_eq!(raw, body.as_bytes());
        assert_eq!(written(&s), "A1 FETCH 1 RFC822\r\n");
    }

    #[test]
    fn fetch_rfc822_without_literal_is_protocol_error() {
        let mut s = session("A1 OK FETCH completed\r\n");
        assert!(matches!(s.fetch_rfc822(3), Err(MailboxError::Protocol(_))));
    }

    #[test]
    fn fetch_rfc822_rejected() {
        let mut s = session("A1 NO message gone\r\n");
        assert!(matches!(s.fetch_rfc822(1), Err(MailboxError::Rejected { .. })));
    }

    #[test]
    fn fetch_uid_parses_response() {
        let mut s = session("* 3 FETCH (UID 4827)\r\nA1 OK FETCH completed\r\n");
        assert_eq!(s.fetch_uid(3).unwrap(), 4827);
    }

    #[test]
    fn archive_commands_are_uid_based() {
        let mut s = session(
            "A1 OK COPY completed\r\nA2 OK STORE completed\r\n* 1 EXPUNGE\r\nA3 OK EXPUNGE completed\r\n",
        );
        s.uid_copy(42, "Deleted Items").unwrap();
        s.uid_flag_deleted(42).unwrap();
        s.expunge().unwrap();
        assert_eq!(
            written(&s),
            "A1 UID COPY 42 \"Deleted Items\"\r\nA2 UID STORE 42 +FLAGS (\\Deleted)\r\nA3 EXPUNGE\r\n"
        );
    }

    #[test]
    fn list_folders_parses_names() {
        let mut s = session(
            "* LIST (\\HasNoChildren) \".\" \"INBOX\"\r\n\
             * LIST (\\HasNoChildren \\Trash) \"/\" Trash\r\n\
             * LIST () NIL \"Deleted Items\"\r\n\
             A1 OK LIST completed\r\n",
        );
        assert_eq!(
            s.list_folders().unwrap(),
            vec!["INBOX", "Trash", "Deleted Items"]
        );
    }

    #[test]
    fn closed_connection_is_reported() {
        let mut s = session("");
        assert!(matches!(s.expunge(), Err(MailboxError::Closed)));
    }

    // ── Helper tests ────────────────────────────────────────────────

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("INBOX"), "\"INBOX\"");
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn parse_list_line_variants() {
        assert_eq!(
            parse_list_line(r#"* LIST (\HasNoChildren) "\\" "Papierkorb""#).as_deref(),
            Some("Papierkorb")
        );
        assert_eq!(
            parse_list_line(r#"* LIST () "." "My \"quoted\" box""#).as_deref(),
            Some(r#"My "quoted" box"#)
        );
        assert_eq!(parse_list_line("* SEARCH 1 2"), None);
        assert_eq!(parse_list_line(r#"* LIST () "." """#), None);
    }

    #[test]
    fn parse_fetch_uid_variants() {
        assert_eq!(parse_fetch_uid("* 1 FETCH (UID 12)"), Some(12));
        assert_eq!(parse_fetch_uid("* 1 FETCH (FLAGS (\\Seen) UID 99)"), Some(99));
        assert_eq!(parse_fetch_uid("* 1 FETCH (FLAGS (\\Seen))"), None);
    }

    #[test]
    fn literal_len_detection() {
        assert_eq!(literal_len("* 1 FETCH (RFC822 {342}"), Some(342));
        assert_eq!(literal_len("* 1 FETCH (UID 3)"), None);
    }
}

//! Inbound mailbox access.
//!
//! `MailStore` is the narrow set of IMAP operations the pipeline needs.
//! `ImapSession` speaks them over TLS; tests substitute an in-memory store.

pub mod archive;
pub mod imap;
pub mod reader;

pub use archive::archive;
pub use imap::ImapSession;
pub use reader::{InboxMessage, InboxScan, fetch_inbox, verify_folders};

use crate::error::MailboxError;

/// Mailbox-assigned message identifier, stable while the message stays in
/// its folder.
pub type Uid = u32;

/// Blocking mailbox operations used by a run.
///
/// Sequence numbers are positions in the selected folder and shift after an
/// expunge; only `fetch_rfc822`/`fetch_uid` take them.
pub trait MailStore {
    /// Select a folder for the following commands.
    fn select(&mut self, folder: &str) -> Result<(), MailboxError>;

    /// Names of all folders (diagnostics only).
    fn list_folders(&mut self) -> Result<Vec<String>, MailboxError>;

    /// Sequence numbers of every message in the selected folder.
    fn search_all(&mut self) -> Result<Vec<u32>, MailboxError>;

    /// Full RFC822 content by sequence number.
    fn fetch_rfc822(&mut self, seq: u32) -> Result<Vec<u8>, MailboxError>;

    /// UID by sequence number.
    fn fetch_uid(&mut self, seq: u32) -> Result<Uid, MailboxError>;

    /// Copy a message into another folder.
    fn uid_copy(&mut self, uid: Uid, folder: &str) -> Result<(), MailboxError>;

    /// Set the `\Deleted` flag on a message.
    fn uid_flag_deleted(&mut self, uid: Uid) -> Result<(), MailboxError>;

    /// Permanently remove flagged messages from the selected folder.
    fn expunge(&mut self) -> Result<(), MailboxError>;

    /// Close the selected folder.
    fn close(&mut self) -> Result<(), MailboxError>;

    /// End the session.
    fn logout(&mut self) -> Result<(), MailboxError>;
}

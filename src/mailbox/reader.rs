//! Inbox enumeration.

use mail_parser::{Message, MessageParser};
use tracing::{debug, info, warn};

use crate::error::{LoadError, MailboxError};
use crate::mailbox::{MailStore, Uid};

/// A message loaded from the inbox together with its identifiers.
#[derive(Debug, Clone)]
pub struct InboxMessage {
    /// Sequence number at enumeration time. Stale after the first expunge.
    pub seq: u32,
    pub uid: Uid,
    pub message: Message<'static>,
}

/// Result of one pass over the inbox.
#[derive(Debug, Default)]
pub struct InboxScan {
    /// Loaded messages in mailbox order.
    pub messages: Vec<InboxMessage>,
    /// Messages that could not be loaded.
    pub load_errors: Vec<LoadError>,
}

/// Load every message currently in `inbox`.
///
/// A message whose content or UID cannot be fetched is left out and
/// reported in `load_errors`; the remaining messages still load. A failed
/// search gives an empty scan. Only selecting the inbox is an error.
///
/// All sequence numbers are used here, before any archive step expunges.
pub fn fetch_inbox<M: MailStore + ?Sized>(
    store: &mut M,
    inbox: &str,
) -> Result<InboxScan, MailboxError> {
    store.select(inbox)?;

    let seqs = match store.search_all() {
        Ok(seqs) => seqs,
        Err(e) => {
            warn!(folder = inbox, error = %e, "Inbox search failed");
            return Ok(InboxScan::default());
        }
    };
    debug!("Found {} emails in inbox", seqs.len());

    let mut scan = InboxScan::default();
    for seq in seqs {
        match load_message(store, seq) {
            Ok(message) => scan.messages.push(message),
            Err(e) => {
                warn!("{e}");
                scan.load_errors.push(e);
            }
        }
    }
    Ok(scan)
}

fn load_message<M: MailStore + ?Sized>(store: &mut M, seq: u32) -> Result<InboxMessage, LoadError> {
    let raw = store
        .fetch_rfc822(seq)
        .map_err(|source| LoadError::Fetch { seq, source })?;
    let message = MessageParser::default()
        .parse(raw.as_slice())
        .ok_or(LoadError::Unparsable { seq })?
        .into_owned();
    let uid = store
        .fetch_uid(seq)
        .map_err(|source| LoadError::Uid { seq, source })?;
    Ok(InboxMessage { seq, uid, message })
}

/// Check that both folders can be selected.
///
/// On failure the folders the server does have are logged so the
/// configuration can be corrected.
pub fn verify_folders<M: MailStore + ?Sized>(
    store: &mut M,
    inbox: &str,
    trash: &str,
) -> Result<(), MailboxError> {
    for folder in [inbox, trash] {
        if let Err(e) = store.select(folder) {
            log_available_folders(store);
            return Err(e);
        }
    }
    Ok(())
}

fn log_available_folders<M: MailStore + ?Sized>(store: &mut M) {
    match store.list_folders() {
        Ok(folders) => {
            info!("Available IMAP folders on this server:");
            for name in &folders {
                info!("  - {name}");
            }
            info!("Please update your config file with the correct folder names.");
            info!("Common trash folder names: Trash, Deleted, Deleted Items, Papierkorb, Corbeille");
        }
        Err(e) => warn!("Could not list folders: {e}"),
    }
}

//! Shared types for the message processing pipeline.

use lettre::message::Mailbox;

use crate::config::Config;
use crate::error::{ArchiveError, ConfigError, ReplyError};
use crate::mail::{ReplyTemplate, SenderFilter};

// ── Run context ─────────────────────────────────────────────────────

/// Everything a run needs besides the two connections.
///
/// Built once from the configuration and handed to every stage.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub inbox: String,
    pub trash: String,
    pub filter: SenderFilter,
    pub template: ReplyTemplate,
    /// `From` of every reply.
    pub sender: Mailbox,
}

impl RunContext {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let creds = &config.credentials;
        let address = creds
            .display_mail
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "credentials.display_mail".into(),
                message: format!("{e}"),
            })?;
        let name = Some(creds.display_name.trim().to_string()).filter(|n| !n.is_empty());

        Ok(Self {
            inbox: config.server.inbox_folder.clone(),
            trash: config.server.trash_folder.clone(),
            filter: SenderFilter::new(config.content.request_from.clone()),
            template: config.reply_template(),
            sender: Mailbox::new(name, address),
        })
    }
}

// ── Message outcome ─────────────────────────────────────────────────

/// What happened to one inbox message.
#[derive(Debug)]
pub enum MessageOutcome {
    /// Sender did not match; no reply, not archived.
    FilteredOut,
    /// Sender matched; a reply was attempted and the message archived.
    Handled {
        reply: Result<(), ReplyError>,
        archive: Result<(), ArchiveError>,
    },
}

impl MessageOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FilteredOut => "filtered_out",
            Self::Handled { reply: Ok(()), archive: Ok(()) } => "replied_archived",
            Self::Handled { reply: Err(_), archive: Ok(()) } => "archived_without_reply",
            Self::Handled { reply: Ok(()), archive: Err(_) } => "replied_archive_failed",
            Self::Handled { reply: Err(_), archive: Err(_) } => "reply_and_archive_failed",
        }
    }
}

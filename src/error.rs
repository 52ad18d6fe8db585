//! Error types for the autoresponder.

use std::path::PathBuf;

use crate::mailbox::Uid;

/// Top-level error type. Any of these aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Expected it at '{}'", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inbound mailbox (IMAP) errors.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("IMAP connection to {host} failed: {reason}")]
    ConnectFailed { host: String, reason: String },

    #[error("IMAP login failed: {0}")]
    LoginFailed(String),

    #[error("Folder does not exist or cannot be selected: {0}")]
    FolderNotFound(String),

    #[error("IMAP command {command} rejected: {response}")]
    Rejected { command: String, response: String },

    #[error("Unexpected IMAP response: {0}")]
    Protocol(String),

    #[error("IMAP connection closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound transport (SMTP) errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("SMTP connection to {host} failed: {reason}")]
    ConnectFailed { host: String, reason: String },

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}

/// Why a message could not be loaded from the inbox.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to get email with index '{seq}': {source}")]
    Fetch { seq: u32, source: MailboxError },

    #[error("Failed to get UID for email with index '{seq}': {source}")]
    Uid { seq: u32, source: MailboxError },

    #[error("Email with index '{seq}' is not a parsable message")]
    Unparsable { seq: u32 },
}

/// Why no reply went out for a matched message.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("Invalid recipient address: '{0}'")]
    InvalidRecipient(String),

    #[error("Failed to build reply: {0}")]
    Compose(String),

    #[error(transparent)]
    Send(#[from] TransportError),
}

/// Which archive step failed.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Copying email {uid} to trash failed: {source}")]
    Copy { uid: Uid, source: MailboxError },

    #[error("Flagging email {uid} as deleted failed: {source}")]
    Flag { uid: Uid, source: MailboxError },

    #[error("Expunging inbox failed: {source}")]
    Purge { source: MailboxError },
}

/// Result type alias for the autoresponder.
pub type Result<T> = std::result::Result<T, Error>;

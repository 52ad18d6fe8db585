//! Autoresponder. Answers inbox mail with a templated reply and moves the
//! original to trash.

pub mod config;
pub mod error;
pub mod mail;
pub mod mailbox;
pub mod pipeline;
pub mod transport;

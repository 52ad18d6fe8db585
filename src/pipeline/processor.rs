//! Message processor. Runs every inbox message through filter, reply and
//! archive, one at a time.
//!
//! Flow per message:
//! 1. Sender filter → non-matching messages are only counted
//! 2. Render + compose + send the reply (failures are warnings)
//! 3. Archive, whether or not the reply went out
//!
//! Nothing that happens to a single message stops the batch.

use tracing::{debug, info, warn};

use crate::error::{MailboxError, ReplyError};
use crate::mail::headers::decoded_sender;
use crate::mail::{compose, render_reply};
use crate::mailbox::{InboxMessage, MailStore, archive, fetch_inbox, verify_folders};
use crate::pipeline::stats::RunStatistics;
use crate::pipeline::types::{MessageOutcome, RunContext};
use crate::transport::ReplyTransport;

/// Drives one run over an inbox using borrowed connections.
pub struct MessageProcessor<'a, M: MailStore + ?Sized, T: ReplyTransport + ?Sized> {
    store: &'a mut M,
    transport: &'a mut T,
    ctx: &'a RunContext,
}

impl<'a, M: MailStore + ?Sized, T: ReplyTransport + ?Sized> MessageProcessor<'a, M, T> {
    pub fn new(store: &'a mut M, transport: &'a mut T, ctx: &'a RunContext) -> Self {
        Self {
            store,
            transport,
            ctx,
        }
    }

    /// Load the inbox and process every message in mailbox order.
    ///
    /// Only failing to select the inbox is an error.
    pub fn run(&mut self) -> Result<RunStatistics, MailboxError> {
        let mut stats = RunStatistics::start();

        let scan = fetch_inbox(&mut *self.store, &self.ctx.inbox)?;
        stats.record_loaded(scan.messages.len(), scan.load_errors.len());
        info!(
            count = scan.messages.len(),
            load_errors = scan.load_errors.len(),
            "Processing inbox"
        );

        for message in &scan.messages {
            let outcome = self.process(message);
            debug!(uid = message.uid, outcome = outcome.label(), "Email done");
            stats.record(&outcome);
        }

        Ok(stats)
    }

    /// Filter, reply to and archive one message.
    pub fn process(&mut self, message: &InboxMessage) -> MessageOutcome {
        let sender = decoded_sender(&message.message);
        debug!(uid = message.uid, sender = %sender, "Processing email");

        if !self.ctx.filter.matches(&sender) {
            debug!(
                filter = self.ctx.filter.pattern(),
                "Sender does not match filter - skipping email"
            );
            return MessageOutcome::FilteredOut;
        }

        let reply = self.reply(message);
        if let Err(e) = &reply {
            warn!(uid = message.uid, "Could not send reply: {e}");
        }

        // Archive regardless of the reply result.
        let archived = archive(&mut *self.store, message.uid, &self.ctx.trash);

        MessageOutcome::Handled {
            reply,
            archive: archived,
        }
    }

    fn reply(&mut self, message: &InboxMessage) -> Result<(), ReplyError> {
        let rendered = render_reply(&message.message, &self.ctx.template)?;
        debug!(recipient = %rendered.recipient, "Sending reply");
        let email = compose(&rendered, &self.ctx.sender)?;
        self.transport.send_reply(&email)?;
        debug!(recipient = %rendered.recipient, "Reply sent successfully");
        Ok(())
    }
}

/// Check both folders, then process the inbox.
///
/// Errors returned here are fatal for the run.
pub fn run_inbox<M: MailStore + ?Sized, T: ReplyTransport + ?Sized>(
    store: &mut M,
    transport: &mut T,
    ctx: &RunContext,
) -> Result<RunStatistics, MailboxError> {
    verify_folders(store, &ctx.inbox, &ctx.trash)?;
    MessageProcessor::new(store, transport, ctx).run()
}

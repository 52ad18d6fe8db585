//! Connection teardown around a run.

use tracing::debug;

use crate::error::MailboxError;
use crate::mailbox::MailStore;
use crate::pipeline::processor::run_inbox;
use crate::pipeline::stats::RunStatistics;
use crate::pipeline::types::RunContext;
use crate::transport::ReplyTransport;

/// Run the inbox, then shut down both connections whatever the outcome.
///
/// Teardown failures are logged and never replace the run result.
pub fn run_session<M: MailStore + ?Sized, T: ReplyTransport + ?Sized>(
    store: &mut M,
    transport: &mut T,
    ctx: &RunContext,
) -> Result<RunStatistics, MailboxError> {
    let result = run_inbox(store, transport, ctx);
    close_transport(transport);
    close_mailbox(store);
    result
}

/// Close the selected folder and log out, ignoring failures.
pub fn close_mailbox<M: MailStore + ?Sized>(store: &mut M) {
    if let Err(e) = store.close() {
        debug!("IMAP close failed: {e}");
    }
    if let Err(e) = store.logout() {
        debug!("IMAP logout failed: {e}");
    }
}

/// Shut the transport down, ignoring failures.
pub fn close_transport<T: ReplyTransport + ?Sized>(transport: &mut T) {
    if let Err(e) = transport.quit() {
        debug!("SMTP quit failed: {e}");
    }
}

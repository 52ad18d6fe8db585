//! Message processing pipeline.
//!
//! Every inbox message flows through:
//! 1. `SenderFilter::matches()`: decides whether to answer at all
//! 2. `render_reply()` + `compose()`: recipient, template, MIME message
//! 3. `ReplyTransport::send_reply()`: SMTP
//! 4. `archive()`: copy to trash, flag, expunge
//!
//! `RunStatistics` counts what happened to each message exactly once.

pub mod processor;
pub mod session;
pub mod stats;
pub mod types;

pub use processor::{MessageProcessor, run_inbox};
pub use session::{close_mailbox, close_transport, run_session};
pub use stats::{RunStatistics, RunSummary};
pub use types::{MessageOutcome, RunContext};

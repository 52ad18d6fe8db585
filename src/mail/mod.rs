//! Pure message handling: decoding, filtering, extraction, rendering and
//! composition. Nothing in here touches the network.

pub mod body;
pub mod compose;
pub mod filter;
pub mod headers;
pub mod template;

pub use body::{extract_body, strip_tags};
pub use compose::{RenderedReply, compose, render_reply, resolve_recipient};
pub use filter::SenderFilter;
pub use template::{ReplyTemplate, TemplateValues};

//! Moving processed messages out of the inbox.

use tracing::{debug, warn};

use crate::error::ArchiveError;
use crate::mailbox::{MailStore, Uid};

/// Copy the message to `trash`, flag the original `\Deleted`, expunge.
///
/// The three steps are not atomic. Flag and expunge run even when the copy
/// failed, so a failed copy followed by a successful expunge loses the
/// message. Each failing step is logged; the first failure is returned.
pub fn archive<M: MailStore + ?Sized>(
    store: &mut M,
    uid: Uid,
    trash: &str,
) -> Result<(), ArchiveError> {
    debug!(uid, trash, "Moving email to trash folder");

    let copied = store
        .uid_copy(uid, trash)
        .map_err(|source| ArchiveError::Copy { uid, source });
    let flagged = store
        .uid_flag_deleted(uid)
        .map_err(|source| ArchiveError::Flag { uid, source });
    let purged = store
        .expunge()
        .map_err(|source| ArchiveError::Purge { source });

    for step in [&copied, &flagged, &purged] {
        if let Err(e) = step {
            warn!("{e}");
        }
    }

    copied.and(flagged).and(purged)?;
    debug!(uid, "Email moved to trash successfully");
    Ok(())
}

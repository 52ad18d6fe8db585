//! Run statistics and the end-of-run summary.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::pipeline::types::MessageOutcome;

/// Counters for one run. Only ever incremented.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    /// Messages loaded from the inbox.
    pub messages_seen: u32,
    pub loading_errors: u32,
    pub filtered_out: u32,
    pub reply_attempts: u32,
    pub reply_failures: u32,
    pub archived: u32,
    pub archive_failures: u32,
}

impl RunStatistics {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            messages_seen: 0,
            loading_errors: 0,
            filtered_out: 0,
            reply_attempts: 0,
            reply_failures: 0,
            archived: 0,
            archive_failures: 0,
        }
    }

    pub fn record_loaded(&mut self, loaded: usize, failed: usize) {
        self.messages_seen += loaded as u32;
        self.loading_errors += failed as u32;
    }

    /// Count a message's final outcome. Called exactly once per message.
    pub fn record(&mut self, outcome: &MessageOutcome) {
        match outcome {
            MessageOutcome::FilteredOut => self.filtered_out += 1,
            MessageOutcome::Handled { reply, archive } => {
                self.reply_attempts += 1;
                if reply.is_err() {
                    self.reply_failures += 1;
                }
                match archive {
                    Ok(()) => self.archived += 1,
                    Err(_) => self.archive_failures += 1,
                }
            }
        }
    }

    /// Messages that matched the filter.
    pub fn processed(&self) -> u32 {
        self.messages_seen - self.filtered_out
    }

    pub fn replies_sent(&self) -> u32 {
        self.reply_attempts - self.reply_failures
    }

    pub fn warnings(&self) -> u32 {
        self.loading_errors + self.reply_failures + self.archive_failures
    }

    /// Freeze the counters into a summary, measuring the run time now.
    pub fn summary(&self) -> RunSummary {
        self.summary_at(Utc::now())
    }

    pub fn summary_at(&self, finished_at: DateTime<Utc>) -> RunSummary {
        RunSummary {
            total: self.messages_seen,
            filtered_out: self.filtered_out,
            processed: self.processed(),
            replies_sent: self.replies_sent(),
            archived: self.archived,
            loading_errors: self.loading_errors,
            reply_failures: self.reply_failures,
            archive_failures: self.archive_failures,
            warnings: self.warnings(),
            elapsed_secs: (finished_at - self.started_at).num_milliseconds() as f64 / 1000.0,
        }
    }
}

/// Derived end-of-run figures.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: u32,
    pub filtered_out: u32,
    pub processed: u32,
    pub replies_sent: u32,
    pub archived: u32,
    pub loading_errors: u32,
    pub reply_failures: u32,
    pub archive_failures: u32,
    pub warnings: u32,
    pub elapsed_secs: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.warnings == 0 {
            write!(f, "Executed without warnings ")?;
        } else {
            write!(f, "Executed with {} warnings ", self.warnings)?;
        }
        write!(f, "in {:.3} seconds. ", self.elapsed_secs)?;
        write!(f, "Found {} emails in inbox", self.total)?;
        if self.filtered_out == 0 {
            write!(f, ". ")?;
        } else {
            write!(f, " with {} emails from wrong senders. ", self.filtered_out)?;
        }
        write!(
            f,
            "Processed {} emails, replied to {} emails, moved {} emails to trash.",
            self.processed, self.replies_sent, self.archived
        )?;
        if self.warnings != 0 {
            write!(
                f,
                " Encountered {} errors while loading emails, {} errors while replying and {} errors while moving emails to trash.",
                self.loading_errors, self.reply_failures, self.archive_failures
            )?;
        }
        Ok(())
    }
}

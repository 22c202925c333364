//! Progress reporting out of the chunk loop

use tokio::sync::mpsc;

/// Receives notifications from a running job.
///
/// Called synchronously from the job's blocking task, so a slow sink slows the
/// job down rather than queueing unbounded work.
pub trait ProgressSink: Send + Sync {
    /// Called after every chunk with the running total of source bytes read.
    fn on_progress(&self, bytes_processed: u64, total_bytes: u64);

    /// Human-readable status line. Every job ends with exactly one of these
    /// once it completes or fails.
    fn on_message(&self, text: &str);
}

/// Owned form of a sink notification, for channel-based consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Progress {
        bytes_processed: u64,
        total_bytes: u64,
    },
    Message(String),
}

/// Progress callback type
pub type ProgressFn = Box<dyn Fn(ProgressEvent) + Send + Sync>;

impl ProgressSink for ProgressFn {
    fn on_progress(&self, bytes_processed: u64, total_bytes: u64) {
        self(ProgressEvent::Progress {
            bytes_processed,
            total_bytes,
        });
    }

    fn on_message(&self, text: &str) {
        self(ProgressEvent::Message(text.to_string()));
    }
}

// A closed receiver just means nobody is watching any more.
impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn on_progress(&self, bytes_processed: u64, total_bytes: u64) {
        let _ = self.send(ProgressEvent::Progress {
            bytes_processed,
            total_bytes,
        });
    }

    fn on_message(&self, text: &str) {
        let _ = self.send(ProgressEvent::Message(text.to_string()));
    }
}

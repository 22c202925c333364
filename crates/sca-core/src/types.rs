use serde::{Deserialize, Serialize};
use std::fmt;

/// Status line shown while a job is being prepared.
pub const MSG_LOADING: &str = "Loading...";
/// Status line emitted when a stale output file was removed before a job.
pub const MSG_OLD_FILE_DELETED: &str = "Old file deleted.";
/// Terminal status line of a successful job.
pub const MSG_COMPLETED: &str = "File Completed!";
pub const MSG_NO_PASSWORD: &str = "Please type in a password.";
pub const MSG_BAD_SELECTION: &str = "Something went wrong with selecting your file.";

/// Which way a job transforms its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Encrypt => f.write_str("encrypt"),
            Direction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Lifecycle of the cipher engine and the job it runs.
///
/// ```text
/// Idle → KeyDerived → Running → Completed
///                             ↘ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// No usable key yet
    Idle,
    /// A key has been derived and is waiting for a file
    KeyDerived,
    /// Chunks are being transformed on a background task
    Running,
    /// Every source byte was processed
    Completed,
    /// The job stopped early; partial output stays on disk
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Human-readable progress line, e.g. `"Running...\n12.5/100 MB completed"`.
///
/// The unit is picked from `total` (decimal: KB = 1000 B), and both numbers
/// are rounded to the nearest hundredth.
pub fn describe_progress(done: u64, total: u64) -> String {
    let (scale, suffix) = if total > 1_000_000_000 {
        (1_000_000_000.0, "GB")
    } else if total > 1_000_000 {
        (1_000_000.0, "MB")
    } else if total > 1_000 {
        (1_000.0, "KB")
    } else {
        (1.0, "B")
    };

    let round = |v: u64| (v as f64 / scale * 100.0).round() / 100.0;
    format!("Running...\n{}/{} {suffix} completed", round(done), round(total))
}

//! sca-engine: runs one chunked encrypt or decrypt job at a time
//!
//! A caller derives a key from a password, then starts a job on a file. The
//! chunk loop runs on a blocking Tokio task and reports through a
//! [`ProgressSink`]; the caller gets a [`JobHandle`] back immediately.

pub mod engine;
pub mod sink;

pub use engine::{FileCipherEngine, JobHandle, JobReport};
pub use sink::{ProgressEvent, ProgressFn, ProgressSink};

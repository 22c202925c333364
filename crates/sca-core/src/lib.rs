pub mod config;
pub mod error;
pub mod types;

pub use error::{ScaError, ScaResult};
pub use types::{describe_progress, Direction, JobState};

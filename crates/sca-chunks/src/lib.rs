//! sca-chunks: chunk boundary planning for the file cipher
//!
//! # Overview
//! - `plan`: splits a file of known size into the chunk lengths the engine
//!   reads, accounting for the per-chunk padding added by the block cipher

pub mod plan;

pub use plan::{ciphertext_len, plan, Chunk, ChunkPlan, BLOCK_SIZE};

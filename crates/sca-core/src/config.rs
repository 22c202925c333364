use serde::{Deserialize, Serialize};

use crate::error::{ScaError, ScaResult};

/// Plaintext bytes read per chunk when encrypting (100 MB nominal).
pub const DEFAULT_MAX_PLAIN_CHUNK: u64 = 100_000_000;

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaConfig {
    pub engine: EngineConfig,
    pub log: LogConfig,
}

impl ScaConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ScaResult<()> {
        if self.engine.max_plain_chunk == 0 {
            return Err(ScaError::Config(
                "engine.max_plain_chunk must be greater than zero".into(),
            ));
        }
        let padded = self.engine.max_plain_chunk.checked_add(16);
        if padded.and_then(|n| usize::try_from(n).ok()).is_none() {
            return Err(ScaError::Config(format!(
                "engine.max_plain_chunk {} does not fit in memory on this platform",
                self.engine.max_plain_chunk
            )));
        }
        Ok(())
    }
}

/// What to do when a single chunk fails to encrypt or decrypt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoFailurePolicy {
    /// Fail the whole job at the offending chunk
    #[default]
    Abort,
    /// Log the failure, write nothing for the chunk, keep going.
    /// The output will be missing that chunk.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Plaintext chunk size; encrypt and decrypt must use the same value
    pub max_plain_chunk: u64,
    /// Per-chunk crypto failure handling: "abort" or "skip"
    pub on_crypto_failure: CryptoFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_plain_chunk: DEFAULT_MAX_PLAIN_CHUNK,
            on_crypto_failure: CryptoFailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

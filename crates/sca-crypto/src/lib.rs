//! sca-crypto: password-keyed chunk encryption for sca
//!
//! Pipeline: password → SHA-256 → first 128 bits = AES key → AES-128-ECB with
//! PKCS#7 padding, applied to each chunk independently.
//!
//! ```text
//! encrypt: report.txt     → report.txt.enc
//! decrypt: report.txt.enc → report [decrypted].txt
//! ```
//!
//! # Security
//! This is a compatibility format, not a recommendation. The key derivation
//! has no salt and no work factor, so weak passwords fall to brute force
//! quickly. ECB leaks repeated 16-byte plaintext blocks, and nothing in the
//! output is authenticated.

pub mod cipher;
pub mod kdf;
pub mod names;

pub use cipher::{decrypt_chunk, encrypt_chunk, transform_chunk};
pub use kdf::{derive_key, CipherKey};
pub use names::{has_enc_suffix, resolve_output_path, DECRYPTED_MARKER, ENC_SUFFIX};

/// Size of an AES-128 key in bytes
pub const KEY_SIZE: usize = 16;

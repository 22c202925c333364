//! Key derivation: password → 128-bit AES key

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::KEY_SIZE;

/// A 128-bit AES key derived from a password.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct CipherKey {
    bytes: [u8; KEY_SIZE],
}

impl CipherKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 128-bit key from a password: SHA-256 of the UTF-8 bytes,
/// truncated to the first 16 bytes.
///
/// Returns `None` for an absent or empty password; callers treat that as
/// "no key provided" and do not start a job.
///
/// This is a plain hash, not a password-stretching KDF: there is no salt and
/// no iteration count, so it offers no resistance to offline guessing.
pub fn derive_key(password: Option<&SecretString>) -> Option<CipherKey> {
    let password = password?.expose_secret();
    if password.is_empty() {
        return None;
    }

    let mut digest = Sha256::digest(password.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    digest.as_mut_slice().zeroize();

    Some(CipherKey::from_bytes(key))
}

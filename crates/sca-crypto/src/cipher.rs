//! Per-chunk AES-128-ECB encryption/decryption
//!
//! Each chunk is a self-contained ciphertext:
//! ```text
//! [AES-128-ECB(plaintext || PKCS#7 padding)]
//! ```
//! No IV, nonce, or tag is stored. Padding is added to every chunk, not just
//! the last one, which is why a 100,000,000-byte chunk encrypts to
//! 100,000,016 bytes.
//!
//! ECB encrypts identical 16-byte blocks to identical ciphertext blocks. The
//! mode is kept so existing `.enc` files stay readable.

use aes::Aes128;
use ecb::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyInit};
use sca_core::{Direction, ScaError, ScaResult};

use crate::kdf::CipherKey;

type Aes128EcbEnc = ecb::Encryptor<Aes128>;
type Aes128EcbDec = ecb::Decryptor<Aes128>;

/// Encrypt a single chunk.
///
/// Returns `plaintext.len()` rounded up to the next multiple of 16, plus a full
/// block when the input is already aligned.
pub fn encrypt_chunk(key: &CipherKey, plaintext: &[u8]) -> Vec<u8> {
    Aes128EcbEnc::new(key.as_bytes().into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a single chunk produced by [`encrypt_chunk`].
///
/// Fails when the input is not a whole number of blocks or the padding does
/// not check out, which is what a wrong key or a misaligned chunk looks like.
pub fn decrypt_chunk(key: &CipherKey, ciphertext: &[u8]) -> ScaResult<Vec<u8>> {
    Aes128EcbDec::new(key.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            ScaError::Crypto(format!(
                "chunk decryption failed ({} bytes): wrong password or corrupted data",
                ciphertext.len()
            ))
        })
}

/// Apply the cipher to one chunk in the given direction.
pub fn transform_chunk(key: &CipherKey, direction: Direction, chunk: &[u8]) -> ScaResult<Vec<u8>> {
    match direction {
        Direction::Encrypt => Ok(encrypt_chunk(key, chunk)),
        Direction::Decrypt => decrypt_chunk(key, chunk),
    }
}

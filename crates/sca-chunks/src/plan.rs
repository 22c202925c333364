//! Chunk planning for the streaming file cipher
//!
//! Files are processed in fixed-size chunks so that arbitrarily large files
//! never have to fit in memory. Each chunk is padded independently by the block
//! cipher, so an encrypted file is longer than its plaintext and decryption has
//! to read correspondingly larger chunks:
//!
//! ```text
//! encrypt: read 100_000_000 plaintext bytes  → write 100_000_016
//! decrypt: read 100_000_016 ciphertext bytes → write 100_000_000
//! ```
//!
//! The final chunk in either direction is whatever is left of the file.

use sca_core::Direction;

/// Cipher block size in bytes (AES)
pub const BLOCK_SIZE: u64 = 16;

/// Length of the PKCS#7-padded ciphertext for `plain_len` plaintext bytes.
///
/// Padding always adds between 1 and `BLOCK_SIZE` bytes, so a block-aligned
/// input gains one full block: `ciphertext_len(100_000_000) == 100_000_016`.
pub const fn ciphertext_len(plain_len: u64) -> u64 {
    (plain_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// A contiguous byte range of the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of this chunk in the plan
    pub index: u64,
    /// Byte offset within the source file
    pub offset: u64,
    /// Chunk length in bytes
    pub length: u64,
}

/// Lazy sequence of chunks covering a file of `file_size` bytes.
///
/// Produced by [`plan`]. Chunks come out in ascending offset order and their
/// lengths always sum to `file_size`.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    file_size: u64,
    max_plain: u64,
    full_chunk: u64,
    offset: u64,
    index: u64,
}

impl ChunkPlan {
    /// Bytes read for every chunk except possibly the last.
    pub fn full_chunk_len(&self) -> u64 {
        self.full_chunk
    }

    /// Bytes of the source not yet handed out.
    pub fn remaining(&self) -> u64 {
        self.file_size - self.offset
    }
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }

        // Threshold is the plaintext size in both directions. On decrypt a
        // trailing ciphertext chunk in (max_plain, full_chunk] can only be
        // exactly full_chunk, since both are multiples of BLOCK_SIZE.
        let length = if remaining > self.max_plain {
            self.full_chunk.min(remaining)
        } else {
            remaining
        };

        let chunk = Chunk {
            index: self.index,
            offset: self.offset,
            length,
        };
        self.offset += length;
        self.index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        let n = remaining.div_ceil(self.full_chunk);
        let n = usize::try_from(n).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

/// Plan the chunks of a `file_size`-byte source for `direction`.
///
/// `max_plain` is the plaintext chunk size (the engine default is
/// 100,000,000). Encryption reads `max_plain` bytes per full chunk; decryption
/// reads `ciphertext_len(max_plain)`. A `max_plain` of zero is treated as one.
pub fn plan(file_size: u64, direction: Direction, max_plain: u64) -> ChunkPlan {
    let max_plain = max_plain.max(1);
    let full_chunk = match direction {
        Direction::Encrypt => max_plain,
        Direction::Decrypt => ciphertext_len(max_plain),
    };
    ChunkPlan {
        file_size,
        max_plain,
        full_chunk,
        offset: 0,
        index: 0,
    }
}

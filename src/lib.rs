//! This crate contains software implementations of the MD5 and SHA-256 message digest
//! algorithms. Both are exposed as accumulators with a granular API: data is appended in
//! arbitrary chunk sizes over any number of calls, and the digest is produced once the
//! accumulator is finished. The implementations favor clarity over speed and make no attempt
//! to defend against side channels; MD5 in particular is cryptographically broken and is
//! included purely as a worked algorithm.

use std::convert::TryInto;

use thiserror::Error;

pub mod md5;
pub mod sha256;

pub use crate::md5::{md5, MD5Accumulator};
pub use crate::sha256::{sha256, SHA256Accumulator};

/// Errors reported when reading a digest out of an accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The accumulator has not been finished yet, so no digest has been computed.
    #[error("the digest is unavailable until the accumulator is finished")]
    NotFinalized,
}

/// A stateful hash primitive that consumes input incrementally and produces a fixed-size
/// digest once finished. Implementations buffer partial blocks internally, so the digest is
/// identical no matter how the same byte sequence is split across `append` calls.
///
/// The usual lifecycle is construct, `append` any number of times, then read the digest
/// through one of the finishing accessors. `digest` is the strict accessor: it never
/// finalizes on its own and fails on an unfinished accumulator instead of returning stale
/// or zeroed bytes.
pub trait HashAccumulator: Default {
    /// The block size in bytes consumed by the block transform.
    const BLOCK_SIZE: usize;

    /// The digest size in bytes.
    const DIGEST_SIZE: usize;

    /// The raw digest array produced by this algorithm.
    type Digest: AsRef<[u8]>;

    /// Update the accumulator with more data. Appending an empty slice is a no-op. Appending
    /// non-empty data to an already finished accumulator un-finalizes it: hashing resumes
    /// from the finalized state and a fresh `finish` is required before the digest can be
    /// read again.
    fn append(&mut self, input: &[u8]);

    /// Absorb the padding and the encoded message length, making the digest available.
    /// Finishing an already finished accumulator is a no-op; the digest is not recomputed.
    fn finish(&mut self);

    /// Obtain the raw digest of a finished accumulator, or `DigestError::NotFinalized` if
    /// `finish` has not run yet.
    fn digest(&self) -> Result<Self::Digest, DigestError>;

    /// Finish the accumulator if necessary and return the raw digest.
    fn finalize_digest(&mut self) -> Self::Digest;

    /// Finish the accumulator if necessary and render the digest as a lowercase hex string,
    /// two characters per digest byte.
    fn hexdigest(&mut self) -> String {
        hex::encode(self.finalize_digest())
    }

    /// Convenience method to digest a complete message in one call.
    fn digest_message(input: &[u8]) -> Self::Digest {
        let mut accumulator = Self::default();
        accumulator.append(input);
        accumulator.finalize_digest()
    }
}

/// Copies the ``source`` bytes into the ``dest`` array of double-words, treating every four
/// bytes of ``source`` as one little endian integer. ``source`` must be at least four times
/// as long as ``dest``.
pub(crate) fn align_to_u32a_le(dest: &mut [u32], source: &[u8]) {
    assert!(source.len() >= dest.len() * 4);

    for (word, bytes) in dest.iter_mut().zip(source.chunks_exact(4)) {
        *word = u32::from_le_bytes(bytes.try_into().unwrap());
    }
}

/// Copies the ``source`` bytes into the ``dest`` array of double-words, treating every four
/// bytes of ``source`` as one big endian integer. ``source`` must be at least four times
/// as long as ``dest``.
pub(crate) fn align_to_u32a_be(dest: &mut [u32], source: &[u8]) {
    assert!(source.len() >= dest.len() * 4);

    for (word, bytes) in dest.iter_mut().zip(source.chunks_exact(4)) {
        *word = u32::from_be_bytes(bytes.try_into().unwrap());
    }
}

/// One full block of padding. Finalization appends a prefix of this table: the `0x80`
/// end-of-message marker followed by as many zero bytes as the padding rule requires.
pub(crate) static PADDING: [u8; 64] = [
    0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

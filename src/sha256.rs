#![allow(clippy::unreadable_literal)]

use std::convert::TryInto;
use std::fmt;

use crate::{align_to_u32a_be, DigestError, HashAccumulator, PADDING};

/// the hash block length in bytes
const BLOCK_LENGTH_BYTES: usize = 64;

/// the digest length in bytes
const DIGEST_LENGTH_BYTES: usize = 32;

/// The initial state for any SHA-256 hash, the first 32 bits of the fractional parts of
/// the square roots of the first eight primes.
pub const INITIAL_STATE: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

/// round constants, the first 32 bits of the fractional parts of the cube roots of the
/// first 64 primes
static MAGIC_CUBE_ROOT_SCALARS: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5,
    0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3,
    0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc,
    0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7,
    0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13,
    0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3,
    0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5,
    0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208,
    0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// An incremental SHA-256 hash of FIPS 180-2. The interface matches ``MD5Accumulator``:
/// input is appended in arbitrary chunks and the 256 bit digest becomes available once the
/// accumulator is finished. All multi-byte encoding is big endian where MD5 is little
/// endian.
#[derive(Debug, Copy, Clone)]
pub struct SHA256Accumulator {
    /// bytes that did not fill the last 64 byte block
    buffer: [u8; BLOCK_LENGTH_BYTES],
    buffer_length: usize,
    /// total number of appended bits
    bit_count: u64,
    state: [u32; 8],
    digest: [u8; DIGEST_LENGTH_BYTES],
    finalized: bool,
}

impl SHA256Accumulator {
    /// Create an empty accumulator in the initial state mandated by FIPS 180-2.
    pub fn new() -> Self {
        SHA256Accumulator {
            buffer: [0; BLOCK_LENGTH_BYTES],
            buffer_length: 0,
            bit_count: 0,
            state: INITIAL_STATE,
            digest: [0; DIGEST_LENGTH_BYTES],
            finalized: false,
        }
    }

    /// Digest ``message`` in one call. The returned accumulator is already finished.
    pub fn from_message(message: &[u8]) -> Self {
        let mut accumulator = Self::new();
        accumulator.append(message);
        accumulator.finish();
        accumulator
    }

    /// Update the hash with more data. The digest is identical no matter how the same byte
    /// sequence is split across calls. Appending an empty slice changes nothing; appending
    /// non-empty data to a finished accumulator un-finalizes it and hashing resumes from
    /// the finalized state.
    pub fn append(&mut self, input: &[u8]) {
        if input.is_empty() {
            return;
        }
        self.finalized = false;

        self.bit_count = self.bit_count.wrapping_add((input.len() as u64) << 3);

        // complete the partial block left over from earlier appends first, if any
        let mut input_data_offset = 0;
        if self.buffer_length > 0 {
            if self.buffer_length + input.len() >= BLOCK_LENGTH_BYTES {
                input_data_offset = BLOCK_LENGTH_BYTES - self.buffer_length;
                self.buffer[self.buffer_length..].copy_from_slice(&input[..input_data_offset]);
                round_function(&mut self.state, &self.buffer);
                self.buffer_length = 0;
            } else {
                self.buffer[self.buffer_length..self.buffer_length + input.len()]
                    .copy_from_slice(input);
                self.buffer_length += input.len();
                return;
            }
        }

        // digest all remaining full blocks straight from the input without copying
        let mut blocks = input[input_data_offset..].chunks_exact(BLOCK_LENGTH_BYTES);
        for block in &mut blocks {
            round_function(&mut self.state, block.try_into().unwrap());
        }

        // buffer whatever does not fill a block
        let remainder = blocks.remainder();
        self.buffer[..remainder.len()].copy_from_slice(remainder);
        self.buffer_length = remainder.len();
    }

    /// Finish the hash by absorbing the padding and the encoded message length through the
    /// regular append machinery, then encode the state into the digest. Finishing an
    /// already finished accumulator is a no-op.
    pub fn finish(&mut self) {
        if self.finalized {
            return;
        }

        // the pre-padding bit count, encoded as one big endian quad-word
        let length_bytes = self.bit_count.to_be_bytes();

        // pad out to 56 modulo 64; the appends run the block transform as needed
        let padding_length = if self.buffer_length < 56 {
            56 - self.buffer_length
        } else {
            120 - self.buffer_length
        };
        self.append(&PADDING[..padding_length]);
        self.append(&length_bytes);

        for (i, word) in self.state.iter().enumerate() {
            self.digest[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
        }

        // zero the working data; the digest no longer depends on it
        self.buffer = [0; BLOCK_LENGTH_BYTES];
        self.bit_count = 0;
        self.finalized = true;
    }

    /// Obtain the raw digest of a finished accumulator. Fails with
    /// `DigestError::NotFinalized` if `finish` has not run.
    pub fn digest(&self) -> Result<[u8; DIGEST_LENGTH_BYTES], DigestError> {
        if self.finalized {
            Ok(self.digest)
        } else {
            Err(DigestError::NotFinalized)
        }
    }

    /// Finish the accumulator if necessary and return the raw digest bytes.
    pub fn finalize_digest(&mut self) -> [u8; DIGEST_LENGTH_BYTES] {
        self.finish();
        self.digest
    }

    /// Finish the accumulator if necessary and render the digest as 64 lowercase hex
    /// characters.
    pub fn hexdigest(&mut self) -> String {
        hex::encode(self.finalize_digest())
    }
}

impl Default for SHA256Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAccumulator for SHA256Accumulator {
    const BLOCK_SIZE: usize = BLOCK_LENGTH_BYTES;
    const DIGEST_SIZE: usize = DIGEST_LENGTH_BYTES;
    type Digest = [u8; DIGEST_LENGTH_BYTES];

    fn append(&mut self, input: &[u8]) {
        SHA256Accumulator::append(self, input)
    }

    fn finish(&mut self) {
        SHA256Accumulator::finish(self);
    }

    fn digest(&self) -> Result<Self::Digest, DigestError> {
        SHA256Accumulator::digest(self)
    }

    fn finalize_digest(&mut self) -> Self::Digest {
        SHA256Accumulator::finalize_digest(self)
    }
}

/// Renders the hexdigest of a copy of the accumulator, finishing the copy if necessary.
/// The accumulator itself is left untouched.
impl fmt::Display for SHA256Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut copy = *self;
        write!(f, "{}", copy.hexdigest())
    }
}

/// Apply the SHA-256 block transform to ``state``, mixing in one block of input data. The
/// 16 double-words of the block are extended into a 64 entry message schedule, which is
/// then compressed into the state.
///
/// # Parameters
/// ``state`` the running hash state that the block is compressed into
/// ``block`` a 64 byte block of input data
fn round_function(state: &mut [u32; 8], block: &[u8; BLOCK_LENGTH_BYTES]) {
    let mut message_schedule = [0_u32; 64];
    align_to_u32a_be(&mut message_schedule[0..16], block);

    for i in 16..64 {
        let sigma_0 = message_schedule[i - 15].rotate_right(7)
            ^ message_schedule[i - 15].rotate_right(18)
            ^ (message_schedule[i - 15] >> 3);
        let sigma_1 = message_schedule[i - 2].rotate_right(17)
            ^ message_schedule[i - 2].rotate_right(19)
            ^ (message_schedule[i - 2] >> 10);
        message_schedule[i] = message_schedule[i - 16]
            .wrapping_add(sigma_0)
            .wrapping_add(message_schedule[i - 7])
            .wrapping_add(sigma_1);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for i in 0..64 {
        let big_sigma_1 = e.rotate_right(6) ^ e.rotate_right(11) ^ e.rotate_right(25);
        let choose = (e & f) ^ (!e & g);
        let temp_1 = h
            .wrapping_add(big_sigma_1)
            .wrapping_add(choose)
            .wrapping_add(MAGIC_CUBE_ROOT_SCALARS[i])
            .wrapping_add(message_schedule[i]);
        let big_sigma_0 = a.rotate_right(2) ^ a.rotate_right(13) ^ a.rotate_right(22);
        let majority = (a & b) ^ (a & c) ^ (b & c);
        let temp_2 = big_sigma_0.wrapping_add(majority);

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(temp_1);
        d = c;
        c = b;
        b = a;
        a = temp_1.wrapping_add(temp_2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

/// Digest ``message`` with SHA-256 and render the digest as 64 lowercase hex characters.
pub fn sha256(message: &str) -> String {
    SHA256Accumulator::from_message(message.as_bytes()).hexdigest()
}

#![allow(clippy::unreadable_literal)]
#![allow(clippy::zero_prefixed_literal)]

use std::convert::TryInto;
use std::fmt;

use crate::{align_to_u32a_le, DigestError, HashAccumulator, PADDING};

/// the hash block length in bytes
const BLOCK_LENGTH_BYTES: usize = 64;

/// the hash block length in 32 bit integers
const BLOCK_LENGTH_DOUBLE_WORDS: usize = BLOCK_LENGTH_BYTES / 4;

/// the digest length in bytes
const DIGEST_LENGTH_BYTES: usize = 16;

/// The initial state for any MD5 hash. From here, all blocks are applied.
pub const INITIAL_STATE: [u32; 4] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476];

/// bits rotated per round
static ROUND_ROTATION_COUNT: [u32; 64] = [
    07, 12, 17, 22, 07, 12, 17, 22, 07, 12, 17, 22, 07, 12, 17, 22,
    05, 09, 14, 20, 05, 09, 14, 20, 05, 09, 14, 20, 05, 09, 14, 20,
    04, 11, 16, 23, 04, 11, 16, 23, 04, 11, 16, 23, 04, 11, 16, 23,
    06, 10, 15, 21, 06, 10, 15, 21, 06, 10, 15, 21, 06, 10, 15, 21];

/// binary floored values of sin(i + 1) * 2^32 where i is the array index
static MAGIC_SINUS_SCALARS: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee,
    0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be,
    0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa,
    0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c,
    0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05,
    0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039,
    0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1,
    0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391];

/// An incremental MD5 hash of RFC 1321. Input is appended in arbitrary chunks; the 128 bit
/// digest becomes available once the accumulator is finished. Copying the accumulator
/// duplicates its full state, so hashing may resume from a copy.
#[derive(Debug, Copy, Clone)]
pub struct MD5Accumulator {
    /// bytes that did not fill the last 64 byte block
    buffer: [u8; BLOCK_LENGTH_BYTES],
    buffer_length: usize,
    /// 64 bit counter of appended bits, low word first
    bit_count: [u32; 2],
    state: [u32; 4],
    digest: [u8; DIGEST_LENGTH_BYTES],
    finalized: bool,
}

impl MD5Accumulator {
    /// Create an empty accumulator in the initial state mandated by RFC 1321.
    pub fn new() -> Self {
        MD5Accumulator {
            buffer: [0; BLOCK_LENGTH_BYTES],
            buffer_length: 0,
            bit_count: [0; 2],
            state: INITIAL_STATE,
            digest: [0; DIGEST_LENGTH_BYTES],
            finalized: false,
        }
    }

    /// Digest ``message`` in one call. The returned accumulator is already finished, so the
    /// digest can be read immediately.
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

        // update the bit counter, carrying overflow of the low word into the high word
        let appended_bits = ((input.len() as u64) << 3) as u32;
        self.bit_count[0] = self.bit_count[0].wrapping_add(appended_bits);
        if self.bit_count[0] < appended_bits {
            self.bit_count[1] = self.bit_count[1].wrapping_add(1);
        }
        self.bit_count[1] = self.bit_count[1].wrapping_add((input.len() as u64 >> 29) as u32);

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

        // encode the pre-padding bit count, low word first
        let mut length_bytes = [0u8; 8];
        length_bytes[..4].copy_from_slice(&self.bit_count[0].to_le_bytes());
        length_bytes[4..].copy_from_slice(&self.bit_count[1].to_le_bytes());

        // pad out to 56 modulo 64; the appends run the block transform as needed
        let padding_length = if self.buffer_length < 56 {
            56 - self.buffer_length
        } else {
            120 - self.buffer_length
        };
        self.append(&PADDING[..padding_length]);
        self.append(&length_bytes);

        for (i, word) in self.state.iter().enumerate() {
            self.digest[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
        }

        // zero the working data; the digest no longer depends on it
        self.buffer = [0; BLOCK_LENGTH_BYTES];
        self.bit_count = [0; 2];
        self.finalized = true;
    }

    /// Obtain the raw digest of a finished accumulator. Fails with
    /// `DigestError::NotFinalized` if `finish` has not run, rather than returning stale or
    /// zeroed bytes.
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

    /// Finish the accumulator if necessary and render the digest as 32 lowercase hex
    /// characters, most significant nibble of each byte first.
    pub fn hexdigest(&mut self) -> String {
        hex::encode(self.finalize_digest())
    }
}

impl Default for MD5Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashAccumulator for MD5Accumulator {
    const BLOCK_SIZE: usize = BLOCK_LENGTH_BYTES;
    const DIGEST_SIZE: usize = DIGEST_LENGTH_BYTES;
    type Digest = [u8; DIGEST_LENGTH_BYTES];

    fn append(&mut self, input: &[u8]) {
        MD5Accumulator::append(self, input)
    }

    fn finish(&mut self) {
        MD5Accumulator::finish(self);
    }

    fn digest(&self) -> Result<Self::Digest, DigestError> {
        MD5Accumulator::digest(self)
    }

    fn finalize_digest(&mut self) -> Self::Digest {
        MD5Accumulator::finalize_digest(self)
    }
}

/// Renders the hexdigest of a copy of the accumulator, finishing the copy if necessary.
/// The accumulator itself is left untouched.
impl fmt::Display for MD5Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut copy = *self;
        write!(f, "{}", copy.hexdigest())
    }
}

/// Apply the MD5 block transform to ``state``, mixing in one block of input data.
///
/// # Parameters
/// ``state`` the running hash state that the block is compressed into
/// ``block`` a 64 byte block of input data
fn round_function(state: &mut [u32; 4], block: &[u8; BLOCK_LENGTH_BYTES]) {
    let mut input_block = [0u32; BLOCK_LENGTH_DOUBLE_WORDS];
    align_to_u32a_le(&mut input_block, block);

    let [mut a, mut b, mut c, mut d] = *state;

    for i in 0..BLOCK_LENGTH_BYTES {
        let (scrambled_data, message_index) = match i {
            0..=15 => (d ^ (b & (c ^ d)), i),
            16..=31 => (c ^ (d & (b ^ c)), (5 * i + 1) % BLOCK_LENGTH_DOUBLE_WORDS),
            32..=47 => (b ^ c ^ d, (3 * i + 5) % BLOCK_LENGTH_DOUBLE_WORDS),
            48..=63 => (c ^ (b | !d), (7 * i) % BLOCK_LENGTH_DOUBLE_WORDS),
            _ => unreachable!(),
        };

        let temp = d;
        d = c;
        c = b;
        b = b.wrapping_add(
            a.wrapping_add(scrambled_data)
                .wrapping_add(MAGIC_SINUS_SCALARS[i])
                .wrapping_add(input_block[message_index])
                .rotate_left(ROUND_ROTATION_COUNT[i]),
        );
        a = temp;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}

/// Digest ``message`` with MD5 and render the digest as 32 lowercase hex characters.
pub fn md5(message: &str) -> String {
    MD5Accumulator::from_message(message.as_bytes()).hexdigest()
}

#[cfg(test)]
mod tests {
    use crate::tests::{assert_chunking_invariant, LONG_TEXT, SOME_TEXT, STREAM_TEXT};

    use super::*;

    #[test]
    fn test_md5_rfc_suite() {
        assert_eq!(md5(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5("a"), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(md5("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(md5("message digest"), "f96b697d7cb7938d525a2f31aaf161d0");
        assert_eq!(
            md5("abcdefghijklmnopqrstuvwxyz"),
            "c3fcd3d76192e4007dfb496cca67e13b"
        );
        assert_eq!(
            md5("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"),
            "d174ab98d277d9f5a5611c2c9f419d9f"
        );
        assert_eq!(
            md5("12345678901234567890123456789012345678901234567890123456789012345678901234567890"),
            "57edf4a22be3c955ac49da2e2107b67a"
        );
    }

    #[test]
    fn test_md5_known_strings() {
        assert_eq!(
            md5("The rain in Spain falls mainly on the plains."),
            "a7a5a692ff3af6078c52465015dbebba"
        );
    }

    #[test]
    fn test_md5_mixed_binary_buffer() {
        let data: [u8; 30] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x10, 0x11, 0x12,
            0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x30, 0x31, 0x30, 0x32, 0x33, 0x34, 0x35,
            0x36, 0x37, 0x38, 0x39,
        ];

        let mut accumulator = MD5Accumulator::new();
        accumulator.append(&data);
        assert_eq!(accumulator.hexdigest(), "3271e81510b4854cff43e57b103d3dd1");
    }

    #[test]
    fn test_md5_stream() {
        let mut accumulator = MD5Accumulator::new();
        accumulator.append(STREAM_TEXT[0].as_bytes());
        accumulator.append(STREAM_TEXT[1].as_bytes());
        accumulator.append(STREAM_TEXT[2].as_bytes());

        assert_eq!(accumulator.hexdigest(), md5(&STREAM_TEXT.concat()));
    }

    #[test]
    fn test_md5_single_byte_appends() {
        assert_chunking_invariant::<MD5Accumulator>(
            LONG_TEXT.as_bytes(),
            &vec![1; LONG_TEXT.len()],
        );
    }

    #[test]
    fn test_md5_block_boundary_lengths() {
        for length in &[55usize, 56, 57, 63, 64, 65, 119, 128] {
            let input = vec![b'a'; *length];
            assert_chunking_invariant::<MD5Accumulator>(&input, &[*length / 2]);
        }
    }

    #[test]
    fn test_md5_million_a() {
        let input = vec![b'a'; 1_000_000];
        let mut accumulator = MD5Accumulator::new();
        accumulator.append(&input);
        assert_eq!(accumulator.hexdigest(), "7707d6ae4e027c70eea2a935c2296f21");
    }

    #[test]
    fn test_md5_finish_is_idempotent() {
        let mut accumulator = MD5Accumulator::new();
        accumulator.append(SOME_TEXT.as_bytes());

        accumulator.finish();
        let first = accumulator.digest().unwrap();
        accumulator.finish();
        let second = accumulator.digest().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_md5_digest_before_finish_fails() {
        let empty = MD5Accumulator::new();
        assert_eq!(empty.digest(), Err(DigestError::NotFinalized));

        let mut pending = MD5Accumulator::new();
        pending.append(b"some data");
        assert_eq!(pending.digest(), Err(DigestError::NotFinalized));
    }

    #[test]
    fn test_md5_append_after_finish_resumes() {
        let mut accumulator = MD5Accumulator::from_message(b"first part");
        assert!(accumulator.digest().is_ok());

        // appending nothing leaves the accumulator finished
        accumulator.append(b"");
        assert!(accumulator.digest().is_ok());

        // appending data un-finalizes; a fresh finish is required before reading
        accumulator.append(b"second part");
        assert_eq!(accumulator.digest(), Err(DigestError::NotFinalized));
        accumulator.finish();
        assert!(accumulator.digest().is_ok());
    }

    #[test]
    fn test_md5_resume_from_copy() {
        let mut original = MD5Accumulator::new();
        original.append(STREAM_TEXT[0].as_bytes());

        let mut copy = original;
        original.append(STREAM_TEXT[1].as_bytes());
        copy.append(STREAM_TEXT[2].as_bytes());

        assert_eq!(
            original.hexdigest(),
            md5(&[STREAM_TEXT[0], STREAM_TEXT[1]].concat())
        );
        assert_eq!(
            copy.hexdigest(),
            md5(&[STREAM_TEXT[0], STREAM_TEXT[2]].concat())
        );
    }

    #[test]
    fn test_md5_display() {
        let finished = MD5Accumulator::from_message(b"abc");
        assert_eq!(finished.to_string(), "900150983cd24fb0d6963f7d28e17f72");

        // display finishes a copy; the accumulator itself stays unfinished
        let pending = MD5Accumulator::new();
        assert_eq!(pending.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
        assert!(pending.digest().is_err());
    }

    #[test]
    fn test_md5_from_message_matches_digest_message() {
        let mut accumulator = MD5Accumulator::from_message(SOME_TEXT.as_bytes());
        assert_eq!(
            accumulator.finalize_digest(),
            MD5Accumulator::digest_message(SOME_TEXT.as_bytes())
        );
    }
}

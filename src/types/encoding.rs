//! Binary encoding and decoding traits for deterministic serialization.
//!
//! The wire format follows the Bitcoin-family serializer used by Equihash
//! chains, so header bytes produced here hash identically on every node.
//!
//! # Binary Format
//!
//! - Integers: little-endian, fixed-width
//! - `[u8; N]` (hashes, nonces): raw bytes, no length prefix
//! - `Vec<T>` / `Bytes`: CompactSize length prefix followed by the elements
//!
//! # CompactSize
//!
//! | value range            | encoding                 |
//! |------------------------|--------------------------|
//! | `0..=0xFC`             | 1 byte                   |
//! | `0xFD..=0xFFFF`        | `0xFD` + `u16` LE        |
//! | `0x1_0000..=u32::MAX`  | `0xFE` + `u32` LE        |
//! | above                  | `0xFF` + `u64` LE        |
//!
//! Decoding requires the shortest form and a value no larger than [`MAX_SIZE`].

use crate::types::bytes::Bytes;
use crate::types::hash::{Hash, Hasher};
use equiblock_derive::Error;

/// Upper bound for any decoded length prefix, in elements or bytes.
pub const MAX_SIZE: u64 = 0x0200_0000;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers and hashers so a value can be encoded straight
/// into its destination.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Counts encoded bytes without storing them.
///
/// Used by [`Encode::to_bytes`] to allocate the exact capacity up front.
#[derive(Debug, Default)]
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self { len: 0 }
    }

    /// Returns the number of bytes counted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl EncodeSink for Bytes {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Trait for types with a canonical binary form.
pub trait Encode {
    /// Writes the binary representation to the given sink.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Returns the encoded length in bytes.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }

    /// Serializes into a new buffer with exact capacity.
    fn to_bytes(&self) -> Bytes {
        let mut out = Bytes::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }

    /// Digests the encoding with `H`, streaming bytes into the hasher.
    fn hash_with<H: Hasher>(&self) -> Hash {
        let mut hasher = H::default();
        self.encode(&mut hasher);
        hasher.finalize()
    }
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before a fixed field or a declared length was satisfied.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },
    /// Length prefix is not in canonical form or exceeds [`MAX_SIZE`].
    #[error("malformed length prefix: {declared}")]
    MalformedLength { declared: u64 },
    /// Bytes were left over after a complete value was decoded.
    #[error("{remaining} trailing bytes after decoded value")]
    TrailingBytes { remaining: usize },
}

/// Trait for types that can be read back from their canonical binary form.
pub trait Decode: Sized {
    /// Decodes a value from the front of `input`, advancing it past the
    /// consumed bytes.
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError>;

    /// Decodes a value that must span the whole of `data`.
    fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut input = data;
        let value = Self::decode(&mut input)?;

        if !input.is_empty() {
            return Err(DecodeError::TrailingBytes {
                remaining: input.len(),
            });
        }

        Ok(value)
    }
}

/// Reads exactly `n` bytes from the input, advancing the slice.
pub(crate) fn read_bytes<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if input.len() < n {
        return Err(DecodeError::TruncatedInput {
            needed: n,
            remaining: input.len(),
        });
    }
    let (bytes, rest) = input.split_at(n);
    *input = rest;
    Ok(bytes)
}

fn read_array<const N: usize>(input: &mut &[u8]) -> Result<[u8; N], DecodeError> {
    let mut out = [0u8; N];
    out.copy_from_slice(read_bytes(input, N)?);
    Ok(out)
}

/// Writes `value` as a CompactSize.
pub fn write_compact_size<S: EncodeSink>(value: u64, out: &mut S) {
    match value {
        0..=0xFC => out.write(&[value as u8]),
        0xFD..=0xFFFF => {
            out.write(&[0xFD]);
            out.write(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            out.write(&[0xFE]);
            out.write(&(value as u32).to_le_bytes());
        }
        _ => {
            out.write(&[0xFF]);
            out.write(&value.to_le_bytes());
        }
    }
}

/// Reads a canonical CompactSize no larger than [`MAX_SIZE`].
pub fn read_compact_size(input: &mut &[u8]) -> Result<u64, DecodeError> {
    let (value, min) = match u8::decode(input)? {
        tag @ 0..=0xFC => return Ok(u64::from(tag)),
        0xFD => (u64::from(u16::decode(input)?), 0xFD),
        0xFE => (u64::from(u32::decode(input)?), 0x1_0000),
        0xFF => (u64::decode(input)?, 0x1_0000_0000),
    };

    if value < min || value > MAX_SIZE {
        return Err(DecodeError::MalformedLength { declared: value });
    }
    Ok(value)
}

/// Reads a CompactSize length and converts it to `usize`.
pub(crate) fn read_len(input: &mut &[u8]) -> Result<usize, DecodeError> {
    let declared = read_compact_size(input)?;
    usize::try_from(declared).map_err(|_| DecodeError::MalformedLength { declared })
}

impl Encode for u8 {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(&[*self]);
    }
}

impl Decode for u8 {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(read_bytes(input, 1)?[0])
    }
}

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn encode<S: EncodeSink>(&self, out: &mut S) {
                    out.write(&self.to_le_bytes());
                }
            }

            impl Decode for $t {
                fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
                    Ok(<$t>::from_le_bytes(read_array(input)?))
                }
            }
        )*
    };
}

impl_int!(u16, u32, u64, i32, i64);

impl<const N: usize> Encode for [u8; N] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        out.write(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        read_array(input)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        write_compact_size(self.len() as u64, out);
        for item in self {
            item.encode(out);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.as_slice().encode(out);
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        let len = read_len(input)?;

        // Every element occupies at least one byte, so the remaining input
        // bounds the allocation even when the declared count is hostile.
        let mut vec = Vec::with_capacity(len.min(input.len()));
        for _ in 0..len {
            vec.push(T::decode(input)?);
        }
        Ok(vec)
    }
}

impl<T: Encode> Encode for Box<[T]> {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        self.as_ref().encode(out);
    }
}

impl<T: Decode> Decode for Box<[T]> {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Vec::<T>::decode(input)?.into_boxed_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_compact_size(value, &mut out);
        out
    }

    #[test]
    fn size_counter_accumulates() {
        let mut counter = SizeCounter::new();
        assert!(counter.is_empty());

        counter.write(&[1, 2, 3]);
        counter.write(&[4, 5]);
        assert_eq!(counter.len(), 5);
    }

    #[test]
    fn to_bytes_preallocates_exact_capacity() {
        let data: Vec<u8> = vec![1, 2, 3, 4, 5];
        let bytes = data.to_bytes();
        assert_eq!(bytes.len(), 1 + 5);
        assert_eq!(data.encoded_len(), bytes.len());
    }

    #[test]
    fn u32_little_endian() {
        let val: u32 = 0x1d00ffff;
        let bytes = val.to_bytes();
        assert_eq!(bytes.as_slice(), &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(u32::from_bytes(&bytes).unwrap(), val);
    }

    #[test]
    fn i32_negative_values() {
        let bytes = (-1i32).to_bytes();
        assert_eq!(bytes.as_slice(), &[0xFF; 4]);
        assert_eq!(i32::from_bytes(&bytes).unwrap(), -1);
    }

    #[test]
    fn compact_size_boundaries() {
        assert_eq!(compact(0), vec![0x00]);
        assert_eq!(compact(0xFC), vec![0xFC]);
        assert_eq!(compact(0xFD), vec![0xFD, 0xFD, 0x00]);
        assert_eq!(compact(0xFFFF), vec![0xFD, 0xFF, 0xFF]);
        assert_eq!(compact(0x1_0000), vec![0xFE, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(compact(0x1_0000_0000).len(), 9);
    }

    #[test]
    fn compact_size_reads_back() {
        for value in [0u64, 1, 0xFC, 0xFD, 0xFFFF, 0x1_0000, MAX_SIZE] {
            let bytes = compact(value);
            let mut input = bytes.as_slice();
            assert_eq!(read_compact_size(&mut input).unwrap(), value);
            assert!(input.is_empty());
        }
    }

    #[test]
    fn compact_size_rejects_non_canonical() {
        // 5 fits in one byte, so the 0xFD form is not canonical.
        let mut input: &[u8] = &[0xFD, 0x05, 0x00];
        assert_eq!(
            read_compact_size(&mut input),
            Err(DecodeError::MalformedLength { declared: 5 })
        );

        let mut input: &[u8] = &[0xFE, 0xFF, 0xFF, 0x00, 0x00];
        assert!(matches!(
            read_compact_size(&mut input),
            Err(DecodeError::MalformedLength { .. })
        ));
    }

    #[test]
    fn compact_size_rejects_above_ceiling() {
        let bytes = compact(MAX_SIZE + 1);
        let mut input = bytes.as_slice();
        assert_eq!(
            read_compact_size(&mut input),
            Err(DecodeError::MalformedLength {
                declared: MAX_SIZE + 1
            })
        );
    }

    #[test]
    fn compact_size_truncated_payload() {
        let mut input: &[u8] = &[0xFE, 0x00];
        assert!(matches!(
            read_compact_size(&mut input),
            Err(DecodeError::TruncatedInput { needed: 4, remaining: 1 })
        ));
    }

    #[test]
    fn vec_encoding_format() {
        let vec: Vec<u16> = vec![0xAABB, 0xCCDD];
        let bytes = vec.to_bytes();
        assert_eq!(bytes.as_slice(), &[0x02, 0xBB, 0xAA, 0xDD, 0xCC]);
        assert_eq!(Vec::<u16>::from_bytes(&bytes).unwrap(), vec);
    }

    #[test]
    fn vec_hostile_count_is_truncated_not_allocated() {
        // Declares MAX_SIZE elements but carries none.
        let bytes = compact(MAX_SIZE);
        let result = Vec::<u64>::from_bytes(&bytes);
        assert!(matches!(result, Err(DecodeError::TruncatedInput { .. })));
    }

    #[test]
    fn boxed_slice_matches_vec_encoding() {
        let vec: Vec<u32> = vec![1, 2, 3];
        let boxed: Box<[u32]> = vec.clone().into_boxed_slice();
        assert_eq!(vec.to_bytes(), boxed.to_bytes());
        assert_eq!(Box::<[u32]>::from_bytes(&boxed.to_bytes()).unwrap(), boxed);
    }

    #[test]
    fn array_has_no_length_prefix() {
        let arr = [7u8; 32];
        let bytes = arr.to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(<[u8; 32]>::from_bytes(&bytes).unwrap(), arr);
    }

    #[test]
    fn truncated_fixed_field() {
        let result = u32::from_bytes(&[0x12, 0x34]);
        assert_eq!(
            result,
            Err(DecodeError::TruncatedInput {
                needed: 4,
                remaining: 2
            })
        );
    }

    #[test]
    fn trailing_bytes_rejected() {
        let result = u8::from_bytes(&[42, 0xFF, 0xFF]);
        assert_eq!(result, Err(DecodeError::TrailingBytes { remaining: 2 }));
    }

    #[test]
    fn decode_advances_input() {
        let mut input: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05];

        assert_eq!(u8::decode(&mut input).unwrap(), 0x01);
        assert_eq!(u16::decode(&mut input).unwrap(), 0x0302);
        assert_eq!(input.len(), 2);
    }

    #[test]
    fn error_messages() {
        let err = DecodeError::TruncatedInput {
            needed: 32,
            remaining: 3,
        };
        assert_eq!(err.to_string(), "truncated input: needed 32 bytes, 3 remaining");
        assert_eq!(
            DecodeError::MalformedLength { declared: 9 }.to_string(),
            "malformed length prefix: 9"
        );
    }
}

//! Configurable bit addressing over byte buffers
//!
//! Compressed pages disagree on how logical bit positions map onto bytes, so
//! both halves of the mapping are explicit policies:
//!
//! - [`BitOrder`] picks which bit inside a byte is read first.
//! - [`BytePairing`] optionally swaps adjacent bytes before addressing.
//!
//! [`BitReader`] and [`BitWriter`] apply the same [`BitStreamConfig`], so a
//! buffer written under one configuration reads back under that configuration.

use crate::config::BitStreamConfig;
use crate::entropy::code_tree::Code;
use crate::error::{HuffError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which bit within a byte is logically first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 7 is read first
    #[default]
    MsbFirst,
    /// Bit 0 is read first
    LsbFirst,
}

impl BitOrder {
    /// Shift that brings logical bit `bit_in_byte` (0..8) down to position 0
    #[inline]
    pub fn shift(self, bit_in_byte: usize) -> u32 {
        debug_assert!(bit_in_byte < 8);
        match self {
            BitOrder::MsbFirst => 7 - bit_in_byte as u32,
            BitOrder::LsbFirst => bit_in_byte as u32,
        }
    }
}

impl fmt::Display for BitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitOrder::MsbFirst => f.write_str("msb"),
            BitOrder::LsbFirst => f.write_str("lsb"),
        }
    }
}

impl FromStr for BitOrder {
    type Err = HuffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msb" | "msb_first" | "msb-first" => Ok(BitOrder::MsbFirst),
            "lsb" | "lsb_first" | "lsb-first" => Ok(BitOrder::LsbFirst),
            other => Err(HuffError::configuration(format!(
                "unknown bit order '{}', expected 'msb' or 'lsb'",
                other
            ))),
        }
    }
}

/// Address translation applied to byte indices before bit addressing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BytePairing {
    /// Logical byte `i` is physical byte `i`
    #[default]
    Identity,
    /// Logical byte `i` is physical byte `i ^ 1` (adjacent bytes swapped)
    SwapPairs,
}

impl BytePairing {
    /// Physical byte address for a logical byte index
    #[inline]
    pub fn physical(self, logical_byte: usize) -> usize {
        match self {
            BytePairing::Identity => logical_byte,
            BytePairing::SwapPairs => logical_byte ^ 1,
        }
    }
}

impl fmt::Display for BytePairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BytePairing::Identity => f.write_str("identity"),
            BytePairing::SwapPairs => f.write_str("swap"),
        }
    }
}

impl FromStr for BytePairing {
    type Err = HuffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(BytePairing::Identity),
            "swap" | "swap_pairs" | "swap-pairs" => Ok(BytePairing::SwapPairs),
            other => Err(HuffError::configuration(format!(
                "unknown byte pairing '{}', expected 'identity' or 'swap'",
                other
            ))),
        }
    }
}

impl BitStreamConfig {
    /// Physical byte address and in-byte shift of a logical bit position
    #[inline]
    pub fn locate(&self, bit: usize) -> (usize, u32) {
        let byte = self.byte_pairing.physical(bit / 8);
        (byte, self.bit_order.shift(bit % 8))
    }
}

/// Lazy reader over the bits `[start, end)` of a buffer
///
/// Yields `Err(BufferUnderrun)` once if an address falls outside the buffer,
/// after which the reader is exhausted.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    config: BitStreamConfig,
    position: usize,
    end: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader for `[start_bit, end_bit)` of a buffer holding `total_bits`
    pub fn new(
        buffer: &'a [u8],
        total_bits: usize,
        start_bit: usize,
        end_bit: usize,
        config: BitStreamConfig,
    ) -> Result<Self> {
        if start_bit > end_bit {
            return Err(HuffError::invalid_input(format!(
                "bit range start {} is past end {}",
                start_bit, end_bit
            )));
        }
        if end_bit > total_bits {
            return Err(HuffError::invalid_input(format!(
                "bit range end {} exceeds total bit count {}",
                end_bit, total_bits
            )));
        }
        Ok(Self {
            buffer,
            config,
            position: start_bit,
            end: end_bit,
        })
    }

    /// Logical position of the next bit to be read
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bits left in the range
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.position
    }

    /// Read one bit without the iterator wrapper
    #[inline]
    pub fn read_bit(&mut self) -> Option<Result<bool>> {
        if self.position >= self.end {
            return None;
        }
        let bit = self.position;
        let (byte, shift) = self.config.locate(bit);
        match self.buffer.get(byte) {
            Some(&value) => {
                self.position += 1;
                Some(Ok((value >> shift) & 1 == 1))
            }
            None => {
                self.position = self.end;
                Some(Err(HuffError::buffer_underrun(bit, byte, self.buffer.len())))
            }
        }
    }
}

impl Iterator for BitReader<'_> {
    type Item = Result<bool>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.read_bit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl std::iter::FusedIterator for BitReader<'_> {}

/// Read the bits `[start_bit, end_bit)` of `buffer` lazily
pub fn read_bits(
    buffer: &[u8],
    total_bits: usize,
    start_bit: usize,
    end_bit: usize,
    config: BitStreamConfig,
) -> Result<BitReader<'_>> {
    BitReader::new(buffer, total_bits, start_bit, end_bit, config)
}

/// An owned bit sequence: packed bytes plus the number of meaningful bits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitBuffer {
    /// Wrap an externally supplied payload
    pub fn new(bytes: Vec<u8>, bit_len: usize) -> Result<Self> {
        if bit_len > bytes.len() * 8 {
            return Err(HuffError::invalid_input(format!(
                "bit length {} exceeds {} bytes of payload",
                bit_len,
                bytes.len()
            )));
        }
        Ok(Self { bytes, bit_len })
    }

    /// Packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of meaningful bits
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// True when no bits are stored
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Reader over every stored bit
    pub fn reader(&self, config: BitStreamConfig) -> BitReader<'_> {
        BitReader {
            buffer: &self.bytes,
            config,
            position: 0,
            end: self.bit_len,
        }
    }

    /// Take the packed bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Appends bits under a [`BitStreamConfig`]
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
    config: BitStreamConfig,
}

impl BitWriter {
    /// Create a writer using the given addressing policies
    pub fn new(config: BitStreamConfig) -> Self {
        Self {
            bytes: Vec::new(),
            bit_len: 0,
            config,
        }
    }

    /// Create a writer sized for roughly `bits` bits
    pub fn with_capacity(bits: usize, config: BitStreamConfig) -> Self {
        Self {
            bytes: Vec::with_capacity(bits / 8 + 2),
            bit_len: 0,
            config,
        }
    }

    /// Append one bit
    #[inline]
    pub fn push_bit(&mut self, bit: bool) {
        let (byte, shift) = self.config.locate(self.bit_len);
        if byte >= self.bytes.len() {
            self.bytes.resize(byte + 1, 0);
        }
        if bit {
            self.bytes[byte] |= 1 << shift;
        }
        self.bit_len += 1;
    }

    /// Append a codeword, most significant bit first
    #[inline]
    pub fn push_code(&mut self, code: Code) {
        for i in (0..code.len()).rev() {
            self.push_bit((code.bits() >> i) & 1 == 1);
        }
    }

    /// Number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Finish writing
    pub fn finish(self) -> BitBuffer {
        BitBuffer {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(reader: BitReader<'_>) -> Result<Vec<bool>> {
        reader.collect()
    }

    #[test]
    fn test_msb_first_identity() {
        let buffer = [0b1010_0000u8, 0b0000_0001];
        let bits = collect(read_bits(&buffer, 16, 0, 16, BitStreamConfig::default()).unwrap())
            .unwrap();
        assert_eq!(&bits[..4], &[true, false, true, false]);
        assert!(bits[15]);
        assert_eq!(bits.iter().filter(|&&b| b).count(), 3);
    }

    #[test]
    fn test_lsb_first() {
        let config = BitStreamConfig::new(BitOrder::LsbFirst, BytePairing::Identity);
        let buffer = [0b0000_0101u8];
        let bits = collect(read_bits(&buffer, 8, 0, 4, config).unwrap()).unwrap();
        assert_eq!(bits, vec![true, false, true, false]);
    }

    #[test]
    fn test_swap_pairs_reads_odd_byte_first() {
        let config = BitStreamConfig::new(BitOrder::MsbFirst, BytePairing::SwapPairs);
        let buffer = [0x00u8, 0xFF];
        let bits = collect(read_bits(&buffer, 16, 0, 16, config).unwrap()).unwrap();
        assert!(bits[..8].iter().all(|&b| b));
        assert!(bits[8..].iter().all(|&b| !b));
    }

    #[test]
    fn test_sub_range() {
        let buffer = [0b0001_1000u8];
        let bits = collect(read_bits(&buffer, 8, 3, 5, BitStreamConfig::default()).unwrap())
            .unwrap();
        assert_eq!(bits, vec![true, true]);
    }

    #[test]
    fn test_buffer_underrun() {
        // Odd-length buffer: logical byte 0 maps to physical byte 1
        let config = BitStreamConfig::new(BitOrder::MsbFirst, BytePairing::SwapPairs);
        let buffer = [0xAAu8];
        let mut reader = read_bits(&buffer, 8, 0, 8, config).unwrap();
        match reader.next() {
            Some(Err(HuffError::BufferUnderrun { bit, byte, len })) => {
                assert_eq!((bit, byte, len), (0, 1, 1));
            }
            other => panic!("expected underrun, got {:?}", other),
        }
        assert!(reader.next().is_none());

        let mut reader = read_bits(&buffer, 16, 8, 9, BitStreamConfig::default()).unwrap();
        assert!(matches!(reader.next(), Some(Err(HuffError::BufferUnderrun { .. }))));
    }

    #[test]
    fn test_invalid_ranges() {
        let buffer = [0u8; 2];
        assert!(matches!(
            read_bits(&buffer, 16, 5, 4, BitStreamConfig::default()),
            Err(HuffError::InvalidInput { .. })
        ));
        assert!(matches!(
            read_bits(&buffer, 10, 0, 11, BitStreamConfig::default()),
            Err(HuffError::InvalidInput { .. })
        ));
        let reader = read_bits(&buffer, 10, 4, 4, BitStreamConfig::default()).unwrap();
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn test_writer_matches_reader_for_every_config() {
        let pattern: Vec<bool> = (0..27).map(|i| i % 3 == 0 || i % 7 == 1).collect();
        for config in BitStreamConfig::all() {
            let mut writer = BitWriter::new(config);
            for &bit in &pattern {
                writer.push_bit(bit);
            }
            let buffer = writer.finish();
            assert_eq!(buffer.bit_len(), 27);
            let read: Vec<bool> = buffer.reader(config).collect::<Result<_>>().unwrap();
            assert_eq!(read, pattern, "config {:?}", config);
        }
    }

    #[test]
    fn test_writer_swap_pairs_layout() {
        let config = BitStreamConfig::new(BitOrder::MsbFirst, BytePairing::SwapPairs);
        let mut writer = BitWriter::new(config);
        for _ in 0..8 {
            writer.push_bit(true);
        }
        let buffer = writer.finish();
        assert_eq!(buffer.as_bytes(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_push_code_is_msb_first() {
        let mut writer = BitWriter::new(BitStreamConfig::default());
        writer.push_code(Code::new(0b110, 3).unwrap());
        writer.push_code(Code::new(0b1, 1).unwrap());
        let buffer = writer.finish();
        assert_eq!(buffer.as_bytes(), &[0b1101_0000]);
        assert_eq!(buffer.bit_len(), 4);
    }

    #[test]
    fn test_bit_buffer_validation() {
        assert!(BitBuffer::new(vec![0; 2], 16).is_ok());
        assert!(BitBuffer::new(vec![0; 2], 17).is_err());
        assert!(BitBuffer::default().is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("MSB".parse::<BitOrder>().unwrap(), BitOrder::MsbFirst);
        assert_eq!("lsb_first".parse::<BitOrder>().unwrap(), BitOrder::LsbFirst);
        assert_eq!("swap".parse::<BytePairing>().unwrap(), BytePairing::SwapPairs);
        assert_eq!(" identity ".parse::<BytePairing>().unwrap(), BytePairing::Identity);
        assert!("middle".parse::<BitOrder>().is_err());
        assert!("rotate".parse::<BytePairing>().is_err());

        for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
            assert_eq!(order.to_string().parse::<BitOrder>().unwrap(), order);
        }
        for pairing in [BytePairing::Identity, BytePairing::SwapPairs] {
            assert_eq!(pairing.to_string().parse::<BytePairing>().unwrap(), pairing);
        }
    }
}

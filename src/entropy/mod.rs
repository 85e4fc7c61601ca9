//! Entropy coding: Huffman code trees, their builders and bit-level decoding
//!
//! Two ways to obtain a [`CodeTree`]:
//!
//! - [`FrequencyTreeBuilder`] for generic round-trip compression of arbitrary bytes
//! - [`CanonicalCodeBuilder`] to rebuild, bit-exactly, the code an external
//!   encoder used, from its per-symbol code lengths
//!
//! [`SegmentedDecoder`] then walks a tree over many records of one shared
//! buffer, reading bits through a [`BitReader`] configured for the source's
//! bit order and byte pairing.

pub mod bit_ops;
pub mod canonical;
pub mod code_tree;
pub mod huffman;
pub mod segmented;

// Re-export main types
pub use bit_ops::{read_bits, BitBuffer, BitOrder, BitReader, BitWriter, BytePairing};
pub use canonical::{unpack_nibbles, CanonicalCodeBuilder, LengthTable, MAX_CODE_LENGTH};
pub use code_tree::{Code, CodeTable, CodeTree, Leaves, Node, NONE};
pub use huffman::{
    decode, encode, encode_with_config, Encoded, FrequencyTreeBuilder, HuffmanDecoder,
    HuffmanEncoder,
};
pub use segmented::{record_spans, split_null_terminated, SegmentedDecoder};

/// Statistics for entropy coding operations
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyStats {
    /// Original size in bytes
    pub input_size: usize,
    /// Encoded size in bits
    pub encoded_bits: usize,
    /// Compression ratio (encoded bytes / input bytes)
    pub compression_ratio: f64,
    /// Bits per symbol achieved
    pub bits_per_symbol: f64,
}

impl EntropyStats {
    /// Create new entropy statistics
    pub fn new(input_size: usize, encoded_bits: usize) -> Self {
        let (compression_ratio, bits_per_symbol) = if input_size > 0 {
            (
                ((encoded_bits + 7) / 8) as f64 / input_size as f64,
                encoded_bits as f64 / input_size as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            input_size,
            encoded_bits,
            compression_ratio,
            bits_per_symbol,
        }
    }

    /// Calculate space savings as a percentage
    pub fn space_savings(&self) -> f64 {
        (1.0 - self.compression_ratio) * 100.0
    }

    /// Encoding efficiency: theoretical entropy over achieved bits per symbol
    pub fn efficiency(&self, entropy: f64) -> f64 {
        if self.bits_per_symbol > 0.0 {
            entropy / self.bits_per_symbol
        } else {
            0.0
        }
    }

    /// Calculate theoretical entropy from byte frequencies
    pub fn calculate_entropy(data: &[u8]) -> f64 {
        if data.is_empty() {
            return 0.0;
        }

        let frequencies = FrequencyTreeBuilder::count_bytes(data);
        let total = data.len() as f64;
        let mut entropy = 0.0;

        for &freq in &frequencies {
            if freq > 0 {
                let p = freq as f64 / total;
                entropy -= p * p.log2();
            }
        }

        entropy
    }
}

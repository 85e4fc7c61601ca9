//! Frequency-based Huffman coding
//!
//! [`FrequencyTreeBuilder`] builds a code tree greedily from byte counts.
//! [`HuffmanEncoder`] and [`HuffmanDecoder`] use such a tree for generic
//! round-trip compression, and [`encode`] / [`decode`] wrap the pair into a
//! single call. The codes are not canonical: encoder and decoder always share
//! the tree itself, never a length table.

use crate::config::BitStreamConfig;
use crate::entropy::bit_ops::{BitBuffer, BitWriter};
use crate::entropy::code_tree::{CodeTable, CodeTree, Node, NONE};
use crate::entropy::EntropyStats;
use crate::error::{HuffError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Builds a [`CodeTree`] from observed byte frequencies
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyTreeBuilder;

impl FrequencyTreeBuilder {
    /// Count occurrences of each byte value
    pub fn count_bytes(data: &[u8]) -> [u64; 256] {
        let mut frequencies = [0u64; 256];
        for &byte in data {
            frequencies[byte as usize] += 1;
        }
        frequencies
    }

    /// Build a tree from data
    pub fn build(data: &[u8]) -> Result<CodeTree> {
        Self::build_from_frequencies(&Self::count_bytes(data))
    }

    /// Build a tree from symbol frequencies
    ///
    /// - no symbols: the degenerate single-leaf tree;
    /// - one symbol: a leaf wrapped by one internal node, giving it the code `1`;
    /// - otherwise: repeatedly merge the two lightest nodes, the first popped
    ///   becoming the left child. Ties break on arena index.
    pub fn build_from_frequencies(frequencies: &[u64; 256]) -> Result<CodeTree> {
        frequencies
            .iter()
            .try_fold(0u64, |acc, &f| acc.checked_add(f))
            .ok_or_else(|| HuffError::invalid_input("total symbol count overflows u64"))?;

        let mut nodes: Vec<Node> = Vec::new();
        let mut weights: Vec<u64> = Vec::new();
        for (symbol, &freq) in frequencies.iter().enumerate() {
            if freq > 0 {
                nodes.push(Node::leaf(symbol as u8));
                weights.push(freq);
            }
        }

        match nodes.len() {
            0 => {
                log::debug!("frequency tree: empty input, degenerate tree");
                return Ok(CodeTree::empty());
            }
            1 => {
                nodes.push(Node::internal(NONE, 0));
                log::debug!("frequency tree: single symbol {:#04x}", nodes[0].symbol);
                return Ok(CodeTree::from_arena(nodes, 1));
            }
            _ => {}
        }

        let mut heap: BinaryHeap<Reverse<(u64, u32)>> = weights
            .iter()
            .enumerate()
            .map(|(idx, &w)| Reverse((w, idx as u32)))
            .collect();

        while let (Some(Reverse((w1, left))), Some(Reverse((w2, right)))) =
            (heap.pop(), heap.pop())
        {
            let idx = nodes.len() as u32;
            nodes.push(Node::internal(left, right));
            // Bounded by the checked total above
            heap.push(Reverse((w1 + w2, idx)));
            if heap.len() == 1 {
                break;
            }
        }

        let root = (nodes.len() - 1) as u32;
        let tree = CodeTree::from_arena(nodes, root);
        log::debug!(
            "frequency tree: {} symbols, {} nodes, max depth {}",
            tree.symbol_count(),
            tree.len(),
            tree.max_depth()
        );
        Ok(tree)
    }
}

/// Huffman encoder
#[derive(Debug, Clone)]
pub struct HuffmanEncoder {
    tree: CodeTree,
    table: CodeTable,
    config: BitStreamConfig,
}

impl HuffmanEncoder {
    /// Create encoder from training data
    pub fn new(data: &[u8]) -> Result<Self> {
        Self::from_tree(FrequencyTreeBuilder::build(data)?)
    }

    /// Create encoder from frequencies
    pub fn from_frequencies(frequencies: &[u64; 256]) -> Result<Self> {
        Self::from_tree(FrequencyTreeBuilder::build_from_frequencies(frequencies)?)
    }

    /// Create encoder around an existing tree
    pub fn from_tree(tree: CodeTree) -> Result<Self> {
        let table = tree.code_table()?;
        Ok(Self {
            tree,
            table,
            config: BitStreamConfig::default(),
        })
    }

    /// Use a non-default bit layout for the output
    pub fn with_config(mut self, config: BitStreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Encode data using the tree's codes
    pub fn encode(&self, data: &[u8]) -> Result<BitBuffer> {
        let total_bits = data.iter().try_fold(0usize, |acc, &symbol| {
            self.table
                .get(symbol)
                .map(|code| acc + code.len() as usize)
                .ok_or_else(|| {
                    HuffError::invalid_input(format!("Symbol {} not in Huffman tree", symbol))
                })
        })?;

        let mut writer = BitWriter::with_capacity(total_bits, self.config);
        for &symbol in data {
            if let Some(code) = self.table.get(symbol) {
                writer.push_code(code);
            }
        }
        Ok(writer.finish())
    }

    /// Get the Huffman tree
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    /// Bit layout used for the output
    pub fn config(&self) -> BitStreamConfig {
        self.config
    }

    /// Consume the encoder, keeping its tree
    pub fn into_tree(self) -> CodeTree {
        self.tree
    }
}

/// Huffman decoder
#[derive(Debug, Clone)]
pub struct HuffmanDecoder {
    tree: CodeTree,
    config: BitStreamConfig,
}

impl HuffmanDecoder {
    /// Create decoder from tree
    pub fn new(tree: CodeTree) -> Self {
        Self {
            tree,
            config: BitStreamConfig::default(),
        }
    }

    /// Read input with a non-default bit layout
    pub fn with_config(mut self, config: BitStreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Decode every bit of `encoded`
    pub fn decode(&self, encoded: &BitBuffer) -> Result<Vec<u8>> {
        decode_bits(&self.tree, encoded, self.config)
    }

    /// Get the Huffman tree
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }
}

/// Result of [`encode`]: the tree together with the bits it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoded {
    tree: CodeTree,
    bits: BitBuffer,
    config: BitStreamConfig,
    input_len: usize,
}

impl Encoded {
    /// Code tree shared by encoder and decoder
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    /// Encoded bits
    pub fn bits(&self) -> &BitBuffer {
        &self.bits
    }

    /// Bit layout the bits were written with
    pub fn config(&self) -> BitStreamConfig {
        self.config
    }

    /// Number of input bytes
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    /// Decode back to the original bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_bits(&self.tree, &self.bits, self.config)
    }

    /// Decode back to a UTF-8 string
    pub fn decode_utf8(&self) -> Result<String> {
        String::from_utf8(self.decode()?)
            .map_err(|e| HuffError::invalid_input(format!("decoded bytes are not UTF-8: {}", e)))
    }

    /// Size statistics for this encode result
    pub fn stats(&self) -> EntropyStats {
        EntropyStats::new(self.input_len, self.bits.bit_len())
    }
}

fn decode_bits(tree: &CodeTree, encoded: &BitBuffer, config: BitStreamConfig) -> Result<Vec<u8>> {
    let mut reader = encoded.reader(config);
    let mut result = Vec::new();
    while reader.remaining() > 0 {
        let (symbol, _) = tree.decode_one(&mut reader)?;
        result.push(symbol);
    }
    Ok(result)
}

/// Encode bytes with a tree built from their own frequencies
pub fn encode(data: &[u8]) -> Result<Encoded> {
    encode_with_config(data, BitStreamConfig::default())
}

/// Encode bytes, writing the bits under `config`
pub fn encode_with_config(data: &[u8], config: BitStreamConfig) -> Result<Encoded> {
    let encoder = HuffmanEncoder::new(data)?.with_config(config);
    let bits = encoder.encode(data)?;
    Ok(Encoded {
        tree: encoder.into_tree(),
        bits,
        config,
        input_len: data.len(),
    })
}

/// Decode an [`Encoded`] value
pub fn decode(encoded: &Encoded) -> Result<Vec<u8>> {
    encoded.decode()
}

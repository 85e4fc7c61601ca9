//! Canonical Huffman reconstruction from code lengths
//!
//! An external encoder ships only one code length per symbol. The codewords
//! follow from the lengths alone: sort the used symbols by `(length, symbol)`,
//! then hand out consecutive code values, shifting left whenever the length
//! grows. Any other ordering yields a different, incompatible code.
//!
//! Length tables arrive either as 256 bytes or nibble-packed into 128 bytes
//! (low nibble = even symbol, high nibble = odd symbol).

use crate::entropy::code_tree::{Code, CodeTree, Node, NONE};
use crate::error::{HuffError, Result};

/// Longest code length accepted in a length table
pub const MAX_CODE_LENGTH: u8 = 32;

/// Size of a nibble-packed length table in bytes
pub const PACKED_TABLE_LEN: usize = 128;

/// Number of symbols covered by a length table
pub const SYMBOL_COUNT: usize = 256;

/// A per-symbol code length table in either wire layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthTable {
    /// One length per byte
    Unpacked([u8; SYMBOL_COUNT]),
    /// Two 4-bit lengths per byte
    Packed([u8; PACKED_TABLE_LEN]),
}

impl LengthTable {
    /// Wrap a 256-entry table
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        let table: [u8; SYMBOL_COUNT] = lengths.try_into().map_err(|_| {
            HuffError::invalid_input(format!(
                "length table has {} entries, expected {}",
                lengths.len(),
                SYMBOL_COUNT
            ))
        })?;
        Ok(Self::Unpacked(table))
    }

    /// Wrap a 128-byte nibble-packed table
    pub fn from_packed(packed: &[u8]) -> Result<Self> {
        let table: [u8; PACKED_TABLE_LEN] = packed.try_into().map_err(|_| {
            HuffError::invalid_input(format!(
                "packed length table has {} bytes, expected {}",
                packed.len(),
                PACKED_TABLE_LEN
            ))
        })?;
        Ok(Self::Packed(table))
    }

    /// The full 256-entry table
    pub fn lengths(&self) -> [u8; SYMBOL_COUNT] {
        match self {
            Self::Unpacked(lengths) => *lengths,
            Self::Packed(packed) => unpack_table(packed),
        }
    }
}

/// Expand a nibble-packed table to one length per symbol
pub fn unpack_nibbles(packed: &[u8]) -> Result<[u8; SYMBOL_COUNT]> {
    let packed: &[u8; PACKED_TABLE_LEN] = packed.try_into().map_err(|_| {
        HuffError::invalid_input(format!(
            "packed length table has {} bytes, expected {}",
            packed.len(),
            PACKED_TABLE_LEN
        ))
    })?;
    Ok(unpack_table(packed))
}

fn unpack_table(packed: &[u8; PACKED_TABLE_LEN]) -> [u8; SYMBOL_COUNT] {
    let mut lengths = [0u8; SYMBOL_COUNT];
    for (i, &byte) in packed.iter().enumerate() {
        lengths[2 * i] = byte & 0x0F;
        lengths[2 * i + 1] = byte >> 4;
    }
    lengths
}

/// Builds the code tree an external canonical encoder used
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalCodeBuilder;

impl CanonicalCodeBuilder {
    /// Canonical `(symbol, code)` assignment in `(length, symbol)` order
    ///
    /// Fails with [`HuffError::InvalidInput`] on a length above
    /// [`MAX_CODE_LENGTH`] or on an over-subscribed table, where a code would
    /// no longer fit in its length.
    pub fn code_table(lengths: &[u8; SYMBOL_COUNT]) -> Result<Vec<(u8, Code)>> {
        let mut entries: Vec<(u8, u8)> = Vec::new();
        for (symbol, &length) in lengths.iter().enumerate() {
            if length > MAX_CODE_LENGTH {
                return Err(HuffError::invalid_input(format!(
                    "symbol {} has code length {}, maximum is {}",
                    symbol, length, MAX_CODE_LENGTH
                )));
            }
            if length > 0 {
                entries.push((length, symbol as u8));
            }
        }
        entries.sort_unstable();

        let mut codes = Vec::with_capacity(entries.len());
        let mut code: u64 = 0;
        let mut last_length: u8 = 0;
        for (length, symbol) in entries {
            if length > last_length {
                code <<= length - last_length;
                last_length = length;
            }
            if code >> length != 0 {
                return Err(HuffError::invalid_input(format!(
                    "length table is over-subscribed at symbol {} (length {})",
                    symbol, length
                )));
            }
            codes.push((symbol, Code::new(code, length)?));
            code += 1;
        }
        Ok(codes)
    }

    /// Build the decoding tree for a 256-entry length table
    pub fn build(lengths: &[u8; SYMBOL_COUNT]) -> Result<CodeTree> {
        let codes = Self::code_table(lengths)?;
        let tree = tree_from_codes(&codes)?;
        log::debug!(
            "canonical tree: {} symbols, {} nodes, max length {}",
            codes.len(),
            tree.len(),
            codes.last().map_or(0, |(_, code)| code.len())
        );
        Ok(tree)
    }

    /// Build the decoding tree for a table in either layout
    pub fn build_table(table: &LengthTable) -> Result<CodeTree> {
        Self::build(&table.lengths())
    }

    /// Build the decoding tree for a nibble-packed table
    pub fn build_packed(packed: &[u8]) -> Result<CodeTree> {
        Self::build(&unpack_nibbles(packed)?)
    }
}

/// Insert codes into a fresh tree, creating internal nodes lazily per bit
///
/// A code that runs through an existing leaf, or ends on a node that is
/// already a leaf or already has children, is a collision.
pub(crate) fn tree_from_codes(codes: &[(u8, Code)]) -> Result<CodeTree> {
    if codes.is_empty() {
        return Ok(CodeTree::empty());
    }

    // Fresh nodes and leaves look alike until a symbol is assigned
    let mut nodes = vec![Node::internal(NONE, NONE)];
    let mut assigned = vec![false];

    for &(symbol, code) in codes {
        if code.is_empty() {
            return Err(HuffError::invalid_input(format!(
                "symbol {} has an empty code",
                symbol
            )));
        }
        let mut current = 0usize;
        for bit in code.iter() {
            if assigned[current] {
                return Err(collision(symbol, code));
            }
            current = match nodes[current].child(bit) {
                Some(next) => next,
                None => {
                    let next = nodes.len();
                    nodes.push(Node::internal(NONE, NONE));
                    assigned.push(false);
                    if bit {
                        nodes[current].right = next as u32;
                    } else {
                        nodes[current].left = next as u32;
                    }
                    next
                }
            };
        }
        if assigned[current] || !nodes[current].is_leaf() {
            return Err(collision(symbol, code));
        }
        nodes[current].symbol = symbol;
        assigned[current] = true;
    }

    Ok(CodeTree::from_arena(nodes, 0))
}

fn collision(symbol: u8, code: Code) -> HuffError {
    HuffError::invalid_input(format!(
        "code {} for symbol {} collides with another code",
        code, symbol
    ))
}

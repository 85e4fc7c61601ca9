//! Index-based binary code tree shared by both tree builders
//!
//! Nodes live in an append-only arena and refer to their children by index,
//! with [`NONE`] marking a missing child. A node is a leaf exactly when it has
//! no children. Trees loaded through serde are re-validated by
//! [`CodeTree::from_parts`], so every `CodeTree` value is acyclic.

use crate::error::{HuffError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a missing child
pub const NONE: u32 = u32::MAX;

/// Longest codeword representable by [`Code`]
pub const MAX_CODE_BITS: u8 = 64;

/// One arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Child taken on a 0 bit
    pub left: u32,
    /// Child taken on a 1 bit
    pub right: u32,
    /// Symbol carried by a leaf; meaningless for internal nodes
    pub symbol: u8,
}

impl Node {
    /// A leaf carrying `symbol`
    pub const fn leaf(symbol: u8) -> Self {
        Self {
            left: NONE,
            right: NONE,
            symbol,
        }
    }

    /// An internal node
    pub const fn internal(left: u32, right: u32) -> Self {
        Self {
            left,
            right,
            symbol: 0,
        }
    }

    /// True when the node has no children
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.left == NONE && self.right == NONE
    }

    /// Child index selected by `bit`, if present
    #[inline]
    pub fn child(&self, bit: bool) -> Option<usize> {
        let idx = if bit { self.right } else { self.left };
        (idx != NONE).then_some(idx as usize)
    }
}

/// A codeword, stored right-aligned and read most significant bit first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Code {
    bits: u64,
    len: u8,
}

impl Code {
    /// Create a code from the low `len` bits of `bits`
    pub fn new(bits: u64, len: u8) -> Result<Self> {
        if len > MAX_CODE_BITS {
            return Err(HuffError::invalid_input(format!(
                "code length {} exceeds {} bits",
                len, MAX_CODE_BITS
            )));
        }
        if len < 64 && bits >> len != 0 {
            return Err(HuffError::invalid_input(format!(
                "code value {:#x} does not fit in {} bits",
                bits, len
            )));
        }
        Ok(Self { bits, len })
    }

    /// Right-aligned code value
    #[inline]
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Number of bits in the code
    #[inline]
    pub fn len(&self) -> u8 {
        self.len
    }

    /// True for the zero-length code
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bit `i`, counting from the first (most significant) bit
    #[inline]
    pub fn bit(&self, i: u8) -> bool {
        debug_assert!(i < self.len);
        (self.bits >> (self.len - 1 - i)) & 1 == 1
    }

    /// Iterate the bits in stream order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    /// True when `self` is a prefix of `other` (every code is a prefix of itself)
    pub fn is_prefix_of(&self, other: &Code) -> bool {
        if self.len > other.len {
            return false;
        }
        let shifted = other
            .bits
            .checked_shr(u32::from(other.len - self.len))
            .unwrap_or(0);
        shifted == self.bits
    }

    /// The code extended by one bit, or `None` past [`MAX_CODE_BITS`]
    fn push(self, bit: bool) -> Option<Self> {
        (self.len < MAX_CODE_BITS).then(|| Self {
            bits: (self.bits << 1) | u64::from(bit),
            len: self.len + 1,
        })
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Symbol to codeword lookup used by encoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; 256],
}

impl CodeTable {
    /// Code assigned to `symbol`, if it occurs in the tree
    #[inline]
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// Number of symbols with a code
    pub fn len(&self) -> usize {
        self.codes.iter().filter(|c| c.is_some()).count()
    }

    /// True when no symbol has a code
    pub fn is_empty(&self) -> bool {
        self.codes.iter().all(Option::is_none)
    }

    /// `(symbol, code)` pairs in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }
}

/// Binary code tree stored as an index arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCodeTree")]
pub struct CodeTree {
    nodes: Vec<Node>,
    root: u32,
}

#[derive(Deserialize)]
struct RawCodeTree {
    nodes: Vec<Node>,
    root: u32,
}

impl TryFrom<RawCodeTree> for CodeTree {
    type Error = HuffError;

    fn try_from(raw: RawCodeTree) -> Result<Self> {
        CodeTree::from_parts(raw.nodes, raw.root)
    }
}

impl CodeTree {
    /// Degenerate tree for an empty alphabet: a single leaf, no codes
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::leaf(0)],
            root: 0,
        }
    }

    /// Build a tree from an arena, checking that it really is a tree
    ///
    /// Every child index reachable from `root` must be in range and no node
    /// may be reached twice, which rules out both shared subtrees and cycles.
    pub fn from_parts(nodes: Vec<Node>, root: u32) -> Result<Self> {
        let size = nodes.len();
        if root as usize >= size {
            return Err(HuffError::invalid_input(format!(
                "root index {} outside arena of {} nodes",
                root, size
            )));
        }

        let mut seen = vec![false; size];
        let mut stack = vec![root as usize];
        while let Some(idx) = stack.pop() {
            if seen[idx] {
                return Err(HuffError::invalid_input(format!(
                    "node {} is reachable twice",
                    idx
                )));
            }
            seen[idx] = true;
            for child in [nodes[idx].left, nodes[idx].right] {
                if child == NONE {
                    continue;
                }
                if child as usize >= size {
                    return Err(HuffError::invalid_input(format!(
                        "node {} has child {} outside arena of {} nodes",
                        idx, child, size
                    )));
                }
                stack.push(child as usize);
            }
        }

        Ok(Self { nodes, root })
    }

    /// Wrap an arena produced by one of the builders
    pub(crate) fn from_arena(nodes: Vec<Node>, root: u32) -> Self {
        debug_assert!((root as usize) < nodes.len());
        Self { nodes, root }
    }

    /// Arena slots in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Index of the root node
    pub fn root(&self) -> usize {
        self.root as usize
    }

    /// Number of arena slots
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when the root is itself a leaf, i.e. the tree assigns no codes
    pub fn is_degenerate(&self) -> bool {
        self.nodes[self.root()].is_leaf()
    }

    /// Decode one symbol by walking from the root
    ///
    /// Returns the symbol and the number of bits consumed. A missing child,
    /// a degenerate tree or a source that ends mid-code is a
    /// [`HuffError::MalformedStream`]; read errors from the source pass through.
    pub fn decode_one<I>(&self, bits: &mut I) -> Result<(u8, usize)>
    where
        I: Iterator<Item = Result<bool>>,
    {
        let mut node = &self.nodes[self.root()];
        if node.is_leaf() {
            return Err(HuffError::malformed_stream(
                "code tree has no codes to decode",
            ));
        }

        let mut consumed = 0;
        while !node.is_leaf() {
            let bit = match bits.next() {
                Some(bit) => bit?,
                None => {
                    return Err(HuffError::malformed_stream(format!(
                        "bit source ended after {} bits inside a code",
                        consumed
                    )))
                }
            };
            consumed += 1;
            let idx = node.child(bit).ok_or_else(|| {
                HuffError::malformed_stream(format!(
                    "no {} branch after {} bits",
                    if bit { "1" } else { "0" },
                    consumed
                ))
            })?;
            node = &self.nodes[idx];
        }
        Ok((node.symbol, consumed))
    }

    /// Lazy `(symbol, depth)` walk over the leaves, left branch first
    pub fn leaves(&self) -> Leaves<'_> {
        let stack = if self.is_degenerate() {
            Vec::new()
        } else {
            vec![(self.root, 0)]
        };
        Leaves { tree: self, stack }
    }

    /// `(symbol, code)` for every leaf, left branch first
    pub fn codes(&self) -> Result<Vec<(u8, Code)>> {
        let mut out = Vec::new();
        if self.is_degenerate() {
            return Ok(out);
        }

        let mut stack = vec![(self.root, Code::default())];
        while let Some((idx, code)) = stack.pop() {
            let node = &self.nodes[idx as usize];
            if node.is_leaf() {
                out.push((node.symbol, code));
                continue;
            }
            for (child, bit) in [(node.right, true), (node.left, false)] {
                if child == NONE {
                    continue;
                }
                let next = code.push(bit).ok_or_else(|| {
                    HuffError::invalid_input(format!(
                        "tree is deeper than {} bits",
                        MAX_CODE_BITS
                    ))
                })?;
                stack.push((child, next));
            }
        }
        Ok(out)
    }

    /// Encoder lookup table
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut codes = [None; 256];
        for (symbol, code) in self.codes()? {
            codes[symbol as usize] = Some(code);
        }
        Ok(CodeTable { codes })
    }

    /// Number of leaves carrying a code
    pub fn symbol_count(&self) -> usize {
        self.leaves().count()
    }

    /// Depth of the deepest leaf
    pub fn max_depth(&self) -> usize {
        self.leaves().map(|(_, depth)| depth).max().unwrap_or(0)
    }
}

/// Iterator returned by [`CodeTree::leaves`]
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    tree: &'a CodeTree,
    stack: Vec<(u32, usize)>,
}

impl Iterator for Leaves<'_> {
    type Item = (u8, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, depth)) = self.stack.pop() {
            let node = &self.tree.nodes[idx as usize];
            if node.is_leaf() {
                return Some((node.symbol, depth));
            }
            if node.right != NONE {
                self.stack.push((node.right, depth + 1));
            }
            if node.left != NONE {
                self.stack.push((node.left, depth + 1));
            }
        }
        None
    }
}

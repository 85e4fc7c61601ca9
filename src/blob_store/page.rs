//! Page decoding
//!
//! A page is the unit the surrounding container compresses independently.
//! Its store type decides the codec: Huffman pages carry a length table, a
//! shared bit buffer and per-record start offsets, while uncompressed pages
//! hold null-terminated records verbatim. Pages share nothing, so a batch can
//! be decoded in parallel.

use crate::config::BitStreamConfig;
use crate::entropy::canonical::{CanonicalCodeBuilder, LengthTable};
use crate::entropy::segmented::{split_null_terminated, SegmentedDecoder};
use crate::error::{HuffError, Result};
use crate::RecordId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Codec selected by the container's store-type flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreType {
    /// Canonical Huffman over a shared bit buffer
    Huffman,
    /// Raw null-terminated records
    Uncompressed,
}

/// One page of string records, as handed over by the container reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// Huffman-compressed records
    Huffman {
        /// Per-symbol code lengths
        lengths: LengthTable,
        /// Compressed bits
        buffer: Vec<u8>,
        /// Number of meaningful bits in `buffer`
        total_bits: usize,
        /// Start bit of every record
        record_offsets: Vec<usize>,
    },
    /// Null-terminated records stored as-is
    Uncompressed {
        /// Raw page bytes
        buffer: Vec<u8>,
    },
}

impl Page {
    /// Create a Huffman page
    pub fn huffman(
        lengths: LengthTable,
        buffer: Vec<u8>,
        total_bits: usize,
        record_offsets: Vec<usize>,
    ) -> Self {
        Self::Huffman {
            lengths,
            buffer,
            total_bits,
            record_offsets,
        }
    }

    /// Create an uncompressed page
    pub fn uncompressed(buffer: Vec<u8>) -> Self {
        Self::Uncompressed { buffer }
    }

    /// Store type of this page
    pub fn store_type(&self) -> StoreType {
        match self {
            Self::Huffman { .. } => StoreType::Huffman,
            Self::Uncompressed { .. } => StoreType::Uncompressed,
        }
    }
}

/// Records decoded from one page, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPage {
    records: Vec<Vec<u8>>,
}

impl DecodedPage {
    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the page holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by position within the page
    pub fn get(&self, id: RecordId) -> Result<&[u8]> {
        self.records
            .get(id as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| HuffError::out_of_bounds(id as usize, self.records.len()))
    }

    /// Iterate over the records
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.records.iter().map(Vec::as_slice)
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<Vec<u8>> {
        self.records
    }
}

/// Decodes pages of either store type
#[derive(Debug, Clone, Copy, Default)]
pub struct PageDecoder {
    decoder: SegmentedDecoder,
}

impl PageDecoder {
    /// Create a page decoder reading Huffman bits under `config`
    pub fn new(config: BitStreamConfig) -> Self {
        Self {
            decoder: SegmentedDecoder::new(config),
        }
    }

    /// Bit addressing in use
    pub fn config(&self) -> BitStreamConfig {
        self.decoder.config()
    }

    /// Decode every record of one page
    ///
    /// The canonical tree is built once and shared by all records of the page.
    pub fn decode_page(&self, page: &Page) -> Result<DecodedPage> {
        let records = match page {
            Page::Huffman {
                lengths,
                buffer,
                total_bits,
                record_offsets,
            } => {
                let tree = CanonicalCodeBuilder::build_table(lengths)?;
                self.decoder
                    .decode_all(&tree, buffer, record_offsets, *total_bits)?
            }
            Page::Uncompressed { buffer } => split_null_terminated(buffer),
        };
        log::debug!(
            "decoded {:?} page: {} records",
            page.store_type(),
            records.len()
        );
        Ok(DecodedPage { records })
    }

    /// Decode pages one after another
    pub fn decode_pages(&self, pages: &[Page]) -> Result<Vec<DecodedPage>> {
        pages.iter().map(|page| self.decode_page(page)).collect()
    }

    /// Decode pages on the rayon thread pool, keeping page order
    pub fn decode_pages_parallel(&self, pages: &[Page]) -> Result<Vec<DecodedPage>> {
        pages.par_iter().map(|page| self.decode_page(page)).collect()
    }
}

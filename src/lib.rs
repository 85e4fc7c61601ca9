//! # Pagehuff: Huffman Coding for Paged String Columns
//!
//! This crate decodes string records that an external columnar container
//! stores Huffman-compressed, page by page, and provides a matching
//! general-purpose Huffman codec.
//!
//! ## Key Features
//!
//! - **Frequency Trees**: Build an optimal prefix code from byte counts and round-trip data
//! - **Canonical Reconstruction**: Rebuild the exact code tree from a 256-entry (or nibble-packed) length table
//! - **Configurable Bit Addressing**: MSB- or LSB-first bits, optional 2-byte pair swapping
//! - **Segmented Decoding**: Many records per shared buffer, each decoded from its own start offset
//! - **Page Decoding**: Huffman and uncompressed pages, sequentially or in parallel
//!
//! ## Quick Start
//!
//! ```rust
//! use pagehuff::{encode, CanonicalCodeBuilder, SegmentedDecoder};
//!
//! // Round-trip arbitrary bytes
//! let encoded = encode(b"hello world").unwrap();
//! assert_eq!(encoded.decode().unwrap(), b"hello world");
//!
//! // Rebuild a code from lengths and decode two records sharing one buffer
//! let mut lengths = [0u8; 256];
//! lengths[b'A' as usize] = 2;
//! lengths[b'B' as usize] = 1;
//! lengths[b'C' as usize] = 3;
//! lengths[b'D' as usize] = 3;
//! let tree = CanonicalCodeBuilder::build(&lengths).unwrap();
//!
//! // "ABCD" = 10 0 110 111, then "B" = 0
//! let buffer = [0b1001_1011, 0b1000_0000];
//! let records = SegmentedDecoder::default()
//!     .decode_all(&tree, &buffer, &[0, 9], 10)
//!     .unwrap();
//! assert_eq!(records, vec![b"ABCD".to_vec(), b"B".to_vec()]);
//! ```

#![warn(missing_docs)]

pub mod blob_store;
pub mod config;
pub mod entropy;
pub mod error;

// Re-export core types
pub use error::{HuffError, Result};

pub use config::{BitStreamConfig, Config};

pub use entropy::{
    decode, encode, encode_with_config, BitBuffer, BitOrder, BitReader, BitWriter, BytePairing,
    CanonicalCodeBuilder, Code, CodeTable, CodeTree, Encoded, EntropyStats, FrequencyTreeBuilder,
    HuffmanDecoder, HuffmanEncoder, LengthTable, SegmentedDecoder,
};

pub use blob_store::{DecodedPage, Page, PageDecoder, StoreType};

/// Record identifier type for page lookups
pub type RecordId = u32;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently no-op, for future use)
pub fn init() {
    log::debug!("Initializing pagehuff v{}", VERSION);
}

//! Multi-record decoding over one shared compressed buffer
//!
//! A page stores many string records back to back in a single bit buffer and
//! lists where each record starts. Record `i` spans
//! `[offsets[i], offsets[i + 1])`, the last one ending at the page's total
//! bit count. Every record is decoded from the tree root independently.

use crate::config::BitStreamConfig;
use crate::entropy::bit_ops::BitReader;
use crate::entropy::code_tree::CodeTree;
use crate::error::{HuffError, Result};
use std::ops::Range;

/// Validate a record offset table and turn it into bit spans
///
/// Offsets must be non-decreasing and no larger than `total_bits`; anything
/// else is rejected with [`HuffError::InvalidInput`] rather than clamped.
pub fn record_spans(offsets: &[usize], total_bits: usize) -> Result<Vec<Range<usize>>> {
    let mut spans = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(total_bits);
        if start > total_bits {
            return Err(HuffError::invalid_input(format!(
                "record {} starts at bit {}, past total bit count {}",
                i, start, total_bits
            )));
        }
        if end < start {
            return Err(HuffError::invalid_input(format!(
                "record offsets decrease at record {}: {} then {}",
                i, start, end
            )));
        }
        spans.push(start..end);
    }
    Ok(spans)
}

/// Split an uncompressed page into null-terminated records
///
/// Consecutive terminators produce empty records; trailing bytes without a
/// terminator form a final record.
pub fn split_null_terminated(buffer: &[u8]) -> Vec<Vec<u8>> {
    let mut records: Vec<Vec<u8>> = buffer.split(|&b| b == 0).map(<[u8]>::to_vec).collect();
    // `split` yields one empty piece after a trailing terminator (or for empty input)
    if buffer.last().map_or(true, |&b| b == 0) {
        records.pop();
    }
    records
}

/// Decodes every record of a page against one shared tree
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentedDecoder {
    config: BitStreamConfig,
}

impl SegmentedDecoder {
    /// Create a decoder reading bits under `config`
    pub fn new(config: BitStreamConfig) -> Self {
        Self { config }
    }

    /// Bit addressing in use
    pub fn config(&self) -> BitStreamConfig {
        self.config
    }

    /// Decode one record spanning exactly `span`
    ///
    /// Decoding stops when the bits consumed equal the span length. A code
    /// that would cross the end of the span is a [`HuffError::MalformedStream`].
    pub fn decode_record(
        &self,
        tree: &CodeTree,
        buffer: &[u8],
        total_bits: usize,
        span: Range<usize>,
    ) -> Result<Vec<u8>> {
        let mut reader = BitReader::new(buffer, total_bits, span.start, span.end, self.config)?;
        let mut record = Vec::new();
        while reader.remaining() > 0 {
            let (symbol, _) = tree.decode_one(&mut reader)?;
            record.push(symbol);
        }
        log::trace!(
            "decoded record bits {}..{} into {} bytes",
            span.start,
            span.end,
            record.len()
        );
        Ok(record)
    }

    /// Decode every record, failing on the first bad one
    pub fn decode_all(
        &self,
        tree: &CodeTree,
        buffer: &[u8],
        offsets: &[usize],
        total_bits: usize,
    ) -> Result<Vec<Vec<u8>>> {
        record_spans(offsets, total_bits)?
            .into_iter()
            .map(|span| self.decode_record(tree, buffer, total_bits, span))
            .collect()
    }

    /// Decode every record, reporting failures per record
    ///
    /// An invalid offset table still fails the whole call; a record that
    /// fails to decode yields its own `Err` without affecting the others.
    pub fn decode_each(
        &self,
        tree: &CodeTree,
        buffer: &[u8],
        offsets: &[usize],
        total_bits: usize,
    ) -> Result<Vec<Result<Vec<u8>>>> {
        let spans = record_spans(offsets, total_bits)?;
        Ok(spans
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                self.decode_record(tree, buffer, total_bits, span)
                    .map_err(|e| {
                        log::warn!("record {} failed to decode: {}", i, e);
                        e
                    })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::canonical::CanonicalCodeBuilder;

    // B = 0, A = 10, C = 110, D = 111
    fn tree() -> CodeTree {
        let mut lengths = [0u8; 256];
        lengths[b'A' as usize] = 2;
        lengths[b'B' as usize] = 1;
        lengths[b'C' as usize] = 3;
        lengths[b'D' as usize] = 3;
        CanonicalCodeBuilder::build(&lengths).unwrap()
    }

    #[test]
    fn test_record_spans() {
        let spans = record_spans(&[0, 9, 20], 27).unwrap();
        assert_eq!(spans, vec![0..9, 9..20, 20..27]);
        assert!(record_spans(&[], 27).unwrap().is_empty());
        assert_eq!(record_spans(&[4, 4], 4).unwrap(), vec![4..4, 4..4]);
    }

    #[test]
    fn test_record_spans_rejects_bad_offsets() {
        assert!(matches!(
            record_spans(&[0, 10, 5], 27),
            Err(HuffError::InvalidInput { .. })
        ));
        assert!(matches!(
            record_spans(&[0, 30], 27),
            Err(HuffError::InvalidInput { .. })
        ));
        assert!(record_spans(&[28], 27).is_err());
    }

    #[test]
    fn test_split_null_terminated() {
        assert_eq!(
            split_null_terminated(b"ab\0\0cd\0ef"),
            vec![b"ab".to_vec(), vec![], b"cd".to_vec(), b"ef".to_vec()]
        );
        assert_eq!(split_null_terminated(b"ab\0"), vec![b"ab".to_vec()]);
        assert_eq!(split_null_terminated(b"\0"), vec![Vec::<u8>::new()]);
        assert!(split_null_terminated(b"").is_empty());
        assert_eq!(split_null_terminated(b"plain"), vec![b"plain".to_vec()]);
    }

    #[test]
    fn test_decode_record() {
        // 10 0 110 111 -> "ABCD", padded with ones
        let buffer = [0b1001_1011, 0b1111_1111];
        let decoder = SegmentedDecoder::default();
        let record = decoder.decode_record(&tree(), &buffer, 16, 0..9).unwrap();
        assert_eq!(record, b"ABCD".to_vec());
    }

    #[test]
    fn test_code_crossing_span_end_is_malformed() {
        let buffer = [0b1001_1011, 0b1111_1111];
        let decoder = SegmentedDecoder::default();
        assert!(matches!(
            decoder.decode_record(&tree(), &buffer, 16, 0..8),
            Err(HuffError::MalformedStream { .. })
        ));
    }

    #[test]
    fn test_decode_each_isolates_failures() {
        // Record 0 "ABCD" (0..9), record 1 "1" alone cannot finish a code (9..10),
        // record 2 "B" (10..11)
        let buffer = [0b1001_1011, 0b1100_0000];
        let decoder = SegmentedDecoder::default();
        let results = decoder.decode_each(&tree(), &buffer, &[0, 9, 10], 11).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), &b"ABCD".to_vec());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), &b"B".to_vec());

        assert!(decoder.decode_all(&tree(), &buffer, &[0, 9, 10], 11).is_err());
    }
}

//! Integration tests for decoding records out of shared page buffers
//!
//! Uses the four-symbol code B = 0, A = 10, C = 110, D = 111 throughout.

use pagehuff::entropy::{BitOrder, BitWriter, BytePairing, CodeTable, LengthTable};
use pagehuff::{
    BitStreamConfig, CanonicalCodeBuilder, CodeTree, HuffError, Page, PageDecoder,
    SegmentedDecoder,
};

fn lengths() -> [u8; 256] {
    let mut lengths = [0u8; 256];
    lengths[b'A' as usize] = 2;
    lengths[b'B' as usize] = 1;
    lengths[b'C' as usize] = 3;
    lengths[b'D' as usize] = 3;
    lengths
}

fn tree() -> CodeTree {
    CanonicalCodeBuilder::build(&lengths()).unwrap()
}

fn table() -> CodeTable {
    tree().code_table().unwrap()
}

/// Write records back to back, returning buffer, bit length and offsets
fn write_records(records: &[&[u8]], config: BitStreamConfig) -> (Vec<u8>, usize, Vec<usize>) {
    let table = table();
    let mut writer = BitWriter::new(config);
    let mut offsets = Vec::new();
    for record in records {
        offsets.push(writer.bit_len());
        for &symbol in *record {
            writer.push_code(table.get(symbol).unwrap());
        }
    }
    let buffer = writer.finish();
    let total_bits = buffer.bit_len();
    (buffer.into_bytes(), total_bits, offsets)
}

#[test]
fn test_worked_example_tree_shape() {
    let tree = tree();
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.symbol_count(), 4);
    assert_eq!(tree.max_depth(), 3);

    let mut codes: Vec<(u8, String)> = tree
        .codes()
        .unwrap()
        .into_iter()
        .map(|(symbol, code)| (symbol, code.to_string()))
        .collect();
    codes.sort();
    assert_eq!(
        codes,
        vec![
            (b'A', "10".to_string()),
            (b'B', "0".to_string()),
            (b'C', "110".to_string()),
            (b'D', "111".to_string()),
        ]
    );
}

#[test]
fn test_three_records_share_one_buffer() {
    let (buffer, total_bits, offsets) =
        write_records(&[b"ABCD", b"DDAAB", b"CABB"], BitStreamConfig::default());
    assert_eq!(offsets, vec![0, 9, 20]);
    assert_eq!(total_bits, 27);

    let records = SegmentedDecoder::default()
        .decode_all(&tree(), &buffer, &offsets, total_bits)
        .unwrap();
    assert_eq!(
        records,
        vec![b"ABCD".to_vec(), b"DDAAB".to_vec(), b"CABB".to_vec()]
    );
}

#[test]
fn test_every_layout_decodes_its_own_writing() {
    for config in BitStreamConfig::all() {
        let (buffer, total_bits, offsets) =
            write_records(&[b"DCBA", b"", b"BBBBBBBBBBBBBBBBB", b"ACDC"], config);
        let records = SegmentedDecoder::new(config)
            .decode_all(&tree(), &buffer, &offsets, total_bits)
            .unwrap();
        assert_eq!(records[0], b"DCBA".to_vec(), "{:?}", config);
        assert!(records[1].is_empty());
        assert_eq!(records[2], vec![b'B'; 17]);
        assert_eq!(records[3], b"ACDC".to_vec());
    }
}

#[test]
fn test_byte_pairing_changes_result() {
    let buffer = [0xC0, 0x80];

    let identity = SegmentedDecoder::default()
        .decode_record(&tree(), &buffer, 16, 0..16)
        .unwrap();
    assert_eq!(identity, b"CBBBBBABBBBBB".to_vec());

    let swapped = SegmentedDecoder::new(
        BitStreamConfig::default().with_byte_pairing(BytePairing::SwapPairs),
    )
    .decode_record(&tree(), &buffer, 16, 0..16)
    .unwrap();
    assert_eq!(swapped, b"ABBBBBBCBBBBB".to_vec());

    // LSB-first leaves a dangling 1 at the end
    let lsb = SegmentedDecoder::new(BitStreamConfig::default().with_bit_order(BitOrder::LsbFirst))
        .decode_record(&tree(), &buffer, 16, 0..16);
    assert!(matches!(lsb, Err(HuffError::MalformedStream { .. })));
}

#[test]
fn test_out_of_range_length_rejected() {
    let mut lengths = lengths();
    lengths[b'Z' as usize] = 33;
    assert!(matches!(
        CanonicalCodeBuilder::build(&lengths),
        Err(HuffError::InvalidInput { .. })
    ));
}

#[test]
fn test_bad_offsets_rejected() {
    let (buffer, total_bits, _) = write_records(&[b"ABCD", b"DDAAB"], BitStreamConfig::default());
    let decoder = SegmentedDecoder::default();

    let decreasing = decoder.decode_all(&tree(), &buffer, &[9, 0], total_bits);
    assert!(matches!(decreasing, Err(HuffError::InvalidInput { .. })));

    let past_end = decoder.decode_each(&tree(), &buffer, &[0, total_bits + 1], total_bits);
    assert!(matches!(past_end, Err(HuffError::InvalidInput { .. })));
}

#[test]
fn test_all_zero_lengths_decode_only_empty_records() {
    let tree = CanonicalCodeBuilder::build(&[0u8; 256]).unwrap();
    assert!(tree.is_degenerate());

    let decoder = SegmentedDecoder::default();
    let records = decoder.decode_all(&tree, &[], &[0, 0], 0).unwrap();
    assert_eq!(records, vec![Vec::<u8>::new(), Vec::new()]);

    assert!(matches!(
        decoder.decode_record(&tree, &[0xFF], 8, 0..8),
        Err(HuffError::MalformedStream { .. })
    ));
}

#[test]
fn test_pages_from_packed_tables() {
    let lengths = lengths();
    let mut packed = [0u8; 128];
    for (i, pair) in lengths.chunks(2).enumerate() {
        packed[i] = pair[0] | (pair[1] << 4);
    }

    let config = BitStreamConfig::all()[1];
    let (buffer, total_bits, offsets) = write_records(&[b"CAB", b"DD"], config);
    let pages = vec![
        Page::huffman(
            LengthTable::from_packed(&packed).unwrap(),
            buffer,
            total_bits,
            offsets,
        ),
        Page::uncompressed(b"raw\0text\0".to_vec()),
    ];

    let decoder = PageDecoder::new(config);
    let decoded = decoder.decode_pages_parallel(&pages).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].get(0).unwrap(), b"CAB");
    assert_eq!(decoded[0].get(1).unwrap(), b"DD");
    assert_eq!(decoded[1].get(1).unwrap(), b"text");
    assert_eq!(decoded, decoder.decode_pages(&pages).unwrap());
}

#[test]
fn test_one_bad_page_fails_the_batch() {
    let pages = vec![
        Page::uncompressed(b"ok\0".to_vec()),
        Page::huffman(LengthTable::Unpacked(lengths()), vec![0xFF], 8, vec![0]),
    ];
    let decoder = PageDecoder::default();
    assert!(decoder.decode_pages(&pages).is_err());
    assert!(decoder.decode_pages_parallel(&pages).is_err());
}

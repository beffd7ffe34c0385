use szskit_yaz0::prelude::*;

fn compress(input: &[u8]) -> Vec<u8> {
    Yaz0::compress_from(input, yaz0::CompressionAlgo::Greedy, 0)
        .expect("compression failed")
        .into_vec()
}

fn roundtrip(input: &[u8]) -> Vec<u8> {
    let compressed = compress(input);
    assert!(
        compressed.len() <= Yaz0::worst_possible_size(input.len()),
        "compressed {} bytes into {}, past the worst-case bound of {}",
        input.len(),
        compressed.len(),
        Yaz0::worst_possible_size(input.len())
    );
    let output = Yaz0::decompress_from(&compressed).expect("decompression failed");
    assert_eq!(*output, *input);
    compressed
}

/// Deterministic noise so the tests never depend on an RNG crate.
fn pseudo_random(len: usize, mut seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    for _ in 0..len {
        seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
        data.push((seed >> 24) as u8);
    }
    data
}

#[test]
fn roundtrip_sixteen_ascii_bytes() {
    let compressed = roundtrip(b"ABCDEFGHIJKLMNOP");
    assert_eq!(
        compressed[..16],
        [0x59, 0x61, 0x7A, 0x30, 0x00, 0x00, 0x00, 0x10, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn roundtrip_zero_page() {
    let compressed = roundtrip(&[0u8; 4096]);
    assert!(compressed.len() < 128, "4 KiB of zeroes took {} bytes", compressed.len());
}

#[test]
fn roundtrip_repeated_pattern() {
    let input: Vec<u8> = b"ABCDEFGH".repeat(128);
    assert_eq!(input.len(), 1024);

    let compressed = roundtrip(&input);
    assert!(compressed.len() < 64, "repeating pattern took {} bytes", compressed.len());

    //The first group is eight literals for the unseen pattern, then the lookbacks start
    assert_eq!(compressed[0x10], 0xFF);
    assert_eq!(compressed[0x19] & 0x80, 0);
}

#[test]
fn roundtrip_double_run() {
    //One long run followed by an identical run compresses down to a handful of codes
    let input = vec![0x5Au8; 2048];
    let compressed = roundtrip(&input);
    assert!(compressed.len() < 64, "double run took {} bytes", compressed.len());
}

#[test]
fn roundtrip_structured_text() {
    let mut input = Vec::new();
    let noise = pseudo_random(64, 0xBEEF);
    for chunk in 0..64 {
        input.extend_from_slice(b"path/to/some/archive/file_");
        input.push(noise[chunk]);
        input.extend_from_slice(b".szs\n");
    }

    let compressed = roundtrip(&input);
    assert!(compressed.len() < input.len());
}

#[test]
fn roundtrip_every_small_size() {
    for len in [1usize, 2, 3, 7, 8, 12, 13, 14, 15, 16, 17, 31, 32, 100] {
        roundtrip(&pseudo_random(len, len as u32));
    }
}

#[test]
fn roundtrip_larger_buffers() {
    for (len, seed) in [(1000usize, 1u32), (4096, 2), (10000, 3), (65536, 4)] {
        roundtrip(&pseudo_random(len, seed));
    }
}

#[test]
fn compression_is_deterministic() {
    let input = pseudo_random(5000, 42);
    assert_eq!(compress(&input), compress(&input));
}

#[test]
fn header_is_well_formed() {
    let compressed = compress(&pseudo_random(1000, 7));
    assert_eq!(&compressed[0..4], b"Yaz0");
    assert_eq!(u32::from_be_bytes([compressed[4], compressed[5], compressed[6], compressed[7]]), 1000);
    assert_eq!(compressed[8..16], [0u8; 8]);

    let header = Yaz0::read_header(&compressed).unwrap();
    assert_eq!(header.decompressed_size, 1000);
    assert_eq!(header.alignment, 0);
}

#[test]
fn peek_and_magic_checks() {
    let compressed = compress(&pseudo_random(300, 9));
    assert!(Yaz0::is_yaz0(&compressed));
    assert_eq!(Yaz0::peek_decompressed_size(&compressed), 300);

    assert!(!Yaz0::is_yaz0(b"Yay0\x00\x00\x01\x00"));
    assert_eq!(Yaz0::peek_decompressed_size(b"Yay0\x00\x00\x01\x00"), 0);
    assert_eq!(Yaz0::peek_decompressed_size(b"Yaz0\x00\x00\x00"), 0);
}

#[test]
fn decode_handcrafted_literal_groups() {
    let mut stream = Vec::new();
    stream.extend_from_slice(b"Yaz0");
    stream.extend_from_slice(&16u32.to_be_bytes());
    stream.extend_from_slice(&[0u8; 8]);
    stream.push(0xFF);
    stream.extend_from_slice(b"ABCDEFGH");
    stream.push(0xFF);
    stream.extend_from_slice(b"IJKLMNOP");

    let output = Yaz0::decompress_from(&stream).unwrap();
    assert_eq!(*output, *b"ABCDEFGHIJKLMNOP");
}

#[test]
fn decode_overlapping_run() {
    //One literal, then a lookback of distance 1 that replicates it 255 times
    let mut stream = Vec::new();
    stream.extend_from_slice(b"Yaz0");
    stream.extend_from_slice(&256u32.to_be_bytes());
    stream.extend_from_slice(&[0u8; 8]);
    stream.push(0x80);
    stream.push(0xAA);
    stream.extend_from_slice(&[0x00, 0x00, 255 - 18]);

    let output = Yaz0::decompress_from(&stream).unwrap();
    assert_eq!(output.len(), 256);
    assert!(output.iter().all(|&byte| byte == 0xAA));
}

#[test]
fn decode_rejects_bad_magic() {
    let error = Yaz0::decompress_from(b"Yay0\x00\x00\x00\x10\x00\x00\x00\x00\x00\x00\x00\x00")
        .unwrap_err();
    assert!(matches!(error, yaz0::Error::InvalidMagic));
}

#[test]
fn decode_rejects_short_input() {
    let error = Yaz0::decompress_from(b"Yaz0\x00\x00\x00\x10").unwrap_err();
    assert!(matches!(error, yaz0::Error::EndOfFile));
}

#[test]
fn decode_rejects_every_truncation() {
    //Strictly increasing bytes cannot contain a match, so every byte of the stream is
    //meaningful and chopping anywhere must fail
    let input: Vec<u8> = (0u8..20).collect();
    let compressed = compress(&input);
    assert_eq!(compressed.len(), 16 + 20 + 3);

    for length in 0..compressed.len() {
        assert!(
            Yaz0::decompress_from(&compressed[..length]).is_err(),
            "decoding a {length}-byte prefix should have failed"
        );
    }
}

#[test]
fn decode_rejects_forward_lookback() {
    //First token is a lookback with distance 4096 into an empty output buffer
    let mut stream = Vec::new();
    stream.extend_from_slice(b"Yaz0");
    stream.extend_from_slice(&16u32.to_be_bytes());
    stream.extend_from_slice(&[0u8; 8]);
    stream.push(0x00);
    stream.extend_from_slice(&[0x1F, 0xFF]);

    let error = Yaz0::decompress_from(&stream).unwrap_err();
    assert!(matches!(error, yaz0::Error::InvalidLookback));
}

#[test]
fn decode_rejects_copy_past_declared_size() {
    //A literal, then an 18-byte copy into a stream that only declares 4 bytes
    let mut stream = Vec::new();
    stream.extend_from_slice(b"Yaz0");
    stream.extend_from_slice(&4u32.to_be_bytes());
    stream.extend_from_slice(&[0u8; 8]);
    stream.push(0x80);
    stream.push(0x41);
    stream.extend_from_slice(&[0x00, 0x00, 0x00]);

    let error = Yaz0::decompress_from(&stream).unwrap_err();
    assert!(matches!(error, yaz0::Error::InvalidSize));
}

#[test]
fn decode_rejects_zero_declared_size() {
    //The encoder happily wraps an empty input, but such a stream never decodes
    let compressed = compress(&[]);
    assert_eq!(compressed.len(), 17);

    let error = Yaz0::decompress_from(&compressed).unwrap_err();
    assert!(matches!(error, yaz0::Error::InvalidSize));
}

#[test]
fn decode_rejects_undersized_output_buffer() {
    let compressed = compress(&pseudo_random(100, 11));
    let mut output = [0u8; 10];
    let error = Yaz0::decompress(&compressed, &mut output).unwrap_err();
    assert!(matches!(error, yaz0::Error::InvalidSize));
}

#[test]
fn decode_fills_exactly_the_declared_size() {
    let input = pseudo_random(100, 13);
    let compressed = compress(&input);

    //A roomier buffer still only receives the declared byte count
    let mut output = vec![0u8; 140];
    let written = Yaz0::decompress(&compressed, &mut output).unwrap();
    assert_eq!(written, 100);
    assert_eq!(output[..100], *input);
}

#[test]
fn compress_rejects_undersized_output_buffer() {
    let input = pseudo_random(100, 17);
    let mut output = vec![0u8; Yaz0::worst_possible_size(input.len()) - 1];
    assert_eq!(Yaz0::compress(&input, &mut output), 0);
}

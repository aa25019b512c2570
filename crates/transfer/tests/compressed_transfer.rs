//! Integration tests for compressed payloads written through a pipeline.

use checksums::Md5;
use compress::GzipError;
use compress::gzip::{CompressionLevel, compress_to_vec};
use proptest::prelude::*;
use transfer::{CodecOptions, ErrorKind, TransferError, WriteSpec, open_write_pipeline};

fn spec() -> WriteSpec {
    WriteSpec::from_wire(Some("ubinary"), None).with_digest(true)
}

fn write_chunks(chunks: &[&[u8]]) -> Result<(Vec<u8>, transfer::TransferSummary), TransferError> {
    let mut pipeline = open_write_pipeline(Vec::new(), &spec(), &CodecOptions::default())?;
    for chunk in chunks {
        pipeline.write_converted(chunk)?;
    }
    pipeline.finish()
}

fn stored_member(payload: &[u8]) -> (Vec<u8>, usize) {
    let member = compress_to_vec(payload, CompressionLevel::None).unwrap();
    let start = member
        .windows(payload.len())
        .position(|window| window == payload)
        .unwrap();
    (member, start)
}

#[test]
fn hello_world_split_inside_deflate_stream() {
    let member = compress_to_vec(b"hello world", CompressionLevel::Default).unwrap();
    let (first, second) = member.split_at(12);
    let (out, summary) = write_chunks(&[first, second]).unwrap();
    assert_eq!(out, b"hello world");
    assert_eq!(summary.digest, Some(Md5::digest(b"hello world")));
}

#[test]
fn trailer_straddling_every_split() {
    let payload = b"the quick brown fox jumps over the lazy dog\n".repeat(8);
    let member = compress_to_vec(&payload, CompressionLevel::Best).unwrap();
    for tail in 1..=8 {
        let (head, rest) = member.split_at(member.len() - tail);
        let mut chunks: Vec<&[u8]> = vec![head];
        chunks.extend(rest.chunks(1));
        let (out, summary) = write_chunks(&chunks).unwrap();
        assert_eq!(out, payload, "tail {tail}");
        assert_eq!(summary.bytes_in, member.len() as u64);
    }
}

#[test]
fn corrupted_payload_fails_crc_at_close() {
    let (mut member, start) = stored_member(b"hello world");
    member[start + 7] ^= 0x20;
    let err = write_chunks(&[&member]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert!(matches!(
        err,
        TransferError::Integrity(GzipError::CrcMismatch { .. })
    ));
}

#[test]
fn corrupted_length_fails_length_check() {
    let (mut member, _) = stored_member(b"hello world");
    let last = member.len() - 1;
    member[last] ^= 0x01;
    let err = write_chunks(&[&member]).unwrap_err();
    assert!(matches!(
        err,
        TransferError::Integrity(GzipError::LengthMismatch { expected, actual: 11 })
            if expected != 11
    ));
}

#[test]
fn unsupported_method_aborts_immediately() {
    let mut member = compress_to_vec(b"x", CompressionLevel::Fast).unwrap();
    member[2] = 9;
    let err = write_chunks(&[&member]).unwrap_err();
    assert!(matches!(
        err,
        TransferError::Format(GzipError::UnsupportedMethod(9))
    ));
    assert!(err.is_fatal());
}

#[test]
fn line_endings_do_not_touch_compressed_content() {
    let payload = b"a\nb\r\n";
    let member = compress_to_vec(payload, CompressionLevel::Default).unwrap();
    let spec = WriteSpec::from_wire(Some("xubinary"), Some("mac"));
    let options = CodecOptions::default().with_write_bom(true);
    let mut pipeline = open_write_pipeline(Vec::new(), &spec, &options).unwrap();
    pipeline.write_converted(&member).unwrap();
    let (out, summary) = pipeline.finish().unwrap();
    assert_eq!(out, payload);
    assert_eq!(summary.digest, None);
}

proptest! {
    #[test]
    fn any_chunking_inflates_identically(
        payload in prop::collection::vec(any::<u8>(), 0..2048),
        sizes in prop::collection::vec(1usize..64, 1..16),
    ) {
        let member = compress_to_vec(&payload, CompressionLevel::Default).unwrap();
        let mut chunks = Vec::new();
        let mut rest = member.as_slice();
        for size in sizes.iter().cycle() {
            if rest.is_empty() {
                break;
            }
            let (chunk, tail) = rest.split_at((*size).min(rest.len()));
            chunks.push(chunk);
            rest = tail;
        }
        let (out, summary) = write_chunks(&chunks).unwrap();
        prop_assert_eq!(&out, &payload);
        prop_assert_eq!(summary.digest, Some(Md5::digest(&payload)));
    }
}

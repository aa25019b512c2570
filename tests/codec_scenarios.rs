//! End-to-end scenarios through the public facade.
//!
//! Each test plays one side of a transfer: content the server delivers is
//! written into a temporary working copy, and working-copy content is read
//! back into the form the server expects.

use std::io::Read;

use filecodec::gzip::{CompressionLevel, compress_named_to_vec};
use filecodec::{
    CodecOptions, ErrorKind, FileTypeTag, LineEndingPolicy, LocalFile, LogConfig, Md5,
    TransferError, digest_from_hex, to_hex,
};

fn options() -> CodecOptions {
    CodecOptions::default().with_write_bom(false)
}

#[test]
fn sync_then_submit_windows_text() {
    filecodec::init_tracing(&LogConfig::from_verbose_level(3));
    let dir = tempfile::tempdir().unwrap();
    let file = LocalFile::from_wire(dir.path().join("readme.txt"), Some("text"), Some("win"))
        .with_digest(true);

    let delivered = b"line one\nline two\n";
    let mut writer = file.create_write(&options()).unwrap();
    for chunk in delivered.chunks(3) {
        writer.write_converted(chunk).unwrap();
    }
    let summary = file.finish_write(writer).unwrap();
    assert_eq!(summary.digest_hex(), Some(to_hex(&Md5::digest(delivered))));
    assert_eq!(
        std::fs::read(file.path()).unwrap(),
        b"line one\r\nline two\r\n"
    );

    let mut reader = file.open_read(&options()).unwrap();
    let mut canonical = Vec::new();
    reader.read_to_end(&mut canonical).unwrap();
    assert_eq!(canonical, delivered);
    assert_eq!(reader.digest(), Some(Md5::digest(delivered)));
}

#[test]
fn compressed_binary_lands_decompressed() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    let member = compress_named_to_vec(&payload, "blob.bin", CompressionLevel::Default).unwrap();
    let file = LocalFile::from_wire(dir.path().join("blob.bin"), Some("ubinary"), None)
        .with_digest(true);

    let mut writer = file.create_write(&options()).unwrap();
    for chunk in member.chunks(4096) {
        writer.write_converted(chunk).unwrap();
    }
    let summary = file.finish_write(writer).unwrap();
    assert_eq!(std::fs::read(file.path()).unwrap(), payload);
    assert_eq!(summary.digest, Some(Md5::digest(&payload)));
    let inflate = summary.inflate.unwrap();
    assert_eq!(inflate.header.file_name.as_deref(), Some(&b"blob.bin"[..]));
    assert_eq!(inflate.decompressed_len, payload.len() as u64);
}

#[test]
fn utf16_working_copy_with_bom() {
    let dir = tempfile::tempdir().unwrap();
    let file = LocalFile::new(
        dir.path().join("wide.txt"),
        FileTypeTag::Utf16,
        LineEndingPolicy::Windows,
    );
    let options = CodecOptions::default().with_write_bom(true);

    let mut writer = file.create_write(&options).unwrap();
    writer.write_converted("日本語\n".as_bytes()).unwrap();
    file.finish_write(writer).unwrap();

    let stored = std::fs::read(file.path()).unwrap();
    assert_eq!(&stored[..3], b"\xEF\xBB\xBF");
    assert_eq!(stored.len(), 3 + 5 * 2);

    let mut reader = file.open_read(&options).unwrap();
    let mut canonical = String::new();
    reader.read_to_string(&mut canonical).unwrap();
    assert_eq!(canonical, "日本語\n");
    assert_eq!(reader.charset(), Some(filecodec::Charset::utf16_native()));
}

#[test]
fn legacy_charset_from_session() {
    let dir = tempfile::tempdir().unwrap();
    let file = LocalFile::from_wire(dir.path().join("jp.txt"), Some("unicode"), Some("unix"));
    let options = options().with_session_charset("shiftjis");

    let mut writer = file.create_write(&options).unwrap();
    writer.write_converted("こんにちは\n".as_bytes()).unwrap();
    file.finish_write(writer).unwrap();
    let stored = std::fs::read(file.path()).unwrap();
    assert_eq!(stored.len(), 5 * 2 + 1);

    let mut reader = file.open_read(&options).unwrap();
    let mut canonical = String::new();
    reader.read_to_string(&mut canonical).unwrap();
    assert_eq!(canonical, "こんにちは\n");
}

#[test]
fn corrupt_download_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut member =
        compress_named_to_vec(b"payload", "p", CompressionLevel::None).unwrap();
    let crc_offset = member.len() - 8;
    member[crc_offset] ^= 0xFF;
    let file = LocalFile::from_wire(dir.path().join("p"), Some("gunzip"), None);

    let mut writer = file.create_write(&options()).unwrap();
    writer.write_converted(&member).unwrap();
    let err = file.finish_write(writer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert!(matches!(err, TransferError::Integrity(_)));
}

#[test]
fn sync_checks_server_digest() {
    let dir = tempfile::tempdir().unwrap();
    let reported = digest_from_hex("5EB63BBBE01EEED093CB22BB8F5ACDC3").unwrap();

    let file = LocalFile::from_wire(dir.path().join("ok.txt"), Some("0"), Some("unix"))
        .with_server_digest(reported);
    let mut writer = file.create_write(&options()).unwrap();
    writer.write_converted(b"hello world").unwrap();
    assert!(file.finish_write(writer).is_ok());

    let file = LocalFile::from_wire(dir.path().join("bad.txt"), Some("0"), Some("unix"))
        .with_server_digest(reported);
    let mut writer = file.create_write(&options()).unwrap();
    writer.write_converted(b"hello there").unwrap();
    let err = file.finish_write(writer).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn server_type_code_selects_gzip_payload() {
    let dir = tempfile::tempdir().unwrap();
    let member = compress_named_to_vec(b"raw bytes", "raw", CompressionLevel::Default).unwrap();
    let file = LocalFile::from_wire(dir.path().join("raw"), Some("101"), None);
    assert_eq!(file.file_type(), FileTypeTag::CompressedBinary);

    let mut writer = file.create_write(&options()).unwrap();
    writer.write_converted(&member).unwrap();
    file.finish_write(writer).unwrap();
    assert_eq!(std::fs::read(file.path()).unwrap(), b"raw bytes");
}

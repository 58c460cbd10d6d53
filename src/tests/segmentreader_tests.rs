// src/tests/segmentreader_tests.rs

//! tests for `segmentreader.rs`

#![allow(non_snake_case)]

use crate::common::{file_id_from_metadata, Bytes, FPath};
use crate::debug::helpers::{
    create_file_in_tmpdir,
    create_gz_file_in_tmpdir,
    create_temp_dir,
    gzip_bytes,
    tmpdir_fpath,
};
use crate::readers::helpers::path_to_fpath;
use crate::readers::segmentreader::{decode_line, Decompressor, GzDecompressor, SegmentReader};

use std::io::ErrorKind;

use ::encoding_rs::{Encoding, UTF_16LE, UTF_8, WINDOWS_1252};
use ::test_case::test_case;

fn gz() -> Option<Box<dyn Decompressor>> {
    Some(Box::new(GzDecompressor::new()))
}

/// Read until end of file, return all decoded bytes.
fn read_all(reader: &mut SegmentReader) -> Bytes {
    let mut out = Bytes::new();
    loop {
        let mut chunk = Bytes::new();
        let count = reader.read_chunk(&mut chunk).unwrap();
        out.extend_from_slice(&chunk);
        if count == 0 {
            return out;
        }
    }
}

#[test]
fn test_SegmentReader_read_chunks_from_offset() {
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, "plain.log", b"abcdef");
    let mut reader = SegmentReader::open(&path, 3, None, 2, 3).unwrap();
    assert_eq!(reader.handle_id(), 3);
    assert!(!reader.is_compressed());

    let mut chunk = Bytes::new();
    assert_eq!(reader.read_chunk(&mut chunk).unwrap(), 3);
    assert_eq!(chunk, b"cde");
    chunk.clear();
    assert_eq!(reader.read_chunk(&mut chunk).unwrap(), 1);
    assert_eq!(chunk, b"f");
    chunk.clear();
    assert_eq!(reader.read_chunk(&mut chunk).unwrap(), 0);
    assert!(chunk.is_empty());
    assert_eq!(reader.count_bytes, 4);
}

#[test]
fn test_SegmentReader_reads_appended() {
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, "grow.log", b"a\n");
    let mut reader = SegmentReader::open(&path, 1, None, 0, 64).unwrap();
    assert_eq!(read_all(&mut reader), b"a\n");
    crate::debug::helpers::append_file(&path, b"b\n");
    assert_eq!(read_all(&mut reader), b"b\n");
}

#[test]
fn test_SegmentReader_gz() {
    let data: &[u8] = b"hello\nworld\n";
    let tmpdir = create_temp_dir();
    let path = create_gz_file_in_tmpdir(&tmpdir, "app.log.2.gz", data);
    let mut reader = SegmentReader::open(&path, 1, gz(), 0, 5).unwrap();
    assert!(reader.is_compressed());
    assert_eq!(read_all(&mut reader), data);
    // finished; later reads are at end of file
    let mut chunk = Bytes::new();
    assert_eq!(reader.read_chunk(&mut chunk).unwrap(), 0);
    assert!(chunk.is_empty());
}

#[test]
fn test_SegmentReader_gz_multiple_members() {
    let mut raw: Bytes = gzip_bytes(b"one\n");
    raw.extend_from_slice(&gzip_bytes(b"two\n"));
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, "multi.gz", &raw);
    let mut reader = SegmentReader::open(&path, 1, gz(), 0, 16).unwrap();
    assert_eq!(read_all(&mut reader), b"one\ntwo\n");
}

#[test]
fn test_SegmentReader_gz_at_offset_is_finished() {
    let tmpdir = create_temp_dir();
    let path = create_gz_file_in_tmpdir(&tmpdir, "old.gz", b"x\n");
    let mut reader = SegmentReader::open(&path, 1, gz(), 5, 16).unwrap();
    let mut chunk = Bytes::new();
    assert_eq!(reader.read_chunk(&mut chunk).unwrap(), 0);
    assert!(chunk.is_empty());
}

#[test]
fn test_SegmentReader_gz_corrupt() {
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, "bad.gz", b"this is not gzip data");
    let mut reader = SegmentReader::open(&path, 1, gz(), 0, 4).unwrap();
    let mut saw_error = false;
    for _ in 0..32 {
        let mut chunk = Bytes::new();
        match reader.read_chunk(&mut chunk) {
            Ok(0) => break,
            Ok(_) => continue,
            Err(_) => {
                saw_error = true;
                break;
            }
        }
    }
    assert!(saw_error, "expected a decompression error");
}

#[test]
fn test_SegmentReader_open_directory() {
    let tmpdir = create_temp_dir();
    let path: FPath = path_to_fpath(tmpdir.path());
    let err = SegmentReader::open(&path, 1, None, 0, 16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn test_SegmentReader_open_missing() {
    let tmpdir = create_temp_dir();
    let path = tmpdir_fpath(&tmpdir, "missing.log");
    let err = SegmentReader::open(&path, 1, None, 0, 16).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("missing.log"));
}

#[test]
fn test_SegmentReader_metadata_file_id() {
    let tmpdir = create_temp_dir();
    let path = create_file_in_tmpdir(&tmpdir, "id.log", b"12345");
    let reader = SegmentReader::open(&path, 1, None, 0, 16).unwrap();
    let metadata = reader.metadata().unwrap();
    assert_eq!(metadata.len(), 5);
    assert_eq!(reader.file_id(), file_id_from_metadata(&std::fs::metadata(&path).unwrap()));
    assert_eq!(reader.path(), &path);
}

#[test_case(UTF_8, b"\xEF\xBB\xBFabc", true, "abc"; "utf8 bom removed")]
#[test_case(UTF_8, b"\xEF\xBB\xBFabc", false, "\u{FEFF}abc"; "utf8 bom kept")]
#[test_case(UTF_8, b"a\xFFb", false, "a\u{FFFD}b"; "utf8 malformed")]
#[test_case(WINDOWS_1252, b"caf\xE9", false, "café"; "latin1")]
#[test_case(UTF_16LE, b"\xFF\xFEh\x00i\x00", true, "hi"; "utf16 bom removed")]
fn test_decode_line(encoding: &'static Encoding, bytes: &[u8], at_file_start: bool, expect: &str) {
    assert_eq!(decode_line(encoding, bytes, at_file_start), expect);
}

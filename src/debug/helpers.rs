// src/debug/helpers.rs

//! Miscellaneous helper functions for testing.
//!
//! Tests of rotation need files in one directory with predictable names,
//! e.g. `app.log`, `app.log.1`, `app.log.2.gz`, so these helpers work
//! within a `TempDir`.

use crate::common::FPath;
use crate::readers::helpers::path_to_fpath;

use std::fs::{File, OpenOptions};
#[allow(unused_imports)] // XXX: clippy wrongly marks this as unused
use std::io::Write;

use ::flate2::write::GzEncoder;
use ::flate2::Compression;
use ::lazy_static::lazy_static;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

#[doc(hidden)]
pub use ::tempfile::TempDir;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary file helper functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `TempDir` instances default to this name prefix, for easier cleanup of
/// directories remaining after an aborted test run.
/// See <https://github.com/Stebalien/tempfile/issues/183>.
pub const STR_TEMPDIR_PREFIX: &str = "tmp-rotail-test-";

lazy_static! {
    pub static ref STRING_TEMPDIR_PREFIX: String = String::from(STR_TEMPDIR_PREFIX);
}

/// Create a temporary directory
pub fn create_temp_dir() -> TempDir {
    let tempdir = match ::tempfile::Builder::new()
        .prefix::<str>(&STRING_TEMPDIR_PREFIX)
        .tempdir()
    {
        Ok(val) => val,
        Err(err) => panic!("tempfile::Builder::new()..tempdir() return Err {}", err),
    };
    defñ!("{:?}", tempdir.path());

    tempdir
}

/// Path of file `name` within `tempdir`. The file is not created.
pub fn tmpdir_fpath(tempdir: &TempDir, name: &str) -> FPath {
    path_to_fpath(tempdir.path().join(name).as_path())
}

/// Create (or replace) file `path` holding `data`.
pub fn write_file(path: &FPath, data: &[u8]) {
    defñ!("({:?}, {} bytes)", path, data.len());
    let mut file: File = match File::create(path) {
        Ok(val) => val,
        Err(err) => panic!("File::create({:?}) return Err {}", path, err),
    };
    if let Err(err) = file.write_all(data) {
        panic!("write_all({:?}) return Err {}", path, err);
    }
}

/// Create file `name` within `tempdir` holding `data`, return it's path.
pub fn create_file_in_tmpdir(tempdir: &TempDir, name: &str, data: &[u8]) -> FPath {
    let path: FPath = tmpdir_fpath(tempdir, name);
    write_file(&path, data);

    path
}

/// Append `data` to file `path`, creating it if needed.
pub fn append_file(path: &FPath, data: &[u8]) {
    defñ!("({:?}, {} bytes)", path, data.len());
    let mut file: File = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(val) => val,
        Err(err) => panic!("open({:?}) return Err {}", path, err),
    };
    if let Err(err) = file.write_all(data) {
        panic!("write_all({:?}) return Err {}", path, err);
    }
}

/// Truncate file `path` in place to `len` bytes; the file identity is kept.
pub fn truncate_file(path: &FPath, len: u64) {
    defñ!("({:?}, {})", path, len);
    let file: File = match OpenOptions::new().write(true).open(path) {
        Ok(val) => val,
        Err(err) => panic!("open({:?}) return Err {}", path, err),
    };
    if let Err(err) = file.set_len(len) {
        panic!("set_len({:?}, {}) return Err {}", path, len, err);
    }
}

/// Rename `from` to `to`, as log rotation does.
pub fn rename_file(from: &FPath, to: &FPath) {
    defñ!("({:?}, {:?})", from, to);
    if let Err(err) = std::fs::rename(from, to) {
        panic!("rename({:?}, {:?}) return Err {}", from, to, err);
    }
}

/// Compress `data` as one gzip member.
pub fn gzip_bytes(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if let Err(err) = encoder.write_all(data) {
        panic!("GzEncoder.write_all() return Err {}", err);
    }
    match encoder.finish() {
        Ok(val) => val,
        Err(err) => panic!("GzEncoder.finish() return Err {}", err),
    }
}

/// Create gzip file `name` within `tempdir` holding compressed `data`.
pub fn create_gz_file_in_tmpdir(tempdir: &TempDir, name: &str, data: &[u8]) -> FPath {
    create_file_in_tmpdir(tempdir, name, &gzip_bytes(data))
}

// src/readers/segmentreader.rs

//! Implements a [`SegmentReader`], reads one physical file forward from a
//! byte offset, and the [`Decompressor`] transform for compressed files.
//!
//! A `SegmentReader` knows nothing of lines. It produces chunks of
//! decoded bytes; see [`LineSplitter`].
//!
//! [`LineSplitter`]: crate::readers::linesplitter::LineSplitter

use crate::common::{
    err_from_err_path,
    file_id_from_metadata,
    Bytes,
    Count,
    FPath,
    File,
    FileId,
    FileMetadata,
    FileOffset,
    FileOpenOptions,
    HandleId,
};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn};
use crate::readers::helpers::fpath_to_path;

use std::fmt;
use std::io::{Error, ErrorKind, Read, Result, Seek, SeekFrom, Write};

use ::encoding_rs::Encoding;
use ::flate2::write::MultiGzDecoder;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Decompressor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A streaming transform from compressed bytes to decompressed bytes.
pub trait Decompressor: Send {
    /// Push `raw` compressed bytes, append all bytes decompressed so far to
    /// `out`.
    fn push(&mut self, raw: &[u8], out: &mut Bytes) -> Result<()>;

    /// The compressed stream ended. Append remaining decompressed bytes to
    /// `out`.
    fn finish(&mut self, out: &mut Bytes) -> Result<()>;
}

/// [`Decompressor`] of gzip files, including files of multiple gzip
/// members, e.g. a rotated file appended to with `gzip -c >>`.
pub struct GzDecompressor {
    decoder: MultiGzDecoder<Bytes>,
}

impl Default for GzDecompressor {
    fn default() -> Self {
        GzDecompressor::new()
    }
}

impl GzDecompressor {
    pub fn new() -> GzDecompressor {
        GzDecompressor {
            decoder: MultiGzDecoder::new(Bytes::new()),
        }
    }
}

impl Decompressor for GzDecompressor {
    fn push(&mut self, raw: &[u8], out: &mut Bytes) -> Result<()> {
        self.decoder.write_all(raw)?;
        self.decoder.flush()?;
        out.append(self.decoder.get_mut());

        Ok(())
    }

    fn finish(&mut self, out: &mut Bytes) -> Result<()> {
        self.decoder.try_finish()?;
        out.append(self.decoder.get_mut());

        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SegmentReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default read buffer size in bytes.
pub const READ_BUFSZ_DEF: usize = 4096;

/// Minimum read buffer size in bytes.
pub const READ_BUFSZ_MIN: usize = 1;

/// Reads one opened file, the "segment", forward.
///
/// Plain files are read from any byte offset. Compressed files are read from
/// offset 0 only; the decompressed stream cannot be entered in the middle.
pub struct SegmentReader {
    path: FPath,
    file: File,
    handle_id: HandleId,
    /// identity of the opened file, refreshed from the open handle
    file_id: FileId,
    decompressor: Option<Box<dyn Decompressor>>,
    /// the compressed stream was completely decompressed
    finished: bool,
    /// raw read buffer
    buffer: Bytes,
    /// `Count` of raw bytes read
    pub(crate) count_bytes: Count,
}

impl fmt::Debug for SegmentReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SegmentReader")
            .field("path", &self.path)
            .field("handle_id", &self.handle_id)
            .field("file_id", &self.file_id)
            .field("compressed", &self.is_compressed())
            .field("finished", &self.finished)
            .field("count_bytes", &self.count_bytes)
            .finish()
    }
}

impl SegmentReader {
    /// Open the file at `path` positioned at raw byte `offset`.
    ///
    /// A compressed file opened at a non-zero `offset` is positioned after
    /// it's last byte; nothing is read from it.
    pub fn open(
        path: &FPath,
        handle_id: HandleId,
        decompressor: Option<Box<dyn Decompressor>>,
        offset: FileOffset,
        read_bufsz: usize,
    ) -> Result<SegmentReader> {
        defn!("({:?}, {}, compressed {}, {}, {})", path, handle_id, decompressor.is_some(), offset, read_bufsz);
        let mut open_options = FileOpenOptions::new();
        let mut file: File = match open_options
            .read(true)
            .open(fpath_to_path(path))
        {
            Ok(val) => val,
            Err(err) => {
                defx!("open error {}", err);
                return Err(err_from_err_path(&err, path, Some("(open)")));
            }
        };
        let metadata: FileMetadata = match file.metadata() {
            Ok(val) => val,
            Err(err) => {
                defx!("metadata error {}", err);
                return Err(err_from_err_path(&err, path, Some("(metadata)")));
            }
        };
        if metadata.is_dir() {
            defx!("return Err(Unsupported)");
            return Err(Error::new(
                // XXX: `ErrorKind::IsADirectory` is unstable
                ErrorKind::Unsupported,
                format!("Path is a directory {:?}", path),
            ));
        }
        let file_id: FileId = file_id_from_metadata(&metadata);
        let mut finished: bool = false;
        if offset != 0 {
            if decompressor.is_some() {
                defo!("compressed file at offset {}, finished", offset);
                finished = true;
            } else if let Err(err) = file.seek(SeekFrom::Start(offset)) {
                defx!("seek error {}", err);
                return Err(err_from_err_path(&err, path, Some("(seek)")));
            }
        }
        defx!("file_id {}", file_id);

        Ok(SegmentReader {
            path: path.clone(),
            file,
            handle_id,
            file_id,
            decompressor,
            finished,
            buffer: vec![0; read_bufsz.max(READ_BUFSZ_MIN)],
            count_bytes: 0,
        })
    }

    /// Read at most one buffer of raw bytes from the current position,
    /// append the decoded bytes to `out`.
    ///
    /// Returns the count of raw bytes read, `0` at end of file.
    pub fn read_chunk(&mut self, out: &mut Bytes) -> Result<usize> {
        if self.finished {
            defñ!("finished");
            return Ok(0);
        }
        let count: usize = match self.file.read(&mut self.buffer) {
            Ok(val) => val,
            Err(err) if err.kind() == ErrorKind::Interrupted => {
                defñ!("Interrupted, read zero");
                return Ok(0);
            }
            Err(err) => {
                de_err!("read error {} for {:?}", err, self.path);
                return Err(err_from_err_path(&err, &self.path, Some("(read)")));
            }
        };
        self.count_bytes += count as Count;
        defñ!("read {} bytes from {:?}", count, self.path);
        let raw: &[u8] = &self.buffer[..count];
        match self.decompressor.as_mut() {
            None => out.extend_from_slice(raw),
            Some(decompressor) => {
                let result = if count == 0 {
                    self.finished = true;
                    decompressor.finish(out)
                } else {
                    decompressor.push(raw, out)
                };
                if let Err(err) = result {
                    self.finished = true;
                    return Err(err_from_err_path(&err, &self.path, Some("(decompress)")));
                }
            }
        }

        Ok(count)
    }

    /// Metadata of the open handle, not of the path. A renamed file is still
    /// the open file.
    pub fn metadata(&self) -> Result<FileMetadata> {
        match self.file.metadata() {
            Ok(val) => Ok(val),
            Err(err) => Err(err_from_err_path(&err, &self.path, Some("(fstat)"))),
        }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    pub const fn handle_id(&self) -> HandleId {
        self.handle_id
    }

    pub const fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn is_compressed(&self) -> bool {
        self.decompressor.is_some()
    }
}

/// Decode one line of `bytes` in `encoding`. A byte order mark is removed
/// from a line at the very start of a file (`at_file_start`).
///
/// Malformed sequences are replaced with U+FFFD.
pub fn decode_line(encoding: &'static Encoding, bytes: &[u8], at_file_start: bool) -> String {
    let (text, _had_errors) = if at_file_start {
        encoding.decode_with_bom_removal(bytes)
    } else {
        encoding.decode_without_bom_handling(bytes)
    };
    if _had_errors {
        de_wrn!("malformed {} sequence in line of {} bytes", encoding.name(), bytes.len());
    }

    text.into_owned()
}

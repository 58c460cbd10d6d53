// src/readers/startresolver.rs

//! Implements the search for a start position in a primary file and it's
//! chain of predecessor files, [`find_start`].
//!
//! Each line matching a `Regex` yields a token, the first capture group or
//! the whole match. A comparator reports where the searched target lies
//! relative to the token:
//!
//! * `Greater`: the target lies after this line. The line is a candidate,
//!   the scan continues.
//! * `Equal`: this line is the target.
//! * `Less`: the target lies before this line. With an earlier candidate the
//!   target falls between the two; the search resolves at this line, the
//!   first line past the target. Without a candidate the target is older
//!   than this file.
//! * `None`: the comparator could not compare; the search fails.
//!
//! Lines that do not match are passed over.
//!
//! The primary file is searched first, then the predecessor files from
//! newest to oldest. Files passed over are kept in a _backlog_; after the
//! start position the backlog files are read, oldest first, before the
//! primary file.

use crate::common::{
    Bytes,
    FPath,
    FPaths,
    FileOffset,
    HandleId,
    SearchError,
};
use crate::readers::linesplitter::{LineSeparator, LineSplitter};
use crate::readers::positiontracker::PositionTracker;
use crate::readers::secondaryfiles::{SecondaryFile, SecondaryFiles};
use crate::readers::segmentreader::{decode_line, Decompressor, GzDecompressor, SegmentReader};

use std::cmp::Ordering;
use std::fmt;
use std::io::{Error, ErrorKind, Result};

use ::encoding_rs::Encoding;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Handle id of files opened for searching; these handles are never a
/// session's current file.
pub const HANDLE_ID_SEARCH: HandleId = 0;

/// Comparator of a token to the searched target, see the module
/// documentation.
pub type StartCmp = Box<dyn Fn(&str) -> Option<Ordering> + Send>;

/// A [`StartCmp`] for integer tokens, searching for integer `target`.
///
/// A token that is not an integer cannot be compared.
pub fn integer_target(target: i64) -> StartCmp {
    Box::new(move |token: &str| token.trim().parse::<i64>().ok().map(|n| target.cmp(&n)))
}

/// How the files are read while searching.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub separator: LineSeparator,
    pub encoding: &'static Encoding,
    pub read_bufsz: usize,
}

/// Result of searching one file, [`find_start_in_file`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResultFindStartInFile {
    /// Resolved at the line beginning at this offset.
    Found(FileOffset),
    /// The target lies after every line of the file. `value` is the token of
    /// the last candidate, `line_offset_next` the end of the last complete
    /// line.
    NotFound {
        value: String,
        line_offset_next: FileOffset,
    },
    /// The target lies before every line of the file.
    TargetOlder,
}

/// The resolved start position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedStart {
    /// file to begin reading
    pub path: FPath,
    /// decoded byte offset in `path`
    pub offset: FileOffset,
    /// files to read after `path`, the last entry first
    pub backlog: Vec<SecondaryFile>,
    /// files searched, in the order searched
    pub searched: FPaths,
}

impl fmt::Display for ResolvedStart {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}@{}, backlog {}", self.path, self.offset, self.backlog.len())
    }
}

fn interrupted() -> Error {
    Error::new(ErrorKind::Interrupted, "search for start position was interrupted")
}

/// Search one file from it's start.
///
/// `interrupt` is called before every buffer read; returning `true` aborts
/// the search with `ErrorKind::Interrupted`.
pub fn find_start_in_file(
    sfile: &SecondaryFile,
    pattern: &Regex,
    cmp: &StartCmp,
    scan: &ScanOptions,
    interrupt: &mut dyn FnMut() -> bool,
) -> Result<ResultFindStartInFile> {
    defn!("({:?}, {:?})", sfile.path, pattern.as_str());
    let decompressor: Option<Box<dyn Decompressor>> = match sfile.is_compressed {
        true => Some(Box::new(GzDecompressor::new())),
        false => None,
    };
    let mut reader = SegmentReader::open(&sfile.path, HANDLE_ID_SEARCH, decompressor, 0, scan.read_bufsz)?;
    let mut splitter = LineSplitter::new(scan.separator.clone());
    let mut tracker = PositionTracker::new();
    let mut candidate: Option<String> = None;
    let mut chunk = Bytes::with_capacity(scan.read_bufsz);

    loop {
        if interrupt() {
            defx!("interrupted");
            return Err(interrupted());
        }
        chunk.clear();
        let count: usize = reader.read_chunk(&mut chunk)?;
        splitter.push(&chunk);
        let at_eof: bool = count == 0;
        while let Some(span) = splitter.next_line(at_eof) {
            let line_start: FileOffset = tracker.line_offset_next();
            tracker.advance_line(span.consumed);
            let line: String = decode_line(scan.encoding, &span.bytes, line_start == 0);
            let captures = match pattern.captures(&line) {
                Some(val) => val,
                None => continue,
            };
            let token: &str = match captures.get(1).or_else(|| captures.get(0)) {
                Some(val) => val.as_str(),
                None => continue,
            };
            match cmp(token) {
                Some(Ordering::Equal) => {
                    defx!("Equal at {}, token {:?}", line_start, token);
                    return Ok(ResultFindStartInFile::Found(line_start));
                }
                Some(Ordering::Less) => {
                    if candidate.is_some() {
                        defx!("crossed at {}, token {:?}", line_start, token);
                        return Ok(ResultFindStartInFile::Found(line_start));
                    }
                    defx!("TargetOlder at {}, token {:?}", line_start, token);
                    return Ok(ResultFindStartInFile::TargetOlder);
                }
                Some(Ordering::Greater) => {
                    defo!("candidate at {}, token {:?}", line_start, token);
                    candidate = Some(token.to_string());
                }
                None => {
                    defx!("comparator failed for token {:?}", token);
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!(
                            "start comparator returned no ordering for token {:?} of line at {} in {:?}",
                            token, line_start, sfile.path
                        ),
                    ));
                }
            }
        }
        if at_eof {
            break;
        }
    }

    match candidate {
        Some(value) => {
            defx!("NotFound, last candidate {:?}", value);
            Ok(ResultFindStartInFile::NotFound {
                value,
                line_offset_next: tracker.line_offset_next(),
            })
        }
        None => {
            defx!("TargetOlder, no candidate");
            Ok(ResultFindStartInFile::TargetOlder)
        }
    }
}

/// Search `primary` and then it's predecessor files for the start position.
///
/// With `secondary` the only predecessor file is `secondary`.
///
/// Fails with `ErrorKind::NotFound` carrying a [`SearchError`] when no file
/// holds the start position. An error of the primary file other than
/// "not found" is returned instead when the search fails.
pub fn find_start(
    primary: &FPath,
    secondary: Option<&FPath>,
    pattern: &Regex,
    cmp: &StartCmp,
    scan: &ScanOptions,
    interrupt: &mut dyn FnMut() -> bool,
) -> Result<ResolvedStart> {
    defn!("({:?}, {:?}, {:?})", primary, secondary, pattern.as_str());
    let mut backlog: Vec<SecondaryFile> = Vec::new();
    let mut searched: FPaths = FPaths::new();
    let mut primary_error: Option<Error> = None;

    let files = std::iter::once(SecondaryFile::from_path(primary.clone()))
        .chain(SecondaryFiles::new(primary, secondary));
    for (index, sfile) in files.enumerate() {
        let is_primary: bool = index == 0;
        searched.push(sfile.path.clone());
        let result = find_start_in_file(&sfile, pattern, cmp, scan, interrupt);
        defo!("{:?} {:?}", sfile.path, result);
        match result {
            Ok(ResultFindStartInFile::Found(offset)) => {
                defx!("Found {:?}@{}", sfile.path, offset);
                return Ok(ResolvedStart {
                    path: sfile.path,
                    offset,
                    backlog,
                    searched,
                });
            }
            Ok(ResultFindStartInFile::NotFound { value: _value, line_offset_next }) => {
                if let Some(newer) = backlog.pop() {
                    defx!("between {:?} and newer {:?}", sfile.path, newer.path);
                    return Ok(ResolvedStart {
                        path: newer.path,
                        offset: 0,
                        backlog,
                        searched,
                    });
                }
                // nothing newer; the target is beyond all content
                defx!("beyond {:?}@{}, last value {:?}", sfile.path, line_offset_next, _value);
                return Ok(ResolvedStart {
                    path: sfile.path,
                    offset: line_offset_next,
                    backlog,
                    searched,
                });
            }
            Ok(ResultFindStartInFile::TargetOlder) => {
                backlog.push(sfile);
            }
            Err(err) => match err.kind() {
                ErrorKind::Interrupted | ErrorKind::InvalidData => {
                    defx!("return {}", err);
                    return Err(err);
                }
                ErrorKind::NotFound => {
                    defo!("missing {:?}", sfile.path);
                }
                _ if is_primary => {
                    defo!("primary error {}", err);
                    primary_error = Some(err);
                }
                _ => {
                    defx!("secondary error {}", err);
                    return Err(primary_error.unwrap_or(err));
                }
            },
        }
    }

    if let Some(err) = primary_error {
        defx!("primary error {}", err);
        return Err(err);
    }
    let serr = SearchError {
        message: String::from("Start not found in primary or any secondary file"),
        files: searched,
    };
    defx!("{}", serr);

    Err(serr.into_error())
}

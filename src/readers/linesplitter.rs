// src/readers/linesplitter.rs

//! Implements a [`LineSplitter`], the driver of deriving lines from a
//! stream of bytes, and the [`LineSeparator`] that delimits them.
//!
//! Splitting is done on encoded bytes, before decoding to `char`s. The
//! offsets derived from a split are byte offsets into the stream.
//!
//! [`LineSplitter`]: self::LineSplitter
//! [`LineSeparator`]: self::LineSeparator

use crate::common::{Bytes, Count};
#[cfg(any(debug_assertions, test))]
use crate::debug::printers::buffer_to_String_noraw;

use std::fmt;
use std::io::{Error, ErrorKind, Result};

use ::encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use ::memchr::{memchr, memmem};
use ::more_asserts::debug_assert_le;
use ::regex::bytes::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineSeparator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default line separator.
pub const LINE_SEPARATOR_DEF: &str = "\n";

/// Delimits lines in a byte stream.
///
/// A `Literal` is a fixed sequence of bytes, the separator string encoded in
/// the file encoding. A `Pattern` is a regular expression matched against
/// the bytes; a match may have variable length, e.g. `\r?\n`.
#[derive(Clone)]
pub enum LineSeparator {
    Literal {
        bytes: Bytes,
        /// Matches must begin at a multiple of this many bytes from the line
        /// start, e.g. `2` for UTF-16.
        code_unit: usize,
    },
    Pattern(Regex),
}

impl fmt::Debug for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineSeparator::Literal { bytes, code_unit } => f
                .debug_struct("Literal")
                .field("bytes", bytes)
                .field("code_unit", code_unit)
                .finish(),
            LineSeparator::Pattern(regex) => f
                .debug_tuple("Pattern")
                .field(&regex.as_str())
                .finish(),
        }
    }
}

impl LineSeparator {
    /// Create a literal separator from `separator` encoded as `encoding`.
    pub fn literal(separator: &str, encoding: &'static Encoding) -> Result<LineSeparator> {
        defn!("({:?}, {:?})", separator, encoding.name());
        if separator.is_empty() {
            defx!("empty");
            return Err(Error::new(ErrorKind::InvalidInput, "line separator is empty"));
        }
        // `Encoding::encode` never produces UTF-16, it substitutes UTF-8
        if encoding == UTF_16LE || encoding == UTF_16BE {
            let mut bytes = Bytes::with_capacity(separator.len() * 2);
            for unit in separator.encode_utf16() {
                if encoding == UTF_16LE {
                    bytes.extend_from_slice(&unit.to_le_bytes());
                } else {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
            }
            defx!("UTF-16 {:?}", bytes);
            return Ok(LineSeparator::Literal { bytes, code_unit: 2 });
        }
        if encoding.output_encoding() != encoding {
            defx!("cannot encode to {:?}", encoding.name());
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("cannot encode line separator as {}", encoding.name()),
            ));
        }
        let (bytes, _encoding_used, had_errors) = encoding.encode(separator);
        if had_errors {
            defx!("unmappable");
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("line separator {:?} is not representable in {}", separator, encoding.name()),
            ));
        }
        let bytes: Bytes = bytes.into_owned();
        defx!("{:?}", bytes);

        Ok(LineSeparator::Literal { bytes, code_unit: 1 })
    }

    /// Create a pattern separator. Only ASCII-compatible encodings are
    /// supported; the pattern is matched against encoded bytes.
    pub fn pattern(pattern: &str, encoding: &'static Encoding) -> Result<LineSeparator> {
        defn!("({:?}, {:?})", pattern, encoding.name());
        if !encoding.is_ascii_compatible() {
            defx!("not ascii compatible");
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("pattern line separators require an ASCII-compatible encoding, not {}", encoding.name()),
            ));
        }
        let regex = match Regex::new(pattern) {
            Ok(val) => val,
            Err(err) => {
                defx!("Regex::new error {}", err);
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("bad line separator pattern {:?}: {}", pattern, err),
                ));
            }
        };
        defx!();

        Ok(LineSeparator::Pattern(regex))
    }

    /// Find the first separator in `buffer`, return it's `(start, end)`.
    ///
    /// `scanned` is a hint that `buffer[..scanned]` was searched before
    /// without success, used by `Literal`.
    ///
    /// A `Pattern` match that ends at the end of `buffer` is deferred unless
    /// `at_eof`; more data could extend the match.
    pub fn find(&self, buffer: &[u8], scanned: usize, at_eof: bool) -> Option<(usize, usize)> {
        match self {
            LineSeparator::Literal { bytes, code_unit } => {
                let sep_len: usize = bytes.len();
                let mut start: usize = scanned.saturating_sub(sep_len - 1);
                start -= start % code_unit;
                if start >= buffer.len() {
                    return None;
                }
                let haystack: &[u8] = &buffer[start..];
                if sep_len == 1 {
                    // `code_unit` is 1 for every single byte separator
                    return memchr(bytes[0], haystack).map(|at| (start + at, start + at + 1));
                }
                memmem::find_iter(haystack, bytes)
                    .map(|at| start + at)
                    .find(|at| at % code_unit == 0)
                    .map(|at| (at, at + sep_len))
            }
            LineSeparator::Pattern(regex) => {
                for match_ in regex.find_iter(buffer) {
                    if match_.start() == match_.end() {
                        continue;
                    }
                    if match_.end() == buffer.len() && !at_eof {
                        return None;
                    }
                    return Some((match_.start(), match_.end()));
                }

                None
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// split_lines
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Returned by [`split_lines`].
#[derive(Debug, Default, PartialEq)]
pub struct SplitLines<'a> {
    /// complete lines, separators removed
    pub lines: Vec<&'a [u8]>,
    /// bytes consumed by each line, including the separator
    pub consumed: Vec<usize>,
    /// trailing bytes without a separator
    pub remainder: &'a [u8],
}

/// Split `buffer` into complete lines and a remainder.
pub fn split_lines<'a>(buffer: &'a [u8], separator: &LineSeparator, at_eof: bool) -> SplitLines<'a> {
    defn!("(buffer len {}, {:?}, at_eof {})", buffer.len(), separator, at_eof);
    let mut split = SplitLines::default();
    let mut at: usize = 0;
    while let Some((beg, end)) = separator.find(&buffer[at..], 0, at_eof) {
        split.lines.push(&buffer[at..at + beg]);
        split.consumed.push(end);
        at += end;
    }
    split.remainder = &buffer[at..];
    defx!("{} lines, remainder len {}", split.lines.len(), split.remainder.len());

    split
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineSplitter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One line taken from a [`LineSplitter`].
#[derive(Debug, Eq, PartialEq)]
pub struct LineSpan {
    /// the line, separator removed
    pub bytes: Bytes,
    /// bytes consumed from the stream, line plus separator
    pub consumed: usize,
}

/// Incremental line splitting. Bytes are `push`ed in arbitrary chunks,
/// complete lines are taken with `next_line`. Bytes of an incomplete line
/// stay pending between pushes.
///
/// A `LineSplitter` does not know about files or offsets, see
/// [`PositionTracker`].
///
/// [`PositionTracker`]: crate::readers::positiontracker::PositionTracker
pub struct LineSplitter {
    separator: LineSeparator,
    /// pending bytes, `pending[pending_at..]` is not yet consumed
    pending: Bytes,
    pending_at: usize,
    /// `pending[pending_at..pending_at + scanned]` has no separator
    scanned: usize,
    /// `Count` of lines taken
    pub(crate) count_lines: Count,
}

impl fmt::Debug for LineSplitter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LineSplitter")
            .field("separator", &self.separator)
            .field("pending len", &self.pending_len())
            .field("scanned", &self.scanned)
            .field("count_lines", &self.count_lines)
            .finish()
    }
}

impl LineSplitter {
    pub fn new(separator: LineSeparator) -> LineSplitter {
        defñ!("({:?})", separator);
        LineSplitter {
            separator,
            pending: Bytes::new(),
            pending_at: 0,
            scanned: 0,
            count_lines: 0,
        }
    }

    /// Append `data` to the pending bytes.
    pub fn push(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        // drop consumed bytes before growing
        if self.pending_at > 0 && self.pending_at * 2 >= self.pending.len() {
            self.pending.drain(..self.pending_at);
            self.pending_at = 0;
        }
        self.pending.extend_from_slice(data);
        defñ!("pushed {}, pending {}", data.len(), self.pending_len());
    }

    /// Take the next complete line, if any.
    ///
    /// `at_eof` means no more data is known to follow right now, which
    /// allows a `Pattern` separator to match at the very end.
    pub fn next_line(&mut self, at_eof: bool) -> Option<LineSpan> {
        let buffer: &[u8] = &self.pending[self.pending_at..];
        let (beg, end) = match self.separator.find(buffer, self.scanned, at_eof) {
            Some(val) => val,
            None => {
                self.scanned = buffer.len();
                return None;
            }
        };
        debug_assert_le!(beg, end);
        let bytes: Bytes = buffer[..beg].to_vec();
        #[cfg(any(debug_assertions, test))]
        defñ!("line {:?} consumed {}", buffer_to_String_noraw(&bytes), end);
        self.pending_at += end;
        self.scanned = 0;
        self.count_lines += 1;
        if self.pending_at == self.pending.len() {
            self.pending.clear();
            self.pending_at = 0;
        }

        Some(LineSpan { bytes, consumed: end })
    }

    /// Count of pending bytes not part of a complete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.pending_at
    }

    /// Take the pending bytes as a final line without separator.
    pub fn take_remainder(&mut self) -> Option<LineSpan> {
        let count: usize = self.pending_len();
        if count == 0 {
            return None;
        }
        let bytes: Bytes = self.pending[self.pending_at..].to_vec();
        self.clear();
        self.count_lines += 1;
        defñ!("remainder of {} bytes", count);

        Some(LineSpan { bytes, consumed: count })
    }

    /// Discard pending bytes.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.pending_at = 0;
        self.scanned = 0;
    }

    pub const fn separator(&self) -> &LineSeparator {
        &self.separator
    }
}

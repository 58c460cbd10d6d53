// src/readers/positiontracker.rs

//! Implements a [`PositionTracker`], the byte offsets of the file currently
//! read.

use crate::common::{Count, FileOffset};

use std::fmt;

use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Byte offsets of the segment currently read.
///
/// `byte_offset` is the next raw byte to read from the file.
/// `line_offset_last` and `line_offset_next` bracket the most recently
/// consumed line in the decoded stream; for an uncompressed file the decoded
/// stream is the raw file.
///
/// `skip_offset` marks lines already delivered, or lines before a resume
/// point. A line beginning before `skip_offset` is consumed but not emitted.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct PositionTracker {
    pub(crate) byte_offset: FileOffset,
    pub(crate) line_offset_last: FileOffset,
    pub(crate) line_offset_next: FileOffset,
    pub(crate) skip_offset: FileOffset,
    /// `Count` of lines consumed, emitted or suppressed
    pub(crate) count_lines: Count,
    /// `Count` of lines suppressed by `skip_offset`
    pub(crate) count_skipped: Count,
}

impl fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "PositionTracker{{byte {}, line {}‥{}, skip {}}}",
            self.byte_offset, self.line_offset_last, self.line_offset_next, self.skip_offset,
        )
    }
}

impl PositionTracker {
    pub fn new() -> PositionTracker {
        PositionTracker::default()
    }

    /// Position at `offset` of a seekable file; reading and line splitting
    /// both begin there.
    pub fn set_byte_pos(&mut self, offset: FileOffset) {
        defñ!("({})", offset);
        self.byte_offset = offset;
        self.line_offset_last = offset;
        self.line_offset_next = offset;
        self.skip_offset = 0;
    }

    /// Position at the start of a stream that cannot seek, e.g. a compressed
    /// file; lines before decoded offset `offset` are suppressed.
    pub fn set_skip_pos(&mut self, offset: FileOffset) {
        defñ!("({})", offset);
        self.set_byte_pos(0);
        self.skip_offset = offset;
    }

    /// `count` raw bytes were read.
    pub fn advance_read(&mut self, count: usize) {
        self.byte_offset += count as FileOffset;
    }

    /// A line of `consumed` bytes (separator included) was split off.
    /// Returns `true` if the line should be emitted.
    pub fn advance_line(&mut self, consumed: usize) -> bool {
        self.line_offset_last = self.line_offset_next;
        self.line_offset_next += consumed as FileOffset;
        debug_assert_le!(self.line_offset_last, self.line_offset_next);
        self.count_lines += 1;
        if self.line_offset_last < self.skip_offset {
            defñ!("suppress line at {} before skip {}", self.line_offset_last, self.skip_offset);
            self.count_skipped += 1;
            return false;
        }

        true
    }

    /// Clear all offsets.
    pub fn reset(&mut self) {
        defñ!();
        self.set_byte_pos(0);
    }

    /// Next raw byte to read.
    pub const fn byte_offset(&self) -> FileOffset {
        self.byte_offset
    }

    /// Start of the most recently consumed line.
    pub const fn line_offset_last(&self) -> FileOffset {
        self.line_offset_last
    }

    /// Start of the next line.
    pub const fn line_offset_next(&self) -> FileOffset {
        self.line_offset_next
    }

    pub const fn skip_offset(&self) -> FileOffset {
        self.skip_offset
    }
}

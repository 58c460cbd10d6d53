// src/data/mod.rs

//! The `data` module is specialized data containers passed out of a tail
//! session.
//!
//! ## Definitions of data
//!
//! #### Line
//!
//! A "line" is a sequence of bytes in a file that:
//!
//! * begins after a prior "line", or at the beginning of a file, or at a
//!   resume offset.
//! * ends with a line separator (by default a newline `'\n'`).
//!
//! A trailing sequence of bytes without a separator is not a "line" until
//! the separator is written. It is found by a [`LineSplitter`].
//!
//! #### Segment
//!
//! A "segment" is one physical file of a rotated log; the primary file or
//! one of the secondary (predecessor) files. A compressed segment is read
//! through a [`Decompressor`]. It is read by a [`SegmentReader`].
//!
//! #### Signal
//!
//! A "signal" is one observable event of a tail session, a [`TailSignal`].
//! All signals of a session are delivered through one queue, in emission
//! order.
//!
//! [`LineSplitter`]: crate::readers::linesplitter::LineSplitter
//! [`Decompressor`]: crate::readers::segmentreader::Decompressor
//! [`SegmentReader`]: crate::readers::segmentreader::SegmentReader
//! [`TailSignal`]: crate::data::signal::TailSignal

pub mod signal;

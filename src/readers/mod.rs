// src/readers/mod.rs

//! "Readers" for _rotaillib_.
//!
//! ## Overview of readers
//!
//! * A [`Tail`] runs a [`ContinuityController`] in a worker thread.
//! * A `ContinuityController` drives a [`SegmentReader`] to read the current
//!   file, a [`LineSplitter`] to derive lines, and a [`PositionTracker`] to
//!   track offsets of the current file.
//! * A `ContinuityController` watches the directory of the primary file with
//!   a [`DirWatcher`].
//! * [`find_start`] searches the files enumerated by [`SecondaryFiles`] for a
//!   start position.
//!
//! <br/>
//!
//! * A `SegmentReader` and a `LineSplitter` only handle `u8` bytes.
//! * Complete lines are decoded to `String` when emitted.
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`Tail`]: crate::readers::tailprocessor::Tail
//! [`ContinuityController`]: crate::readers::continuity::ContinuityController
//! [`SegmentReader`]: crate::readers::segmentreader::SegmentReader
//! [`LineSplitter`]: crate::readers::linesplitter::LineSplitter
//! [`PositionTracker`]: crate::readers::positiontracker::PositionTracker
//! [`DirWatcher`]: crate::readers::dirwatcher::DirWatcher
//! [`find_start`]: crate::readers::startresolver::find_start
//! [`SecondaryFiles`]: crate::readers::secondaryfiles::SecondaryFiles

pub mod continuity;
pub mod dirwatcher;
pub mod helpers;
pub mod linesplitter;
pub mod positiontracker;
pub mod secondaryfiles;
pub mod segmentreader;
pub mod startresolver;
pub mod summary;
pub mod tailoptions;
pub mod tailprocessor;

// src/lib.rs

//! _rotail_ follows the growing tail of a log file across log rotation.
//!
//! A tail session, a [`Tail`], follows one _primary_ file. When the primary
//! file is rotated (renamed, truncated, or replaced) the session continues
//! with the right file without losing or repeating a line. A session may
//! begin at a position found by searching the primary file and it's rotated
//! predecessors, `app.log.1`, `app.log.2.gz`, …
//!
//! See [`readers`] for an overview.
//!
//! [`Tail`]: crate::readers::tailprocessor::Tail

pub mod common;
pub mod data;
pub mod debug;
pub mod readers;
#[cfg(test)]
pub mod tests;

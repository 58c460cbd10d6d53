// src/tests/mod.rs

//! Tests for _rotaillib_.
//!
//! Tests are placed at `src/tests/`, inside the `rotaillib`, for
//! crate-internal visibility. Tests placed at top-level path `tests/` see
//! only the public API.

pub mod common;
pub mod positiontracker_tests;
pub mod segmentreader_tests;
pub mod signal_tests;
pub mod tailprocessor_tests;

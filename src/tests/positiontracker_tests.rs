// src/tests/positiontracker_tests.rs

//! tests for `positiontracker.rs`

#![allow(non_snake_case)]

use crate::readers::positiontracker::PositionTracker;

#[test]
fn test_PositionTracker_set_byte_pos() {
    let mut tracker = PositionTracker::new();
    tracker.set_byte_pos(100);
    assert_eq!(tracker.byte_offset(), 100);
    assert_eq!(tracker.line_offset_last(), 100);
    assert_eq!(tracker.line_offset_next(), 100);
    assert_eq!(tracker.skip_offset(), 0);

    tracker.advance_read(10);
    assert!(tracker.advance_line(4));
    assert_eq!(tracker.byte_offset(), 110);
    assert_eq!(tracker.line_offset_last(), 100);
    assert_eq!(tracker.line_offset_next(), 104);
    assert!(tracker.advance_line(6));
    assert_eq!(tracker.line_offset_last(), 104);
    assert_eq!(tracker.line_offset_next(), 110);
    assert_eq!(tracker.count_lines, 2);
    assert_eq!(tracker.count_skipped, 0);
}

#[test]
fn test_PositionTracker_set_skip_pos() {
    let mut tracker = PositionTracker::new();
    tracker.set_skip_pos(10);
    assert_eq!(tracker.byte_offset(), 0);
    assert_eq!(tracker.skip_offset(), 10);
    // lines at 0 and 5 are before the skip offset
    assert!(!tracker.advance_line(5));
    assert!(!tracker.advance_line(5));
    // line at 10 is the first emitted
    assert!(tracker.advance_line(5));
    assert_eq!(tracker.line_offset_last(), 10);
    assert_eq!(tracker.count_lines, 3);
    assert_eq!(tracker.count_skipped, 2);
}

#[test]
fn test_PositionTracker_skip_inside_line() {
    let mut tracker = PositionTracker::new();
    tracker.set_skip_pos(3);
    // the line at 0 contains offset 3 but begins before it
    assert!(!tracker.advance_line(5));
    assert!(tracker.advance_line(5));
}

#[test]
fn test_PositionTracker_reset() {
    let mut tracker = PositionTracker::new();
    tracker.set_skip_pos(7);
    tracker.advance_read(20);
    tracker.reset();
    assert_eq!(tracker, PositionTracker::new());
    assert_eq!(tracker.byte_offset(), 0);
    assert_eq!(tracker.skip_offset(), 0);
}

// src/tests/tailprocessor_tests.rs

//! tests for `tailprocessor.rs`
//!
//! These tests run a session worker thread. Changes are noticed within the
//! short poll interval `POLL` whether or not the directory watcher works.

#![allow(non_snake_case)]

use crate::common::{search_error, FPath};
use crate::data::signal::TailSignal;
use crate::debug::helpers::{append_file, create_file_in_tmpdir, create_temp_dir, tmpdir_fpath, write_file};
use crate::readers::tailoptions::{StartMode, TailOptions};
use crate::readers::tailprocessor::Tail;
use crate::tests::common::{options_from_start, rows, strings, POLL, WAIT};

use std::io::ErrorKind;
use std::time::Duration;

use ::regex::Regex;

fn tail(options: TailOptions) -> Tail {
    Tail::new(options.poll_interval(POLL)).unwrap()
}

fn next_lines(tail: &Tail, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| match tail.next_line(WAIT) {
            Some(line) => line,
            None => panic!("no line within {:?}", WAIT),
        })
        .collect()
}

fn row_target(target: i64) -> impl Fn(&str) -> Option<std::cmp::Ordering> + Send + 'static {
    move |token: &str| token.parse::<i64>().ok().map(|n| target.cmp(&n))
}

fn row_regex() -> Regex {
    Regex::new(r"^Row (\d+)$").unwrap()
}

#[test]
fn test_Tail_start_next_line_stop() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"a\nb\n");
    let tail = tail(options_from_start(&primary));
    assert_eq!(tail.primary(), &primary);
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 2), strings(&["a", "b"]));

    append_file(&primary, b"c\n");
    assert_eq!(next_lines(&tail, 1), strings(&["c"]));

    let summary = tail.stop().wait().unwrap();
    assert_eq!(summary.count_lines, 3);
    assert_eq!(summary.paths_opened, vec![primary]);
    assert!(tail.fatal_error().is_none());
}

#[test]
fn test_Tail_signals_kept_by_next_line() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"a\n");
    let tail = tail(options_from_start(&primary));
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["a"]));
    // `ready` was received by `next_line` and kept
    match tail.recv_signal(WAIT) {
        Some(TailSignal::Ready(handle_id)) => assert_eq!(handle_id, 1),
        signal => panic!("expected ready, got {:?}", signal),
    }
    match tail.recv_signal(WAIT) {
        Some(TailSignal::Eof(offset)) => assert_eq!(offset, 2),
        signal => panic!("expected eof, got {:?}", signal),
    }
    assert!(tail.try_recv_signal().is_none());
}

#[test]
fn test_Tail_rotation() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"one\n");
    let rotated = tmpdir_fpath(&tmpdir, "app.log.1");
    let tail = tail(options_from_start(&primary));
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["one"]));

    std::fs::rename(&primary, &rotated).unwrap();
    append_file(&rotated, b"two\n");
    assert_eq!(next_lines(&tail, 1), strings(&["two"]));
    write_file(&primary, b"three\n");
    assert_eq!(next_lines(&tail, 1), strings(&["three"]));

    let summary = tail.stop().wait().unwrap();
    assert_eq!(summary.handle_last, 2);
    assert_eq!(summary.count_restarts, 1);
}

#[test]
fn test_Tail_find_start_rows() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", rows(5, 6).as_bytes());
    create_file_in_tmpdir(&tmpdir, "app.log.1", rows(1, 4).as_bytes());
    let tail = tail(TailOptions::new(primary.clone()));
    let found = tail.find_start(row_regex(), row_target(3)).wait().unwrap();
    assert!(found);
    assert_eq!(next_lines(&tail, 4), strings(&["Row 3", "Row 4", "Row 5", "Row 6"]));

    append_file(&primary, b"Row 7\n");
    assert_eq!(next_lines(&tail, 1), strings(&["Row 7"]));
}

#[test]
fn test_Tail_find_start_not_found() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", rows(5, 6).as_bytes());
    let rotated = create_file_in_tmpdir(&tmpdir, "app.log.1", rows(3, 4).as_bytes());
    let tail = tail(TailOptions::new(primary.clone()));
    let err = tail.find_start(row_regex(), row_target(1)).wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let serr = search_error(&err).unwrap();
    assert_eq!(serr.files, vec![primary, rotated]);
}

#[test]
fn test_Tail_find_start_not_found_forced() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", rows(5, 6).as_bytes());
    let tail = tail(options_from_start(&primary).force(true));
    let found = tail.find_start(row_regex(), row_target(1)).wait().unwrap();
    assert!(!found);
    // started normally, from the start
    assert_eq!(next_lines(&tail, 2), strings(&["Row 5", "Row 6"]));
}

#[test]
fn test_Tail_find_start_comparator_violation() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"Row x\n");
    let tail = tail(options_from_start(&primary).force(true));
    let regex = Regex::new(r"^Row (\w+)$").unwrap();
    let err = tail.find_start(regex, row_target(1)).wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    // the session remains usable
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["Row x"]));
}

#[test]
fn test_Tail_find_start_interrupted() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", rows(1, 20000).as_bytes());
    let tail = tail(TailOptions::new(primary).read_bufsz(1));
    let pending = tail.find_start(row_regex(), row_target(1_000_000));
    let stopped = tail.stop();
    let err = pending.wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Interrupted);
    let summary = stopped.wait().unwrap();
    assert_eq!(summary.count_lines, 0);
}

#[test]
fn test_Tail_start_missing() {
    let tmpdir = create_temp_dir();
    let primary = tmpdir_fpath(&tmpdir, "app.log");
    let tail = tail(options_from_start(&primary));
    let err = tail.start(None).wait().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    // not fatal; the session can be started again
    assert!(tail.fatal_error().is_none());
    write_file(&primary, b"later\n");
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["later"]));
}

#[test]
fn test_Tail_start_missing_forced() {
    let tmpdir = create_temp_dir();
    let primary = tmpdir_fpath(&tmpdir, "app.log");
    let tail = tail(options_from_start(&primary).force(true));
    tail.start(None).wait().unwrap();
    assert!(tail.next_line(Duration::from_millis(100)).is_none());

    write_file(&primary, b"appeared\n");
    assert_eq!(next_lines(&tail, 1), strings(&["appeared"]));
}

#[test]
fn test_Tail_starts_all_answered() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"p\n");
    let other = create_file_in_tmpdir(&tmpdir, "other.log", b"o\n");
    let tail = tail(TailOptions::new(primary.clone()).start_mode(StartMode::AtEnd));
    let pendings = vec![
        tail.start(Some(other.clone())),
        tail.start(Some(other)),
        tail.start(None),
    ];
    for pending in pendings.into_iter() {
        pending.wait().unwrap();
    }
    // the last start wins
    append_file(&primary, b"q\n");
    assert_eq!(next_lines(&tail, 1), strings(&["q"]));
}

#[test]
fn test_Tail_stop_then_start() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"a\n");
    let tail = tail(options_from_start(&primary));
    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["a"]));
    tail.stop().wait().unwrap();

    tail.start(None).wait().unwrap();
    assert_eq!(next_lines(&tail, 1), strings(&["a"]));
    let summary = tail.stop().wait().unwrap();
    // handle ids are never reused
    assert_eq!(summary.handle_last, 2);
}

#[test]
fn test_Tail_wait_timeout() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"a\n");
    let tail = tail(options_from_start(&primary));
    let pending = tail.start(None);
    match pending.wait_timeout(WAIT) {
        Some(result) => result.unwrap(),
        None => panic!("start did not resolve within {:?}", WAIT),
    }
}

#[test]
fn test_Tail_drop_joins_worker() {
    let tmpdir = create_temp_dir();
    let primary = create_file_in_tmpdir(&tmpdir, "app.log", b"a\n");
    let tail = tail(options_from_start(&primary));
    tail.start(None).wait().unwrap();
    drop(tail);
}

#[test]
fn test_Tail_new_bad_options() {
    let options = TailOptions::new(FPath::new());
    let err = Tail::new(options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

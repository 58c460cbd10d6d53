// src/tests/signal_tests.rs

//! tests for `signal.rs`

#![allow(non_snake_case)]

use crate::common::FPath;
use crate::data::signal::{ChanRecvSignal, ChanSendSignal, RestartReason, SignalEmitter, TailSignal};

use std::io::{Error, ErrorKind};
use std::sync::Arc;

use ::crossbeam_channel;
use ::test_case::test_case;

fn emitter(observe_errors: bool, force: bool) -> (SignalEmitter, ChanRecvSignal) {
    let (chan_send, chan_recv): (ChanSendSignal, ChanRecvSignal) = crossbeam_channel::unbounded();

    (SignalEmitter::new(chan_send, observe_errors, force), chan_recv)
}

#[test_case(RestartReason::PrimeFound, "PRIMEFOUND")]
#[test_case(RestartReason::NewPrime, "NEWPRIME")]
#[test_case(RestartReason::Truncate, "TRUNCATE")]
#[test_case(RestartReason::CatchUp, "CATCHUP")]
fn test_RestartReason_as_str(reason: RestartReason, expect: &str) {
    assert_eq!(reason.as_str(), expect);
    assert_eq!(reason.to_string(), expect);
}

#[test_case(TailSignal::Line(String::from("x")), "line", "line(\"x\")")]
#[test_case(TailSignal::Ready(3), "ready", "ready(3)")]
#[test_case(TailSignal::Eof(10), "eof", "eof(10)")]
#[test_case(TailSignal::Skip(99), "skip", "skip(99)")]
#[test_case(TailSignal::Secondary(FPath::from("a.1")), "secondary", "secondary(\"a.1\")")]
#[test_case(TailSignal::Restart(RestartReason::Truncate), "restart", "restart(TRUNCATE)")]
#[test_case(TailSignal::Error(Arc::new(Error::new(ErrorKind::Other, "bad"))), "error", "error(bad)")]
fn test_TailSignal_name_display(signal: TailSignal, name: &str, display: &str) {
    assert_eq!(signal.name(), name);
    assert_eq!(signal.to_string(), display);
}

#[test]
fn test_SignalEmitter_emit_order() {
    let (mut emitter, chan_recv) = emitter(false, false);
    emitter.emit(TailSignal::Ready(1));
    emitter.emit(TailSignal::Line(String::from("a")));
    emitter.emit(TailSignal::Eof(2));
    let names: Vec<&str> = chan_recv.try_iter().map(|signal| signal.name()).collect();
    assert_eq!(names, vec!["ready", "line", "eof"]);
    assert_eq!(emitter.count_sent, 3);
}

#[test]
fn test_SignalEmitter_emit_disconnected() {
    let (mut emitter, chan_recv) = emitter(false, false);
    drop(chan_recv);
    emitter.emit(TailSignal::Ready(1));
    assert_eq!(emitter.count_sent, 0);
}

#[test]
fn test_SignalEmitter_on_error_observed() {
    let (mut emitter, chan_recv) = emitter(true, false);
    emitter.on_error(Error::new(ErrorKind::PermissionDenied, "denied")).unwrap();
    match chan_recv.try_recv().unwrap() {
        TailSignal::Error(err) => assert_eq!(err.kind(), ErrorKind::PermissionDenied),
        signal => panic!("expected error signal, got {}", signal),
    }
    assert_eq!(emitter.count_errors, 1);
}

#[test]
fn test_SignalEmitter_on_error_forced() {
    let (mut emitter, chan_recv) = emitter(false, true);
    assert!(emitter.force());
    emitter.on_error(Error::new(ErrorKind::Other, "warned")).unwrap();
    assert!(chan_recv.try_recv().is_err());
    assert_eq!(emitter.count_errors, 1);
}

#[test]
fn test_SignalEmitter_on_error_fatal() {
    let (mut emitter, chan_recv) = emitter(false, false);
    let err = emitter.on_error(Error::new(ErrorKind::Other, "fatal")).unwrap_err();
    assert_eq!(err.to_string(), "fatal");
    assert!(chan_recv.try_recv().is_err());
}

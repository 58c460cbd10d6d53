// src/tests/common.rs

//! Common data and helpers for tests.

use crate::common::FPath;
use crate::data::signal::{ChanRecvSignal, TailSignal};
use crate::readers::tailoptions::{StartMode, TailOptions};

use std::time::Duration;

/// Time to wait for a signal of a session worker before a test gives up.
pub const WAIT: Duration = Duration::from_secs(10);

/// Poll interval of threaded tests; short so tests do not rely on the
/// directory watcher.
pub const POLL: Duration = Duration::from_millis(20);

/// `Row N` lines of numbers `beg..=end`, each with a trailing newline.
pub fn rows(beg: u32, end: u32) -> String {
    (beg..=end).map(|n| format!("Row {}\n", n)).collect()
}

/// Options reading `primary` from the start with a small buffer, so every
/// file takes several reads.
pub fn options_from_start(primary: &FPath) -> TailOptions {
    TailOptions::new(primary.clone())
        .start_mode(StartMode::AtStart)
        .read_bufsz(7)
}

/// Take all signals available now.
pub fn drain(chan_recv: &ChanRecvSignal) -> Vec<TailSignal> {
    chan_recv.try_iter().collect()
}

/// The lines of `signals`.
pub fn lines_of(signals: &[TailSignal]) -> Vec<String> {
    signals
        .iter()
        .filter_map(|signal| match signal {
            TailSignal::Line(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

/// The signals of `signals` other than lines, as `Display` strings, e.g.
/// `"ready(1)"`.
pub fn events_of(signals: &[TailSignal]) -> Vec<String> {
    signals
        .iter()
        .filter(|signal| !matches!(signal, TailSignal::Line(_)))
        .map(|signal| signal.to_string())
        .collect()
}

/// Owned `Vec<String>` of `strs`.
pub fn strings(strs: &[&str]) -> Vec<String> {
    strs.iter().map(|s| String::from(*s)).collect()
}

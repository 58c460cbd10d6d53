// src/data/signal.rs

//! Implements [`TailSignal`], the observable events of a tail session, and
//! the [`SignalEmitter`] that delivers them.

use crate::common::{Count, ErrorP, FPath, FileOffset, HandleId};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};

use std::fmt;
use std::io::{Error, Result};
use std::sync::Arc;

use ::crossbeam_channel;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TailSignal
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reason passed with a [`TailSignal::Restart`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RestartReason {
    /// Content was found in a new primary file while not tailing any file.
    PrimeFound,
    /// Content was found in a new primary file while tailing another file.
    NewPrime,
    /// The current file decreased in size.
    Truncate,
    /// Reading moved to the next file of the backlog left by a start search.
    CatchUp,
}

impl RestartReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RestartReason::PrimeFound => "PRIMEFOUND",
            RestartReason::NewPrime => "NEWPRIME",
            RestartReason::Truncate => "TRUNCATE",
            RestartReason::CatchUp => "CATCHUP",
        }
    }
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An observable event of a tail session.
#[derive(Clone, Debug)]
pub enum TailSignal {
    /// A complete line, separator removed.
    Line(String),
    /// A file was opened and is ready for reading.
    Ready(HandleId),
    /// An error occurred. Only delivered when errors are observed, see
    /// [`TailOptions::observe_errors`].
    ///
    /// [`TailOptions::observe_errors`]: crate::readers::tailoptions::TailOptions#method.observe_errors
    Error(ErrorP),
    /// All available lines were delivered; the value is the byte offset
    /// reached.
    Eof(FileOffset),
    /// A file would have been read from the start but is larger than the
    /// size cutoff; reading starts at the passed byte offset (the end).
    Skip(FileOffset),
    /// The file opened is a secondary file.
    Secondary(FPath),
    /// Reading restarted in another file, or at the start of the same file.
    Restart(RestartReason),
}

impl TailSignal {
    /// Short name of the signal, without data.
    pub const fn name(&self) -> &'static str {
        match self {
            TailSignal::Line(_) => "line",
            TailSignal::Ready(_) => "ready",
            TailSignal::Error(_) => "error",
            TailSignal::Eof(_) => "eof",
            TailSignal::Skip(_) => "skip",
            TailSignal::Secondary(_) => "secondary",
            TailSignal::Restart(_) => "restart",
        }
    }
}

impl fmt::Display for TailSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TailSignal::Line(line) => write!(f, "line({:?})", line),
            TailSignal::Ready(handle) => write!(f, "ready({})", handle),
            TailSignal::Error(err) => write!(f, "error({})", err),
            TailSignal::Eof(fo) => write!(f, "eof({})", fo),
            TailSignal::Skip(fo) => write!(f, "skip({})", fo),
            TailSignal::Secondary(path) => write!(f, "secondary({:?})", path),
            TailSignal::Restart(reason) => write!(f, "restart({})", reason),
        }
    }
}

/// Sender channel of [`TailSignal`s] (used by the session worker).
///
/// [`TailSignal`s]: self::TailSignal
pub type ChanSendSignal = crossbeam_channel::Sender<TailSignal>;

/// Receiver channel of [`TailSignal`s] (used by the session owner).
///
/// [`TailSignal`s]: self::TailSignal
pub type ChanRecvSignal = crossbeam_channel::Receiver<TailSignal>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SignalEmitter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Delivers [`TailSignal`s] of one session into one channel, in emission
/// order, and applies the error policy of the session.
///
/// Error policy, see [`on_error`]:
///
/// * errors are observed: deliver a [`TailSignal::Error`].
/// * errors are not observed and `force`: print a warning, continue.
/// * otherwise: the error is fatal and returned to the caller.
///
/// [`TailSignal`s]: self::TailSignal
/// [`on_error`]: self::SignalEmitter#method.on_error
pub struct SignalEmitter {
    chan_send: ChanSendSignal,
    observe_errors: bool,
    force: bool,
    /// `Count` of signals sent.
    pub(crate) count_sent: Count,
    /// `Count` of errors passed to `on_error`.
    pub(crate) count_errors: Count,
}

impl fmt::Debug for SignalEmitter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SignalEmitter")
            .field("observe_errors", &self.observe_errors)
            .field("force", &self.force)
            .field("count_sent", &self.count_sent)
            .field("count_errors", &self.count_errors)
            .finish()
    }
}

impl SignalEmitter {
    pub fn new(chan_send: ChanSendSignal, observe_errors: bool, force: bool) -> SignalEmitter {
        SignalEmitter {
            chan_send,
            observe_errors,
            force,
            count_sent: 0,
            count_errors: 0,
        }
    }

    /// Deliver the `signal`.
    ///
    /// A disconnected receiver is not an error of the session; the signal is
    /// dropped.
    pub fn emit(&mut self, signal: TailSignal) {
        defñ!("{}", signal);
        match self.chan_send.send(signal) {
            Ok(_) => {
                self.count_sent += 1;
            }
            Err(_err) => {
                de_wrn!("chan_send.send(…) failed {}", _err);
            }
        }
    }

    /// Apply the error policy to `error`. Returns `Err(error)` only if the
    /// error is fatal.
    pub fn on_error(&mut self, error: Error) -> Result<()> {
        defn!("({:?})", error);
        self.count_errors += 1;
        if self.observe_errors {
            self.emit(TailSignal::Error(Arc::new(error)));
            defx!("observed");
            return Ok(());
        }
        if self.force {
            e_wrn!("{}", error);
            defx!("forced");
            return Ok(());
        }
        e_err!("no error observer and not forced: {}", error);
        defx!("fatal");

        Err(error)
    }

    pub const fn force(&self) -> bool {
        self.force
    }
}

// src/readers/tailprocessor.rs

//! Implements a [`Tail`], the handle of one tail session, and the worker
//! thread that runs the session's [`ContinuityController`].
//!
//! All file access of a session happens in it's worker thread. Requests
//! (`start`, `stop`, `find_start`) are queued to the worker and answered
//! through a [`Pending`]. Signals are delivered through one channel in the
//! order emitted.
//!
//! Requests are processed in order:
//!
//! * consecutive `start` requests are merged; the last one is performed and
//!   every merged caller receives it's outcome.
//! * a request arriving during a `find_start` search interrupts the search;
//!   the search fails with `ErrorKind::Interrupted`.
//! * the worker checks for requests between every read, so no request
//!   waits for a file to be read to it's end.
//!
//! [`ContinuityController`]: crate::readers::continuity::ContinuityController

use crate::common::{clone_error, search_error, FPath};
use crate::data::signal::{ChanRecvSignal, ChanSendSignal, TailSignal};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::continuity::ContinuityController;
use crate::readers::helpers::basename;
use crate::readers::startresolver::{find_start, ResolvedStart, StartCmp};
use crate::readers::summary::Summary;
use crate::readers::tailoptions::TailOptions;

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use ::crossbeam_channel::{self, select};
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pending
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

type ChanSendReply<T> = crossbeam_channel::Sender<Result<T>>;
type ChanRecvReply<T> = crossbeam_channel::Receiver<Result<T>>;

/// The fatal error that ended a session worker.
type FatalSlot = Arc<Mutex<Option<Error>>>;

fn fatal_error(fatal: &FatalSlot) -> Option<Error> {
    let guard: MutexGuard<Option<Error>> = match fatal.lock() {
        Ok(val) => val,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.as_ref().map(clone_error)
}

fn worker_gone(fatal: &FatalSlot) -> Error {
    match fatal_error(fatal) {
        Some(err) => err,
        None => Error::new(ErrorKind::BrokenPipe, "tail session worker has exited"),
    }
}

/// The outcome of a request to a session, available once the request was
/// processed.
#[must_use = "a Pending does nothing unless waited on"]
pub struct Pending<T> {
    chan_recv: ChanRecvReply<T>,
    fatal: FatalSlot,
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pending")
            .field("ready", &!self.chan_recv.is_empty())
            .finish()
    }
}

impl<T> Pending<T> {
    /// Block until the request was processed, return it's outcome.
    pub fn wait(self) -> Result<T> {
        match self.chan_recv.recv() {
            Ok(result) => result,
            Err(_) => Err(worker_gone(&self.fatal)),
        }
    }

    /// Wait at most `timeout` for the outcome. `None` if the request is
    /// still pending.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        match self.chan_recv.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => None,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Some(Err(worker_gone(&self.fatal))),
        }
    }
}

fn reply<T>(chan_send: &ChanSendReply<T>, result: Result<T>) {
    if let Err(_err) = chan_send.send(result) {
        // the caller dropped the `Pending`
        defñ!("reply dropped: {}", _err);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// session worker
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A request to the session worker.
enum Command {
    Start {
        path: Option<FPath>,
        reply: ChanSendReply<()>,
    },
    Stop {
        reply: ChanSendReply<Summary>,
    },
    FindStart {
        pattern: Regex,
        cmp: StartCmp,
        reply: ChanSendReply<bool>,
    },
    Shutdown,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Start { path, .. } => write!(f, "Start({:?})", path),
            Command::Stop { .. } => write!(f, "Stop"),
            Command::FindStart { pattern, .. } => write!(f, "FindStart({:?})", pattern.as_str()),
            Command::Shutdown => write!(f, "Shutdown"),
        }
    }
}

impl Command {
    /// Answer the request with `error`.
    fn fail(self, error: &Error) {
        match self {
            Command::Start { reply: chan, .. } => reply(&chan, Err(clone_error(error))),
            Command::Stop { reply: chan } => reply(&chan, Err(clone_error(error))),
            Command::FindStart { reply: chan, .. } => reply(&chan, Err(clone_error(error))),
            Command::Shutdown => {}
        }
    }
}

type ChanSendCommand = crossbeam_channel::Sender<Command>;
type ChanRecvCommand = crossbeam_channel::Receiver<Command>;

/// Control flow of the worker after a request.
enum Flow {
    Continue,
    Exit,
}

/// The session worker. Owns the `controller`, exits on `Shutdown`, on a
/// disconnected request channel, or on a fatal error.
struct Worker {
    controller: ContinuityController,
    chan_cmd: ChanRecvCommand,
    /// requests received but not yet processed
    queue: VecDeque<Command>,
    /// the owning `Tail` is gone
    closed: bool,
    poll_interval: Duration,
    fatal: FatalSlot,
}

impl Worker {
    fn receive_available(&mut self) {
        loop {
            match self.chan_cmd.try_recv() {
                Ok(cmd) => self.queue.push_back(cmd),
                Err(crossbeam_channel::TryRecvError::Empty) => break,
                Err(crossbeam_channel::TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
    }

    fn run(mut self) {
        defn!("{:?}", self.controller.primary());
        loop {
            self.receive_available();
            if let Some(cmd) = self.queue.pop_front() {
                match self.process(cmd) {
                    Flow::Continue => continue,
                    Flow::Exit => break,
                }
            }
            let result: Result<()> = self.drive();
            if let Err(err) = result {
                self.end_fatal(err);
                break;
            }
            if self.closed && self.queue.is_empty() {
                break;
            }
        }
        self.controller.stop();
        defx!("{:?}", self.controller.primary());
    }

    /// Read, or wait for a request, a notification, or the poll interval.
    fn drive(&mut self) -> Result<()> {
        if let Some(watch_recv) = self.controller.watch_receiver() {
            while let Ok(event) = watch_recv.try_recv() {
                self.controller.on_watch_event(event)?;
            }
        }
        if self.controller.wants_read() {
            return self.controller.step();
        }
        let watch_recv = self
            .controller
            .watch_receiver()
            .unwrap_or_else(crossbeam_channel::never);
        select! {
            recv(self.chan_cmd) -> msg => {
                match msg {
                    Ok(cmd) => self.queue.push_back(cmd),
                    Err(_) => self.closed = true,
                }
                Ok(())
            }
            recv(watch_recv) -> msg => match msg {
                Ok(event) => self.controller.on_watch_event(event),
                Err(_) => {
                    self.controller.on_watch_disconnected();
                    Ok(())
                }
            },
            default(self.poll_interval) => self.controller.on_poll(),
        }
    }

    fn process(&mut self, cmd: Command) -> Flow {
        defn!("{:?}", cmd);
        let flow: Flow = match cmd {
            Command::Start { path, reply: chan } => self.process_start(path, chan),
            Command::Stop { reply: chan } => {
                let summary: Summary = self.controller.stop();
                reply(&chan, Ok(summary));
                Flow::Continue
            }
            Command::FindStart { pattern, cmp, reply: chan } => {
                let result: Result<bool> = self.process_find_start(&pattern, &cmp);
                reply(&chan, result);
                Flow::Continue
            }
            Command::Shutdown => Flow::Exit,
        };
        defx!();

        flow
    }

    fn process_start(&mut self, path: Option<FPath>, chan: ChanSendReply<()>) -> Flow {
        let mut path: Option<FPath> = path;
        let mut chans: Vec<ChanSendReply<()>> = vec![chan];
        self.receive_available();
        while let Some(Command::Start { .. }) = self.queue.front() {
            if let Some(Command::Start { path: path_, reply: chan_ }) = self.queue.pop_front() {
                defo!("superseded by start({:?})", path_);
                path = path_;
                chans.push(chan_);
            }
        }
        match self.controller.start(path) {
            Ok(()) => {
                for chan in chans.iter() {
                    reply(chan, Ok(()));
                }
            }
            Err(err) => {
                for chan in chans.iter() {
                    reply(chan, Err(clone_error(&err)));
                }
            }
        }

        Flow::Continue
    }

    fn process_find_start(&mut self, pattern: &Regex, cmp: &StartCmp) -> Result<bool> {
        defn!("({:?})", pattern.as_str());
        let primary: FPath = self.controller.primary().clone();
        let secondary: Option<FPath> = self.controller.secondary_override().cloned();
        let scan = self.controller.scan_options();
        let chan_cmd: &ChanRecvCommand = &self.chan_cmd;
        let queue: &mut VecDeque<Command> = &mut self.queue;
        let mut interrupt = || -> bool {
            while let Ok(cmd) = chan_cmd.try_recv() {
                queue.push_back(cmd);
            }
            !queue.is_empty()
        };
        let result: Result<ResolvedStart> =
            find_start(&primary, secondary.as_ref(), pattern, cmp, &scan, &mut interrupt);
        match result {
            Ok(resolved) => {
                defo!("resolved {}", resolved);
                self.controller.start_resolved(resolved)?;
                defx!("true");
                Ok(true)
            }
            Err(err) if err.kind() == ErrorKind::Interrupted || err.kind() == ErrorKind::InvalidData => {
                defx!("{}", err);
                Err(err)
            }
            Err(err) if self.controller.force() => {
                if search_error(&err).is_some() {
                    e_wrn!("{}; start at {:?}", err, primary);
                } else {
                    e_wrn!("{}", err);
                }
                self.controller.start(None)?;
                defx!("false");
                Ok(false)
            }
            Err(err) => {
                defx!("{}", err);
                Err(err)
            }
        }
    }

    /// Record the fatal `error`, fail all queued requests.
    fn end_fatal(&mut self, error: Error) {
        e_err!("{}", error);
        {
            let mut guard: MutexGuard<Option<Error>> = match self.fatal.lock() {
                Ok(val) => val,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = Some(clone_error(&error));
        }
        self.receive_available();
        while let Some(cmd) = self.queue.pop_front() {
            cmd.fail(&error);
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tail
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A tail session following one primary file.
///
/// ```no_run
/// use std::time::Duration;
/// use rotaillib::readers::tailoptions::TailOptions;
/// use rotaillib::readers::tailprocessor::Tail;
///
/// let tail = Tail::new(TailOptions::new(String::from("/var/log/syslog"))).unwrap();
/// tail.start(None).wait().unwrap();
/// while let Some(line) = tail.next_line(Duration::from_secs(5)) {
///     println!("{}", line);
/// }
/// let summary = tail.stop().wait().unwrap();
/// eprintln!("{}", summary);
/// ```
///
/// Dropping a `Tail` stops the session and joins its worker thread.
pub struct Tail {
    primary: FPath,
    chan_cmd: ChanSendCommand,
    chan_recv_signal: ChanRecvSignal,
    /// signals other than `Line` received by `next_line`
    stash: Mutex<VecDeque<TailSignal>>,
    fatal: FatalSlot,
    worker: Option<thread::JoinHandle<()>>,
}

impl fmt::Debug for Tail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tail")
            .field("primary", &self.primary)
            .field("signals", &self.chan_recv_signal.len())
            .field("fatal", &fatal_error(&self.fatal))
            .finish()
    }
}

impl Tail {
    /// Create a session for `options`. The options are checked; no file is
    /// accessed until [`start`] or [`find_start`].
    ///
    /// [`start`]: self::Tail#method.start
    /// [`find_start`]: self::Tail#method.find_start
    pub fn new(options: TailOptions) -> Result<Tail> {
        defn!("({:?})", options);
        let primary: FPath = options.primary.clone();
        let poll_interval: Duration = options.poll_interval;
        let (chan_send_signal, chan_recv_signal): (ChanSendSignal, ChanRecvSignal) =
            crossbeam_channel::unbounded();
        let controller = ContinuityController::new(options, chan_send_signal)?;
        let (chan_cmd, chan_recv_cmd): (ChanSendCommand, ChanRecvCommand) = crossbeam_channel::unbounded();
        let fatal: FatalSlot = Arc::new(Mutex::new(None));
        let worker = Worker {
            controller,
            chan_cmd: chan_recv_cmd,
            queue: VecDeque::new(),
            closed: false,
            poll_interval,
            fatal: fatal.clone(),
        };
        let joinhandle = match thread::Builder::new()
            .name(basename(&primary))
            .spawn(move || worker.run())
        {
            Ok(val) => val,
            Err(err) => {
                e_err!("thread.name({:?}).spawn() failed {:?}", basename(&primary), err);
                defx!("spawn failed");
                return Err(err);
            }
        };
        defx!();

        Ok(Tail {
            primary,
            chan_cmd,
            chan_recv_signal,
            stash: Mutex::new(VecDeque::new()),
            fatal,
            worker: Some(joinhandle),
        })
    }

    pub fn primary(&self) -> &FPath {
        &self.primary
    }

    fn request<T>(&self, make: impl FnOnce(ChanSendReply<T>) -> Command) -> Pending<T> {
        let (chan_send, chan_recv): (ChanSendReply<T>, ChanRecvReply<T>) = crossbeam_channel::bounded(1);
        if let Err(err) = self.chan_cmd.send(make(chan_send)) {
            defñ!("worker gone");
            err.into_inner().fail(&worker_gone(&self.fatal));
        }

        Pending {
            chan_recv,
            fatal: self.fatal.clone(),
        }
    }

    /// Start the session at `path`, or at the primary file if `None`.
    ///
    /// Resolves once the file was opened, or failed to open.
    pub fn start(&self, path: Option<FPath>) -> Pending<()> {
        defñ!("({:?})", path);
        self.request(|reply| Command::Start { path, reply })
    }

    /// Stop the session: close the file, stop watching, clear offsets.
    ///
    /// Resolves once torn down, with the statistics of the session.
    pub fn stop(&self) -> Pending<Summary> {
        defñ!();
        self.request(|reply| Command::Stop { reply })
    }

    /// Search the primary file and it's predecessor files for a start
    /// position, then start there; see [`find_start`].
    ///
    /// Lines matching `pattern` yield a token, compared by `cmp`. Resolves to
    /// `true` when the start position was found, `false` when not found but
    /// the session is forced and was started normally.
    ///
    /// [`find_start`]: crate::readers::startresolver::find_start
    pub fn find_start<F>(&self, pattern: Regex, cmp: F) -> Pending<bool>
    where
        F: Fn(&str) -> Option<Ordering> + Send + 'static,
    {
        defñ!("({:?})", pattern.as_str());
        let cmp: StartCmp = Box::new(cmp);
        self.request(|reply| Command::FindStart { pattern, cmp, reply })
    }

    fn stash(&self) -> MutexGuard<VecDeque<TailSignal>> {
        match self.stash.lock() {
            Ok(val) => val,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Wait at most `timeout` for the next line.
    ///
    /// Other signals received meanwhile remain available to
    /// [`recv_signal`].
    ///
    /// [`recv_signal`]: self::Tail#method.recv_signal
    pub fn next_line(&self, timeout: Duration) -> Option<String> {
        let deadline: Instant = Instant::now() + timeout;
        loop {
            match self.chan_recv_signal.recv_deadline(deadline) {
                Ok(TailSignal::Line(line)) => return Some(line),
                Ok(signal) => self.stash().push_back(signal),
                Err(_) => return None,
            }
        }
    }

    /// Wait at most `timeout` for the next signal.
    pub fn recv_signal(&self, timeout: Duration) -> Option<TailSignal> {
        if let Some(signal) = self.stash().pop_front() {
            return Some(signal);
        }
        self.chan_recv_signal.recv_timeout(timeout).ok()
    }

    /// The next signal, if one is available now.
    pub fn try_recv_signal(&self) -> Option<TailSignal> {
        if let Some(signal) = self.stash().pop_front() {
            return Some(signal);
        }
        self.chan_recv_signal.try_recv().ok()
    }

    /// The error that ended the session, if any.
    pub fn fatal_error(&self) -> Option<Error> {
        fatal_error(&self.fatal)
    }
}

impl Drop for Tail {
    fn drop(&mut self) {
        defn!("{:?}", self.primary);
        // the worker may have exited already
        let _ = self.chan_cmd.send(Command::Shutdown);
        if let Some(joinhandle) = self.worker.take() {
            if joinhandle.join().is_err() {
                de_err!("worker thread of {:?} panicked", self.primary);
            }
        }
        defx!();
    }
}

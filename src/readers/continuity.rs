// src/readers/continuity.rs

//! Implements a [`ContinuityController`], the state machine deciding which
//! physical file of a tail session is read.
//!
//! The controller drives a [`SegmentReader`], a [`LineSplitter`], and a
//! [`PositionTracker`] for the current file. At the end of the current file
//! it checks, in order:
//!
//! 1. the _backlog_ of files left by a start search, see [`find_start`];
//!    the next backlog file is opened (`CATCHUP`).
//! 2. the primary file path; a different file with content replaced the
//!    current file (`NEWPRIME`).
//! 3. the size of the open file; less than the bytes read means the file
//!    was truncated in place (`TRUNCATE`).
//!
//! Without an open file, a change of the primary file path opens the primary
//! file (`PRIMEFOUND`). A primary file closed by an error and found again
//! with the same identity is resumed after it's last delivered line.
//!
//! A `ContinuityController` does no waiting. It is driven by the session
//! worker, see [`Tail`].
//!
//! [`SegmentReader`]: crate::readers::segmentreader::SegmentReader
//! [`LineSplitter`]: crate::readers::linesplitter::LineSplitter
//! [`PositionTracker`]: crate::readers::positiontracker::PositionTracker
//! [`find_start`]: crate::readers::startresolver::find_start
//! [`Tail`]: crate::readers::tailprocessor::Tail

use crate::common::{
    err_from_err_path,
    file_id_from_metadata,
    Bytes,
    Count,
    FPath,
    FileId,
    FileMetadata,
    FileOffset,
    FileSz,
    HandleId,
    ResultS3,
};
use crate::data::signal::{ChanSendSignal, RestartReason, SignalEmitter, TailSignal};
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use crate::readers::dirwatcher::{ChanRecvWatch, DirWatcher, WatchEvent};
use crate::readers::helpers::{basename, fpath_to_path};
use crate::readers::linesplitter::{LineSpan, LineSplitter};
use crate::readers::positiontracker::PositionTracker;
use crate::readers::secondaryfiles::{first_secondary, SecondaryFile};
use crate::readers::segmentreader::{decode_line, Decompressor, GzDecompressor, SegmentReader};
use crate::readers::startresolver::{ResolvedStart, ScanOptions};
use crate::readers::summary::Summary;
use crate::readers::tailoptions::{StartMode, TailOptions};

use std::fmt;
use std::io::{Error, ErrorKind, Result};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TailState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// State of a [`ContinuityController`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TailState {
    /// No file is current.
    Stopped,
    /// Opening the file. A forced session without any file stays here,
    /// watching for the primary file.
    Starting(FPath),
    /// Reading the file.
    Reading(FPath),
    /// All bytes of the file were read; waiting for a change.
    AtEof(FPath),
    /// Changing files.
    Switching(RestartReason),
}

impl fmt::Display for TailState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TailState::Stopped => write!(f, "Stopped"),
            TailState::Starting(path) => write!(f, "Starting({:?})", path),
            TailState::Reading(path) => write!(f, "Reading({:?})", path),
            TailState::AtEof(path) => write!(f, "AtEof({:?})", path),
            TailState::Switching(reason) => write!(f, "Switching({})", reason),
        }
    }
}

/// Where an opened file begins.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OpenPosition {
    /// The configured [`StartMode`].
    Configured,
    /// At the start, unless the file is larger than the size cutoff.
    FromStart,
    /// At a decoded byte offset.
    Resume(FileOffset),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ContinuityController
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The owned state of one tail session.
pub struct ContinuityController {
    options: TailOptions,
    emitter: SignalEmitter,
    state: TailState,
    /// the file the session is started at; `None` when stopped
    current: Option<FPath>,
    reader: Option<SegmentReader>,
    /// identity of the file of `reader`
    file_id: FileId,
    tracker: PositionTracker,
    splitter: LineSplitter,
    /// decoded bytes of the last read
    chunk: Bytes,
    watcher: Option<DirWatcher>,
    watch_recv: Option<ChanRecvWatch>,
    /// a change notification arrived while reading
    readable: bool,
    /// offset of the last `eof` signal of the current file
    eof_offset: Option<FileOffset>,
    /// files to read before live tailing, the last entry first
    backlog: Vec<SecondaryFile>,
    /// identity and next line offset of the file closed by an error
    resume_at: Option<(FileId, FileOffset)>,
    handle_last: HandleId,
    summary: Summary,
}

impl fmt::Debug for ContinuityController {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ContinuityController")
            .field("state", &self.state)
            .field("current", &self.current)
            .field("reader", &self.reader)
            .field("file_id", &self.file_id)
            .field("tracker", &self.tracker)
            .field("is_watching", &self.is_watching())
            .field("readable", &self.readable)
            .field("eof_offset", &self.eof_offset)
            .field("backlog", &self.backlog)
            .field("resume_at", &self.resume_at)
            .field("handle_last", &self.handle_last)
            .finish()
    }
}

impl ContinuityController {
    /// Create a `ContinuityController`. No file is accessed.
    pub fn new(options: TailOptions, chan_send: ChanSendSignal) -> Result<ContinuityController> {
        defn!("({:?})", options);
        options.validate()?;
        let separator = options.line_separator()?;
        let emitter = SignalEmitter::new(chan_send, options.observe_errors, options.force);
        let summary = Summary::new(options.primary.clone());
        let chunk = Bytes::with_capacity(options.read_bufsz);
        defx!();

        Ok(ContinuityController {
            options,
            emitter,
            state: TailState::Stopped,
            current: None,
            reader: None,
            file_id: FileId::default(),
            tracker: PositionTracker::new(),
            splitter: LineSplitter::new(separator),
            chunk,
            watcher: None,
            watch_recv: None,
            readable: false,
            eof_offset: None,
            backlog: Vec::new(),
            resume_at: None,
            handle_last: 0,
            summary,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // accessors
    // ─────────────────────────────────────────────────────────────────────

    pub const fn state(&self) -> &TailState {
        &self.state
    }

    pub fn primary(&self) -> &FPath {
        &self.options.primary
    }

    pub const fn current(&self) -> Option<&FPath> {
        self.current.as_ref()
    }

    pub fn handle_id(&self) -> Option<HandleId> {
        self.reader.as_ref().map(|reader| reader.handle_id())
    }

    pub const fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn backlog(&self) -> &[SecondaryFile] {
        &self.backlog
    }

    /// Channel of directory change notifications, if watching.
    pub fn watch_receiver(&self) -> Option<ChanRecvWatch> {
        self.watch_recv.clone()
    }

    /// Is there anything to read without waiting for a notification?
    pub fn wants_read(&self) -> bool {
        self.reader.is_some() && matches!(self.state, TailState::Reading(_))
    }

    pub const fn force(&self) -> bool {
        self.options.force
    }

    /// The predecessor file configured in place of the numbered chain.
    pub fn secondary_override(&self) -> Option<&FPath> {
        self.options.secondary.as_ref()
    }

    /// How files are read by a start search of this session.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            separator: self.splitter.separator().clone(),
            encoding: self.options.encoding,
            read_bufsz: self.options.read_bufsz,
        }
    }

    /// Statistics so far.
    pub fn summary(&self) -> Summary {
        let mut summary: Summary = self.summary.clone();
        summary.handle_last = self.handle_last;
        summary.count_errors = self.emitter.count_errors;
        summary.count_signals = self.emitter.count_sent;
        summary
    }

    // ─────────────────────────────────────────────────────────────────────
    // start and stop
    // ─────────────────────────────────────────────────────────────────────

    /// Start the session at `path`, the primary file if `None`.
    ///
    /// A missing primary file falls back to the first secondary file. When
    /// neither can be opened the session is stopped and the error of the
    /// first file returned, unless forced; a forced session stays started
    /// without a file and watches for the primary file to appear.
    pub fn start(&mut self, path: Option<FPath>) -> Result<()> {
        let target: FPath = path.unwrap_or_else(|| self.options.primary.clone());
        defn!("({:?})", target);
        if self.current.as_ref() == Some(&target) {
            if let Some(reader) = self.reader.as_ref() {
                let handle_id: HandleId = reader.handle_id();
                defx!("already started, handle {}", handle_id);
                self.emitter.emit(TailSignal::Ready(handle_id));
                return Ok(());
            }
        }
        self.close_reader();
        self.backlog.clear();
        self.resume_at = None;
        self.state = TailState::Starting(target.clone());
        self.current = Some(target.clone());

        let result: Result<()> = match self.open(&target, OpenPosition::Configured) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound && target == self.options.primary => {
                let secondary: SecondaryFile =
                    first_secondary(&self.options.primary, self.options.secondary.as_ref());
                defo!("primary missing, try secondary {:?}", secondary.path);
                self.current = Some(secondary.path.clone());
                match self.open(&secondary.path, OpenPosition::Configured) {
                    Ok(()) => Ok(()),
                    // the primary file's error is the root cause
                    Err(_err2) => {
                        defo!("secondary failed {}", _err2);
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                defx!("started {}", self.state);
                Ok(())
            }
            Err(err) => {
                if !self.options.force {
                    defx!("not forced, stop; {}", err);
                    self.stop();
                    return Err(err);
                }
                self.close_reader();
                self.current = Some(self.options.primary.clone());
                self.state = TailState::Starting(self.options.primary.clone());
                self.ensure_watching();
                defx!("forced; started without a file; {}", err);
                self.emitter.on_error(err)
            }
        }
    }

    /// Start the session at a position resolved by a start search.
    pub fn start_resolved(&mut self, resolved: ResolvedStart) -> Result<()> {
        defn!("({})", resolved);
        self.close_reader();
        self.state = TailState::Starting(resolved.path.clone());
        self.current = Some(resolved.path.clone());
        self.backlog = resolved.backlog;
        self.resume_at = None;
        if let Err(err) = self.open(&resolved.path, OpenPosition::Resume(resolved.offset)) {
            defx!("open failed, stop; {}", err);
            self.stop();
            return Err(err);
        }
        defx!();

        Ok(())
    }

    /// Stop the session. The open file is closed, watching stops, offsets
    /// are cleared. Returns the statistics of the session.
    pub fn stop(&mut self) -> Summary {
        defn!("{}", self.state);
        self.close_reader();
        self.watcher = None;
        self.watch_recv = None;
        self.current = None;
        self.backlog.clear();
        self.resume_at = None;
        self.tracker.reset();
        self.state = TailState::Stopped;
        defx!();

        self.summary()
    }

    // ─────────────────────────────────────────────────────────────────────
    // opening and closing files
    // ─────────────────────────────────────────────────────────────────────

    /// Close the open file, if any. Watching continues.
    fn close_reader(&mut self) {
        if let Some(_reader) = self.reader.take() {
            defñ!("close {:?}", _reader);
        }
        self.splitter.clear();
        self.readable = false;
        self.eof_offset = None;
    }

    /// Watch the directory of the primary file. Without a watcher the
    /// session relies on polling.
    fn ensure_watching(&mut self) {
        if self.watcher.is_some() {
            return;
        }
        match DirWatcher::new(&self.options.primary) {
            Ok((watcher, watch_recv)) => {
                defñ!("watching {:?}", watcher.dir());
                self.watcher = Some(watcher);
                self.watch_recv = Some(watch_recv);
            }
            Err(err) => {
                e_wrn!("{}; polling every {:?}", err, self.options.poll_interval);
            }
        }
    }

    /// Open `path` at `position`, make it the current file.
    fn open(&mut self, path: &FPath, position: OpenPosition) -> Result<()> {
        defn!("({:?}, {:?})", path, position);
        let sfile = SecondaryFile::from_path(path.clone());
        let metadata: FileMetadata = match std::fs::metadata(fpath_to_path(path)) {
            Ok(val) => val,
            Err(err) => {
                defx!("stat error {}", err);
                return Err(err_from_err_path(&err, path, Some("(stat)")));
            }
        };
        let filesz: FileSz = metadata.len();
        let cutoff = |filesz: FileSz| -> bool {
            self.options.size_cutoff != 0 && filesz > self.options.size_cutoff
        };
        // (raw byte offset, decoded skip offset, skip signal)
        let (offset, skip, skipped): (FileOffset, FileOffset, bool) = match position {
            OpenPosition::Configured => match self.options.start_mode {
                StartMode::AtEnd => (filesz, 0, false),
                StartMode::AtStart if cutoff(filesz) => (filesz, 0, true),
                StartMode::AtStart => (0, 0, false),
                StartMode::AtByteOffset(at) if sfile.is_compressed => (0, at, false),
                StartMode::AtByteOffset(at) => (at, 0, false),
            },
            OpenPosition::FromStart if cutoff(filesz) => (filesz, 0, true),
            OpenPosition::FromStart => (0, 0, false),
            OpenPosition::Resume(at) if sfile.is_compressed => (0, at, false),
            OpenPosition::Resume(at) => (at, 0, false),
        };
        let decompressor: Option<Box<dyn Decompressor>> = match sfile.is_compressed {
            true => Some(Box::new(GzDecompressor::new())),
            false => None,
        };
        let handle_id: HandleId = self.handle_last + 1;
        let reader = SegmentReader::open(path, handle_id, decompressor, offset, self.options.read_bufsz)?;
        self.handle_last = handle_id;
        self.file_id = reader.file_id();
        if skip != 0 {
            self.tracker.set_skip_pos(skip);
        } else {
            self.tracker.set_byte_pos(offset);
        }
        self.close_reader();
        self.reader = Some(reader);
        self.summary.paths_opened.push(path.clone());
        self.state = TailState::Reading(path.clone());
        if skipped {
            self.emitter.emit(TailSignal::Skip(filesz));
        }
        if path != &self.options.primary {
            self.emitter.emit(TailSignal::Secondary(path.clone()));
        }
        self.ensure_watching();
        self.emitter.emit(TailSignal::Ready(handle_id));
        defx!("handle {}, file_id {}, {:?}", handle_id, self.file_id, self.tracker);

        Ok(())
    }

    /// Close the current file, signal `reason`, open `path`.
    fn switch(&mut self, reason: RestartReason, path: FPath, position: OpenPosition) -> Result<()> {
        defn!("({}, {:?}, {:?})", reason, path, position);
        self.state = TailState::Switching(reason);
        self.close_reader();
        self.emitter.emit(TailSignal::Restart(reason));
        self.summary.count_restarts += 1;
        self.current = Some(path.clone());
        let result = self.open(&path, position);
        defx!("{:?}", result);

        result
    }

    // ─────────────────────────────────────────────────────────────────────
    // reading
    // ─────────────────────────────────────────────────────────────────────

    /// Read one buffer from the current file, emit the complete lines.
    ///
    /// Returns `Found(count)` of raw bytes read, `Done` at the end of the
    /// file or without a file.
    pub fn read_once(&mut self) -> ResultS3<usize, Error> {
        let reader: &mut SegmentReader = match self.reader.as_mut() {
            Some(val) => val,
            None => return ResultS3::Done,
        };
        self.chunk.clear();
        let count: usize = match reader.read_chunk(&mut self.chunk) {
            Ok(val) => val,
            Err(err) => return ResultS3::Err(err),
        };
        self.tracker.advance_read(count);
        self.summary.count_bytes += count as Count;
        self.splitter.push(&self.chunk);
        self.emit_lines(count == 0);
        if count == 0 {
            return ResultS3::Done;
        }

        ResultS3::Found(count)
    }

    /// Read once, handle the end of the file or an error.
    ///
    /// Returns `Err` only for a fatal error.
    pub fn step(&mut self) -> Result<()> {
        let result: Result<()> = match self.read_once() {
            ResultS3::Found(_) => Ok(()),
            ResultS3::Done => self.on_end_of_file(),
            ResultS3::Err(err) => Err(err),
        };
        match result {
            Ok(()) => Ok(()),
            Err(err) => self.on_error(err),
        }
    }

    /// Read until the end of the current file and handle it.
    pub fn read_available(&mut self) -> Result<()> {
        while self.wants_read() {
            self.step()?;
        }

        Ok(())
    }

    fn emit_lines(&mut self, at_eof: bool) {
        while let Some(span) = self.splitter.next_line(at_eof) {
            self.emit_line(span);
        }
    }

    /// Advance past `span`, emit it unless suppressed.
    fn emit_line(&mut self, span: LineSpan) {
        let line_start: FileOffset = self.tracker.line_offset_next();
        if !self.tracker.advance_line(span.consumed) {
            self.summary.count_lines_skipped += 1;
            return;
        }
        let line: String = decode_line(self.options.encoding, &span.bytes, line_start == 0);
        self.summary.count_lines += 1;
        self.emitter.emit(TailSignal::Line(line));
    }

    /// Emit the bytes remaining after the last separator of a file the
    /// session leaves; the file is not read again.
    fn flush_remainder(&mut self) {
        self.emit_lines(true);
        if let Some(span) = self.splitter.take_remainder() {
            defñ!("flush {} bytes", span.consumed);
            self.emit_line(span);
        }
    }

    /// The current file was read to it's end. Switch files or wait.
    pub fn on_end_of_file(&mut self) -> Result<()> {
        let path: FPath = match self.reader.as_ref() {
            Some(reader) => reader.path().clone(),
            None => return Ok(()),
        };
        defn!("({:?}) {:?}", path, self.tracker);

        if let Some(next) = self.backlog.pop() {
            defx!("CATCHUP {:?}", next.path);
            self.flush_remainder();
            return self.switch(RestartReason::CatchUp, next.path, OpenPosition::Resume(0));
        }

        // the primary path is checked before the open file; a truncation in
        // between must not look like a replacement
        let primary: FPath = self.options.primary.clone();
        let primary_metadata: Option<FileMetadata> = match std::fs::metadata(fpath_to_path(&primary)) {
            Ok(metadata) => Some(metadata),
            Err(_err) => {
                defo!("primary {:?} unavailable {}", primary, _err);
                None
            }
        };
        let (filesz, compressed): (FileSz, bool) = match self.reader.as_ref() {
            Some(reader) => (reader.metadata()?.len(), reader.is_compressed()),
            None => return Ok(()),
        };
        if let Some(metadata) = primary_metadata {
            let open_len: Option<FileSz> = match compressed {
                true => None,
                false => Some(filesz),
            };
            if primary_replaced(
                file_id_from_metadata(&metadata),
                metadata.len(),
                self.file_id,
                open_len,
                self.tracker.byte_offset(),
            ) {
                defx!("NEWPRIME {:?}", primary);
                self.flush_remainder();
                return self.switch(RestartReason::NewPrime, primary, OpenPosition::FromStart);
            }
        }
        if !compressed && filesz < self.tracker.byte_offset() {
            defx!("TRUNCATE {:?} size {} < offset {}", path, filesz, self.tracker.byte_offset());
            return self.switch(RestartReason::Truncate, path, OpenPosition::Resume(0));
        }

        if self.readable {
            self.readable = false;
            self.state = TailState::Reading(path);
            defx!("notified while reading, read again");
            return Ok(());
        }
        self.state = TailState::AtEof(path);
        let offset: FileOffset = self.tracker.byte_offset();
        if self.eof_offset != Some(offset) {
            self.eof_offset = Some(offset);
            self.emitter.emit(TailSignal::Eof(offset));
        }
        defx!("{}", self.state);

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // notifications
    // ─────────────────────────────────────────────────────────────────────

    /// Handle a notification of the directory watcher.
    pub fn on_watch_event(&mut self, event: WatchEvent) -> Result<()> {
        defn!("({:?}) {}", event, self.state);
        let names = match event {
            WatchEvent::Changed(names) => names,
            WatchEvent::Error(message) => {
                defx!("watcher error");
                return self.on_error(Error::new(ErrorKind::Other, message));
            }
        };
        if self.current.is_none() {
            defx!("stopped");
            return Ok(());
        }
        if self.reader.is_some() {
            match &self.state {
                TailState::AtEof(path) => {
                    self.state = TailState::Reading(path.clone());
                }
                _ => {
                    self.readable = true;
                }
            }
            defx!("{}", self.state);
            return Ok(());
        }
        let primary_name: FPath = basename(&self.options.primary);
        if !names.iter().any(|name| name == &primary_name) {
            defx!("not the primary");
            return Ok(());
        }
        let result = self.prime_found();
        defx!("{:?}", result);

        result
    }

    /// The watcher stopped delivering notifications. Continue by polling.
    pub fn on_watch_disconnected(&mut self) {
        if self.watcher.take().is_some() {
            e_wrn!("watch of {:?} ended; polling every {:?}", self.options.primary, self.options.poll_interval);
        }
        self.watch_recv = None;
    }

    /// Handle the passing of the poll interval without notification.
    pub fn on_poll(&mut self) -> Result<()> {
        let names = vec![basename(&self.options.primary)];
        self.on_watch_event(WatchEvent::Changed(names))
    }

    /// Open a primary file that appeared while no file was open.
    ///
    /// The file closed by the last error is resumed at it's next line. Any
    /// other file is read from the start, or skipped if larger than the
    /// size cutoff.
    fn prime_found(&mut self) -> Result<()> {
        let primary: FPath = self.options.primary.clone();
        let file_id: FileId = match std::fs::metadata(fpath_to_path(&primary)) {
            Ok(metadata) => file_id_from_metadata(&metadata),
            Err(_err) => {
                defñ!("{:?} unavailable {}", primary, _err);
                return Ok(());
            }
        };
        let resume_at: Option<(FileId, FileOffset)> = self.resume_at.take();
        let position: OpenPosition = match resume_at {
            Some((resume_id, offset)) if resume_id == file_id => OpenPosition::Resume(offset),
            _ => OpenPosition::FromStart,
        };
        defñ!("{:?} file_id {}, {:?}", primary, file_id, position);
        match self.switch(RestartReason::PrimeFound, primary, position) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.resume_at = resume_at;
                self.on_error(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // errors
    // ─────────────────────────────────────────────────────────────────────

    /// Handle an error of the current file or the watcher.
    ///
    /// The current file is closed. A forced session continues, watching for
    /// the primary file, and remembers where the closed file was left.
    /// Otherwise the session is stopped. Returns `Err` if the error is fatal,
    /// see [`SignalEmitter::on_error`].
    ///
    /// [`SignalEmitter::on_error`]: crate::data::signal::SignalEmitter#method.on_error
    pub fn on_error(&mut self, error: Error) -> Result<()> {
        defn!("({})", error);
        if self.options.force && self.reader.is_some() {
            self.resume_at = Some((self.file_id, self.tracker.line_offset_next()));
        }
        self.close_reader();
        if self.options.force && self.current.is_some() {
            let primary: FPath = self.options.primary.clone();
            self.current = Some(primary.clone());
            self.state = TailState::Starting(primary);
            self.ensure_watching();
        } else {
            self.stop();
        }
        let result = self.emitter.on_error(error);
        defx!("{:?}", result);

        result
    }
}

/// Does the primary path name a different file than the open file?
///
/// Either the identities differ, or the primary file is smaller than the
/// `offset` read from the open file while the open file is not. The size
/// comparison catches a replacement with an indistinguishable identity, see
/// [`file_id_from_metadata`]. `open_len` is `None` for a compressed file.
/// An empty primary file is not a replacement yet.
///
/// [`file_id_from_metadata`]: crate::common::file_id_from_metadata
pub fn primary_replaced(
    primary_id: FileId,
    primary_len: FileSz,
    open_id: FileId,
    open_len: Option<FileSz>,
    offset: FileOffset,
) -> bool {
    if primary_len == 0 {
        return false;
    }
    if primary_id != open_id {
        return true;
    }
    match open_len {
        Some(open_len) => primary_len < offset && open_len >= offset,
        None => false,
    }
}

// src/readers/tailoptions.rs

//! Implements [`TailOptions`], the configuration of a tail session.

use crate::common::{FPath, FileOffset, FileSz};
use crate::readers::linesplitter::{LineSeparator, LINE_SEPARATOR_DEF};
use crate::readers::segmentreader::{READ_BUFSZ_DEF, READ_BUFSZ_MIN};

use std::fmt;
use std::io::{Error, ErrorKind, Result};
use std::time::Duration;

use ::encoding_rs::{Encoding, UTF_8};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Where a freshly opened primary file begins.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartMode {
    /// At the end; only lines appended later are delivered.
    AtEnd,
    /// At the start, unless the file is larger than the size cutoff.
    AtStart,
    /// At a byte offset.
    AtByteOffset(FileOffset),
}

/// Line separator before encoding; see [`LineSeparator`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SeparatorSpec {
    Literal(String),
    /// A regular expression over the encoded bytes.
    Pattern(String),
}

pub const START_MODE_DEF: StartMode = StartMode::AtEnd;
/// `0` disables the size cutoff.
pub const SIZE_CUTOFF_DEF: FileSz = 0;
pub const FORCE_DEF: bool = false;
pub const POLL_INTERVAL_DEF: Duration = Duration::from_secs(1);
pub const POLL_INTERVAL_MIN: Duration = Duration::from_millis(1);
pub const OBSERVE_ERRORS_DEF: bool = false;

/// Configuration of a tail session. Create with [`TailOptions::new`] and
/// the builder methods.
///
/// ```
/// use rotaillib::readers::tailoptions::{StartMode, TailOptions};
///
/// let options = TailOptions::new(String::from("/var/log/app.log"))
///     .start_mode(StartMode::AtStart)
///     .size_cutoff(1 << 20)
///     .read_bufsz(512);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct TailOptions {
    /// the file to follow
    pub primary: FPath,
    /// replaces the chain of numbered predecessor files with this one file
    pub secondary: Option<FPath>,
    pub start_mode: StartMode,
    /// a file opened `AtStart` larger than this starts at the end
    pub size_cutoff: FileSz,
    /// continue after errors and missing files
    pub force: bool,
    pub separator: SeparatorSpec,
    /// default is UTF-8
    pub encoding: &'static Encoding,
    /// bytes per read
    pub read_bufsz: usize,
    /// interval of checking for changes when no notification arrives
    pub poll_interval: Duration,
    /// deliver errors as [`TailSignal::Error`]
    ///
    /// [`TailSignal::Error`]: crate::data::signal::TailSignal
    pub observe_errors: bool,
}

impl fmt::Debug for TailOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TailOptions")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("start_mode", &self.start_mode)
            .field("size_cutoff", &self.size_cutoff)
            .field("force", &self.force)
            .field("separator", &self.separator)
            .field("encoding", &self.encoding.name())
            .field("read_bufsz", &self.read_bufsz)
            .field("poll_interval", &self.poll_interval)
            .field("observe_errors", &self.observe_errors)
            .finish()
    }
}

impl TailOptions {
    pub fn new(primary: FPath) -> TailOptions {
        TailOptions {
            primary,
            secondary: None,
            start_mode: START_MODE_DEF,
            size_cutoff: SIZE_CUTOFF_DEF,
            force: FORCE_DEF,
            separator: SeparatorSpec::Literal(String::from(LINE_SEPARATOR_DEF)),
            encoding: UTF_8,
            read_bufsz: READ_BUFSZ_DEF,
            poll_interval: POLL_INTERVAL_DEF,
            observe_errors: OBSERVE_ERRORS_DEF,
        }
    }

    pub fn secondary(mut self, secondary: FPath) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn start_mode(mut self, start_mode: StartMode) -> Self {
        self.start_mode = start_mode;
        self
    }

    pub fn size_cutoff(mut self, size_cutoff: FileSz) -> Self {
        self.size_cutoff = size_cutoff;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn separator(mut self, separator: SeparatorSpec) -> Self {
        self.separator = separator;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the encoding by WHATWG label, e.g. `"utf-16le"` or `"latin1"`.
    pub fn encoding_label(self, label: &str) -> Result<Self> {
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => Ok(self.encoding(encoding)),
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("unknown encoding label {:?}", label),
            )),
        }
    }

    pub fn read_bufsz(mut self, read_bufsz: usize) -> Self {
        self.read_bufsz = read_bufsz;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn observe_errors(mut self, observe_errors: bool) -> Self {
        self.observe_errors = observe_errors;
        self
    }

    /// The [`LineSeparator`] of `separator` in `encoding`.
    pub fn line_separator(&self) -> Result<LineSeparator> {
        match &self.separator {
            SeparatorSpec::Literal(literal) => LineSeparator::literal(literal, self.encoding),
            SeparatorSpec::Pattern(pattern) => LineSeparator::pattern(pattern, self.encoding),
        }
    }

    /// Check the options. No file is accessed.
    pub fn validate(&self) -> Result<()> {
        defn!("{:?}", self);
        if self.primary.is_empty() {
            defx!("primary is empty");
            return Err(Error::new(ErrorKind::InvalidInput, "primary path is empty"));
        }
        if self.read_bufsz < READ_BUFSZ_MIN {
            defx!("read_bufsz {} too small", self.read_bufsz);
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("read buffer size {} is less than {}", self.read_bufsz, READ_BUFSZ_MIN),
            ));
        }
        if self.poll_interval < POLL_INTERVAL_MIN {
            defx!("poll_interval {:?} too small", self.poll_interval);
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("poll interval {:?} is less than {:?}", self.poll_interval, POLL_INTERVAL_MIN),
            ));
        }
        self.line_separator()?;
        defx!("valid");

        Ok(())
    }
}

// src/bin/rotail.rs

//! Driver program _rotail_.
//!
//! Follows one log file across log rotation and prints each line to stdout.
//! Optionally begins at a line found in the file or it's rotated
//! predecessor files, see `--find-start`.
//!
//! Signals other than lines are printed to stderr in debug builds.

#![allow(non_camel_case_types)]

use std::io::{ErrorKind, Write};
use std::process::ExitCode;
use std::sync::RwLock;
use std::time::Duration;

use ::anyhow::{self, Context};
use ::clap::Parser;
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

use ::rotaillib::common::{search_error, FPath, FileOffset, FileSz};
use ::rotaillib::data::signal::TailSignal;
#[allow(unused_imports)]
use ::rotaillib::debug::printers::{de_err, de_wrn, e_err, e_wrn};
use ::rotaillib::readers::segmentreader::READ_BUFSZ_DEF;
use ::rotaillib::readers::startresolver::integer_target;
use ::rotaillib::readers::tailoptions::{SeparatorSpec, StartMode, TailOptions, POLL_INTERVAL_DEF};
use ::rotaillib::readers::tailprocessor::Tail;

/// process exit code on error
const EXIT_ERR: u8 = 1;

/// interval of checking for ctrl+c while no signal arrives
const RECV_INTERVAL: Duration = Duration::from_millis(100);

const CLI_HELP_AFTER: &str = concat!(
    "\
The primary file PATH is followed across rotation. Rotated predecessor files
are PATH.1, PATH.2, …, then PATH.N.gz, PATH.N+1.gz, …

--separator accepts backslash escape sequences:
    \"\\0\", \"\\a\", \"\\b\", \"\\e\", \"\\f\", \"\\n\", \"\\r\", \"\\\\\", \"\\t\", \"\\v\"

--find-start REGEX is matched against each line, the first capture group (or
the whole match) must be an integer. Output begins at the first line with a
value equal to or greater than --target.
",
);

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "rotail",
    version = env!("CARGO_PKG_VERSION"),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of the log file to follow.
    #[clap(required = true, verbatim_doc_comment)]
    path: String,

    /// Path of the one predecessor file, instead of the numbered rotated
    /// files.
    #[clap(long, verbatim_doc_comment)]
    secondary: Option<String>,

    /// Begin at the start of the file instead of at the end.
    #[clap(
        short = 's',
        long = "from-start",
        verbatim_doc_comment,
        conflicts_with = "offset",
    )]
    from_start: bool,

    /// Begin at this byte offset of the file.
    #[clap(long, verbatim_doc_comment)]
    offset: Option<FileOffset>,

    /// With --from-start, a file larger than this many bytes begins at the
    /// end instead. 0 disables.
    #[clap(long, verbatim_doc_comment, default_value_t = 0)]
    cutoff: FileSz,

    /// Continue after errors and wait for a missing file to appear.
    #[clap(short = 'f', long, verbatim_doc_comment)]
    force: bool,

    /// Line separator string.
    #[clap(long, verbatim_doc_comment, conflicts_with = "separator_regex")]
    separator: Option<String>,

    /// Line separator regular expression, e.g. "\r?\n".
    #[clap(long = "separator-regex", verbatim_doc_comment)]
    separator_regex: Option<String>,

    /// Encoding of the file, any WHATWG label, e.g. "utf-16le" or "latin1".
    #[clap(short = 'e', long, verbatim_doc_comment, default_value = "utf-8")]
    encoding: String,

    /// Read this many bytes at a time.
    /// Most useful for developers.
    #[clap(long, verbatim_doc_comment, default_value_t = READ_BUFSZ_DEF)]
    bufsz: usize,

    /// Check the file for changes every this many milliseconds when no change
    /// notification arrives.
    #[clap(long = "poll-ms", verbatim_doc_comment, default_value_t = POLL_INTERVAL_DEF.as_millis() as u64)]
    poll_ms: u64,

    /// Begin at a line found by this regular expression, see --target.
    #[clap(long = "find-start", verbatim_doc_comment, requires = "target")]
    find_start: Option<String>,

    /// The integer value searched by --find-start.
    #[clap(long, verbatim_doc_comment, requires = "find_start", allow_hyphen_values = true)]
    target: Option<i64>,

    /// Print a summary of the session to stderr.
    /// Most useful for developers.
    #[clap(long, verbatim_doc_comment)]
    summary: bool,
}

mod unescape {
    // this mod ripped from https://stackoverflow.com/a/58555097/471376

    #[derive(Debug, PartialEq)]
    pub(super) enum EscapeError {
        EscapeAtEndOfString,
        InvalidEscapedChar(char),
    }

    struct InterpretEscapedString<'a> {
        s: std::str::Chars<'a>,
    }

    impl Iterator for InterpretEscapedString<'_> {
        type Item = Result<char, EscapeError>;

        fn next(&mut self) -> Option<Self::Item> {
            self.s.next().map(|c| match c {
                '\\' => match self.s.next() {
                    None => Err(EscapeError::EscapeAtEndOfString),
                    Some('0') => Ok('\0'),
                    Some('a') => Ok('\u{07}'),
                    Some('b') => Ok('\u{08}'),
                    Some('e') => Ok('\u{1B}'),
                    Some('f') => Ok('\u{0C}'),
                    Some('n') => Ok('\n'),
                    Some('r') => Ok('\r'),
                    Some('\\') => Ok('\\'),
                    Some('t') => Ok('\t'),
                    Some('v') => Ok('\u{0B}'),
                    Some(c) => Err(EscapeError::InvalidEscapedChar(c)),
                },
                c => Ok(c),
            })
        }
    }

    pub(super) fn unescape_str(s: &str) -> Result<String, EscapeError> {
        (InterpretEscapedString { s: s.chars() }).collect()
    }
}

/// Transform the command-line arguments into `TailOptions`.
fn cli_process_args(args: &CLI_Args) -> anyhow::Result<TailOptions> {
    defn!("{:?}", args);
    let start_mode: StartMode = match (args.from_start, args.offset) {
        (_, Some(offset)) => StartMode::AtByteOffset(offset),
        (true, None) => StartMode::AtStart,
        (false, None) => StartMode::AtEnd,
    };
    let mut options = TailOptions::new(FPath::from(args.path.as_str()))
        .start_mode(start_mode)
        .size_cutoff(args.cutoff)
        .force(args.force)
        .read_bufsz(args.bufsz)
        .poll_interval(Duration::from_millis(args.poll_ms))
        .encoding_label(args.encoding.as_str())?;
    if let Some(secondary) = args.secondary.as_ref() {
        options = options.secondary(FPath::from(secondary.as_str()));
    }
    if let Some(separator) = args.separator.as_ref() {
        let separator: String = match unescape::unescape_str(separator) {
            Ok(val) => val,
            Err(err) => anyhow::bail!("bad --separator {:?}: {:?}", separator, err),
        };
        options = options.separator(SeparatorSpec::Literal(separator));
    }
    if let Some(pattern) = args.separator_regex.as_ref() {
        options = options.separator(SeparatorSpec::Pattern(pattern.clone()));
    }
    options.validate()?;
    defx!("{:?}", options);

    Ok(options)
}

lazy_static! {
    /// flag to signal to main thread should return ASAP.
    /// Polled by function `processing_loop`.
    static ref EXIT_EARLY: RwLock<bool> = RwLock::new(false);
}

fn exit_early() -> bool {
    match EXIT_EARLY.read() {
        Ok(exit_early) => *exit_early,
        Err(err) => {
            e_err!("EXIT_EARLY.read() failed: {:?}", err);
            true
        }
    }
}

/// set a process signal handler
pub fn set_signal_handler() -> anyhow::Result<(), ctrlc::Error> {
    defn!();
    ctrlc::set_handler(move || {
        match EXIT_EARLY.write() {
            Ok(mut exit_early) => {
                *exit_early = true;
            }
            Err(_err) => {
                de_err!("EXIT_EARLY.write() failed {}", _err);
            }
        }
    })?;
    defx!();

    Ok(())
}

/// Start the session, print signals until interrupted or a fatal error.
/// Returns `true` on a clean exit.
fn processing_loop(tail: &Tail, args: &CLI_Args) -> anyhow::Result<bool> {
    defn!();
    match (args.find_start.as_ref(), args.target) {
        (Some(pattern), Some(target)) => {
            let regex: Regex = Regex::new(pattern).with_context(|| format!("bad --find-start {:?}", pattern))?;
            let found: bool = match tail.find_start(regex, integer_target(target)).wait() {
                Ok(val) => val,
                Err(err) => match search_error(&err) {
                    Some(serr) => anyhow::bail!("{}", serr),
                    None => return Err(err).with_context(|| format!("find start in {:?}", tail.primary())),
                },
            };
            if !found {
                e_wrn!("target {} not found; following {:?}", target, tail.primary());
            }
        }
        _ => {
            tail.start(None)
                .wait()
                .with_context(|| format!("start {:?}", tail.primary()))?;
        }
    }

    let stdout = std::io::stdout();
    let mut stdout_lock = stdout.lock();
    while !exit_early() {
        let signal: TailSignal = match tail.recv_signal(RECV_INTERVAL) {
            Some(val) => val,
            None => {
                if let Some(err) = tail.fatal_error() {
                    defx!("fatal {}", err);
                    return Err(err).context("tail session ended");
                }
                continue;
            }
        };
        match signal {
            TailSignal::Line(line) => {
                let result = stdout_lock
                    .write_all(line.as_bytes())
                    .and_then(|_| stdout_lock.write_all(b"\n"))
                    .and_then(|_| stdout_lock.flush());
                if let Err(err) = result {
                    if err.kind() == ErrorKind::BrokenPipe {
                        defx!("BrokenPipe");
                        return Ok(true);
                    }
                    return Err(err).context("write to stdout");
                }
            }
            TailSignal::Error(err) => {
                e_err!("{}", err);
            }
            TailSignal::Skip(offset) => {
                e_wrn!("file larger than --cutoff; begin at end, byte {}", offset);
            }
            _signal => {
                de_wrn!("{}", _signal);
            }
        }
    }
    defx!("exit early");

    Ok(true)
}

pub fn main() -> ExitCode {
    defn!();
    let args = CLI_Args::parse();
    let options: TailOptions = match cli_process_args(&args) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{:#}", err);
            return ExitCode::from(EXIT_ERR);
        }
    };
    if let Err(err) = set_signal_handler() {
        e_wrn!("set_signal_handler() failed {}", err);
    }
    let tail: Tail = match Tail::new(options) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{}", err);
            return ExitCode::from(EXIT_ERR);
        }
    };
    let ret: bool = match processing_loop(&tail, &args) {
        Ok(val) => val,
        Err(err) => {
            e_err!("{:#}", err);
            false
        }
    };
    match tail.stop().wait() {
        Ok(summary) => {
            if args.summary {
                eprintln!("{}", summary);
            }
        }
        Err(_err) => {
            de_err!("stop failed {}", _err);
        }
    }
    let exitcode = if ret { ExitCode::SUCCESS } else { ExitCode::from(EXIT_ERR) };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

#[cfg(test)]
mod tests {
    use super::*;

    use ::test_case::test_case;

    #[test_case(r"\n", "\n")]
    #[test_case(r"\r\n", "\r\n")]
    #[test_case(r"--\t--", "--\t--")]
    #[test_case("abc", "abc")]
    fn test_unescape_str(input: &str, expect: &str) {
        assert_eq!(unescape::unescape_str(input), Ok(String::from(expect)));
    }

    #[test]
    fn test_unescape_str_err() {
        assert_eq!(unescape::unescape_str(r"\"), Err(unescape::EscapeError::EscapeAtEndOfString));
        assert_eq!(unescape::unescape_str(r"\q"), Err(unescape::EscapeError::InvalidEscapedChar('q')));
    }

    #[test]
    fn test_cli_process_args_defaults() {
        let args = CLI_Args::parse_from(["rotail", "/tmp/app.log"]);
        let options = cli_process_args(&args).unwrap();
        assert_eq!(options.primary, "/tmp/app.log");
        assert_eq!(options.start_mode, StartMode::AtEnd);
        assert_eq!(options.read_bufsz, READ_BUFSZ_DEF);
        assert_eq!(options.poll_interval, POLL_INTERVAL_DEF);
    }

    #[test]
    fn test_cli_process_args_options() {
        let args = CLI_Args::parse_from([
            "rotail", "/tmp/app.log", "--from-start", "--cutoff", "100", "--separator", r"\r\n",
            "--encoding", "utf-16le", "--secondary", "/tmp/old.log",
        ]);
        let options = cli_process_args(&args).unwrap();
        assert_eq!(options.start_mode, StartMode::AtStart);
        assert_eq!(options.size_cutoff, 100);
        assert_eq!(options.separator, SeparatorSpec::Literal(String::from("\r\n")));
        assert_eq!(options.encoding.name(), "UTF-16LE");
        assert_eq!(options.secondary, Some(FPath::from("/tmp/old.log")));
    }

    #[test]
    fn test_cli_process_args_bad_encoding() {
        let args = CLI_Args::parse_from(["rotail", "/tmp/app.log", "--encoding", "no-such-encoding"]);
        assert!(cli_process_args(&args).is_err());
    }
}

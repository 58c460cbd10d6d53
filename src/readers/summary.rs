// src/readers/summary.rs

//! Implements `Summary` statistics tracking struct.

use crate::common::{Count, FPath, FPaths, HandleId};

use std::fmt;

/// Accumulated statistics of one tail session.
///
/// Returned by [`Tail::stop`]. For CLI option `--summary`.
///
/// [`Tail::stop`]: crate::readers::tailprocessor::Tail#method.stop
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// the primary file of the session
    pub path: FPath,
    /// files opened, in order opened; a reopened file is listed again
    pub paths_opened: FPaths,
    /// the last `HandleId` handed out, `0` if no file was opened
    pub handle_last: HandleId,
    /// `Count` of lines emitted
    pub count_lines: Count,
    /// `Count` of lines read but suppressed, e.g. before a resume offset
    pub count_lines_skipped: Count,
    /// `Count` of raw bytes read
    pub count_bytes: Count,
    /// `Count` of `restart` signals
    pub count_restarts: Count,
    /// `Count` of errors, observed or not
    pub count_errors: Count,
    /// `Count` of all signals sent
    pub count_signals: Count,
}

impl Summary {
    pub fn new(path: FPath) -> Summary {
        Summary {
            path,
            ..Default::default()
        }
    }

    pub fn count_files_opened(&self) -> Count {
        self.paths_opened.len() as Count
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "file            : {:?}", self.path)?;
        writeln!(f, "files opened    : {}", self.count_files_opened())?;
        for path in self.paths_opened.iter() {
            writeln!(f, "                  {:?}", path)?;
        }
        writeln!(f, "lines           : {}", self.count_lines)?;
        writeln!(f, "lines skipped   : {}", self.count_lines_skipped)?;
        writeln!(f, "bytes read      : {}", self.count_bytes)?;
        writeln!(f, "restarts        : {}", self.count_restarts)?;
        writeln!(f, "errors          : {}", self.count_errors)?;
        write!(f, "signals         : {}", self.count_signals)
    }
}

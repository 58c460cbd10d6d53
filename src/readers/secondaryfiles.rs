// src/readers/secondaryfiles.rs

//! Implements [`SecondaryFiles`], the enumeration of rotated predecessor
//! files of a primary file.
//!
//! For primary file `app.log` the predecessors are, newest first,
//! `app.log.1`, `app.log.2`, … followed by compressed predecessors
//! continuing the count, `app.log.3.gz`, `app.log.4.gz`, …

use crate::common::{Count, FPath};
use crate::readers::helpers::path_exists;

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// File name suffix of compressed predecessor files.
pub const COMPRESSED_SUFFIX: &str = ".gz";

/// One candidate predecessor file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SecondaryFile {
    pub path: FPath,
    pub is_compressed: bool,
}

impl SecondaryFile {
    /// A `SecondaryFile` at `path`; compression is derived from the file
    /// name suffix.
    pub fn from_path(path: FPath) -> SecondaryFile {
        let is_compressed: bool = path.ends_with(COMPRESSED_SUFFIX);
        SecondaryFile { path, is_compressed }
    }
}

impl fmt::Display for SecondaryFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Lazy iterator of [`SecondaryFile`] candidates, newest first.
///
/// Numbered files are probed while they exist. At the first missing number
/// the same number and the following are probed with [`COMPRESSED_SUFFIX`].
/// The first missing compressed file ends the iteration.
///
/// When nothing at all exists the iterator yields `{base}.1` once, so a
/// caller has a concrete path to report.
///
/// With an `override_path` the iterator yields exactly that path.
pub struct SecondaryFiles {
    base: FPath,
    override_path: Option<FPath>,
    number: usize,
    compressed: bool,
    yielded: Count,
    done: bool,
}

impl fmt::Debug for SecondaryFiles {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecondaryFiles")
            .field("base", &self.base)
            .field("override_path", &self.override_path)
            .field("number", &self.number)
            .field("compressed", &self.compressed)
            .field("done", &self.done)
            .finish()
    }
}

impl SecondaryFiles {
    pub fn new(base: &FPath, override_path: Option<&FPath>) -> SecondaryFiles {
        defñ!("({:?}, {:?})", base, override_path);
        SecondaryFiles {
            base: base.clone(),
            override_path: override_path.cloned(),
            number: 1,
            compressed: false,
            yielded: 0,
            done: false,
        }
    }

    fn candidate(&self) -> SecondaryFile {
        match self.compressed {
            false => SecondaryFile {
                path: format!("{}.{}", self.base, self.number),
                is_compressed: false,
            },
            true => SecondaryFile {
                path: format!("{}.{}{}", self.base, self.number, COMPRESSED_SUFFIX),
                is_compressed: true,
            },
        }
    }
}

impl Iterator for SecondaryFiles {
    type Item = SecondaryFile;

    fn next(&mut self) -> Option<SecondaryFile> {
        if self.done {
            return None;
        }
        if let Some(path) = self.override_path.take() {
            self.done = true;
            self.yielded += 1;
            defñ!("override {:?}", path);
            return Some(SecondaryFile::from_path(path));
        }
        loop {
            let candidate: SecondaryFile = self.candidate();
            if path_exists(&candidate.path) {
                self.number += 1;
                self.yielded += 1;
                defñ!("yield {:?}", candidate.path);
                return Some(candidate);
            }
            if !self.compressed {
                defo!("missing {:?}, probe compressed", candidate.path);
                self.compressed = true;
                continue;
            }
            self.done = true;
            if self.yielded == 0 {
                self.yielded += 1;
                let fallback = SecondaryFile {
                    path: format!("{}.1", self.base),
                    is_compressed: false,
                };
                defñ!("fallback {:?}", fallback.path);
                return Some(fallback);
            }
            defñ!("missing {:?}, done", candidate.path);
            return None;
        }
    }
}

/// The first secondary candidate of `primary`, the file `start` falls back
/// to when the primary is missing.
pub fn first_secondary(primary: &FPath, override_path: Option<&FPath>) -> SecondaryFile {
    match SecondaryFiles::new(primary, override_path).next() {
        Some(val) => val,
        // never happens; the iterator always yields once
        None => SecondaryFile {
            path: format!("{}.1", primary),
            is_compressed: false,
        },
    }
}

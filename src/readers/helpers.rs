// src/readers/helpers.rs

//! Miscellaneous helper functions for _Readers_.

use std;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::FPath;

/// Return the basename of an `FPath`.
pub fn basename(path: &FPath) -> FPath {
    match fpath_to_path(path).file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => FPath::new(),
    }
}

/// Return the directory of an `FPath`. A bare file name is in directory
/// `"."`.
pub fn dirname(path: &FPath) -> FPath {
    match fpath_to_path(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => path_to_fpath(parent),
        _ => FPath::from("."),
    }
}

/// Helper function for a slightly annoying set of calls.
pub fn path_to_fpath(path: &std::path::Path) -> FPath {
    // `PathBuf` to `String` https://stackoverflow.com/q/37388107/471376
    (*(path.to_string_lossy())).to_string()
}

/// Helper function for completeness.
pub fn fpath_to_path(path: &FPath) -> &std::path::Path {
    std::path::Path::new(path)
}

/// Does the path exist? Errors other than "not found" (e.g. permission
/// denied) mean the path exists.
pub fn path_exists(path: &FPath) -> bool {
    match std::fs::metadata(fpath_to_path(path)) {
        Ok(_) => true,
        Err(err) => err.kind() != std::io::ErrorKind::NotFound,
    }
}

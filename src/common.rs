// src/common.rs
//
// common imports, type aliases, and other globals (avoids circular imports)

use std::fmt;
pub use std::fs::File;
use std::io::{Error, ErrorKind};
pub use std::path::Path;
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file-handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// TODO: use `std::path::PathBuf` for `FPath`
/// `F`ake `Path` or `F`ile `Path`
pub type FPath = String;
pub type FPaths = Vec<FPath>;
pub type FileMetadata = std::fs::Metadata;
pub type FileOpenOptions = std::fs::OpenOptions;

/// Offset into a file in bytes
pub type FileOffset = u64;

/// File Size in bytes
pub type FileSz = u64;

/// Sequence of Bytes
pub type Bytes = Vec<u8>;

/// A general-purpose counting type, typically used for internal statistics.
pub type Count = u64;

/// Session-unique identifier of an opened file handle.
///
/// Every successful open receives the next value; a value is never reused
/// within a session, even after the handle is closed.
pub type HandleId = u64;

/// Platform _file identity token_.
///
/// Distinguishes "same path, same file" from "same path, different file"
/// across a rotation. On unix this is the device and inode number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct FileId {
    pub dev: u64,
    pub ino: u64,
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.dev, self.ino)
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        /// Derive the [`FileId`] of a file from it's metadata.
        pub fn file_id_from_metadata(metadata: &FileMetadata) -> FileId {
            use std::os::unix::fs::MetadataExt;

            FileId {
                dev: metadata.dev(),
                ino: metadata.ino(),
            }
        }
    } else if #[cfg(windows)] {
        /// Derive the [`FileId`] of a file from it's metadata.
        ///
        /// XXX: `MetadataExt::file_index` is not stable, the creation time is
        ///      the best available stand-in. File system tunneling gives a
        ///      file created under a recently renamed name the old creation
        ///      time, so a rename rotation keeps the same `FileId`. Such a
        ///      replacement is only noticed once the new file is smaller
        ///      than the bytes read, see
        ///      [`primary_replaced`](crate::readers::continuity::primary_replaced).
        pub fn file_id_from_metadata(metadata: &FileMetadata) -> FileId {
            use std::os::windows::fs::MetadataExt;

            FileId {
                dev: 0,
                ino: metadata.creation_time(),
            }
        }
    } else {
        /// Derive the [`FileId`] of a file from it's metadata.
        ///
        /// XXX: no identity available on this platform, every file looks
        ///      the same so replacement is only detected by size, see
        ///      [`primary_replaced`](crate::readers::continuity::primary_replaced).
        pub fn file_id_from_metadata(_metadata: &FileMetadata) -> FileId {
            FileId::default()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// custom Results enums for various *Reader functions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `Result` Extended
/// for reading functions
#[derive(Debug, PartialEq)]
pub enum ResultS3<T, E> {
    /// Contains the success data
    Found(T),
    /// End of file or other condition that means "Done", nothing to return, but no bad errors happened
    Done,
    /// Contains the error value, something bad happened
    Err(E),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Thread-safe [Atomic Reference Counting Pointer] to an [`Error`].
///
/// `Error` is not `Clone`. Signals may be observed after the emitting
/// thread has moved on, so they carry this.
///
/// [Atomic Reference Counting Pointer]: std::sync::Arc
pub type ErrorP = Arc<Error>;

/// Create a new `Error` with the same `ErrorKind` and the path appended to
/// the message.
pub fn err_from_err_path(error: &Error, fpath: &FPath, mesg: Option<&str>) -> Error {
    match mesg {
        Some(mesg_) => Error::new(error.kind(), format!("{} {} for file {:?}", error, mesg_, fpath)),
        None => Error::new(error.kind(), format!("{} for file {:?}", error, fpath)),
    }
}

/// Payload of an [`Error`] produced while searching for a start position.
///
/// Retrieve it from an `Error` with [`search_error`].
#[derive(Clone, Debug)]
pub struct SearchError {
    pub message: String,
    /// files searched, in the order searched
    pub files: FPaths,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.files.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}; searched {:?}", self.message, self.files)
        }
    }
}

impl std::error::Error for SearchError {}

impl SearchError {
    /// Wrap into an `Error` of `ErrorKind::NotFound`.
    pub fn into_error(self) -> Error {
        Error::new(ErrorKind::NotFound, self)
    }
}

/// Return the [`SearchError`] payload of `error`, if any.
pub fn search_error(error: &Error) -> Option<&SearchError> {
    error
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<SearchError>())
}

/// "Clone" an `Error`. The `ErrorKind` and message are preserved, a
/// [`SearchError`] payload is preserved.
pub fn clone_error(error: &Error) -> Error {
    match search_error(error) {
        Some(serr) => Error::new(error.kind(), serr.clone()),
        None => Error::new(error.kind(), error.to_string()),
    }
}

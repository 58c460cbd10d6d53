// src/readers/dirwatcher.rs

//! Implements a [`DirWatcher`], change notifications of the directory of
//! the primary file delivered into a channel.
//!
//! The directory is watched, not the file, so the creation of a new primary
//! file or a rename of the current file is also noticed.

use crate::common::{FPath, FPaths};
use crate::readers::helpers::{basename, dirname, fpath_to_path, path_to_fpath};

use std::fmt;
use std::io::{Error, ErrorKind, Result};

use ::crossbeam_channel;
use ::notify::{self, RecommendedWatcher, RecursiveMode, Watcher};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A notification from a [`DirWatcher`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WatchEvent {
    /// Entries of the directory changed; the base names of the changed
    /// entries.
    Changed(FPaths),
    /// The watcher reported an error.
    Error(String),
}

pub type ChanSendWatch = crossbeam_channel::Sender<WatchEvent>;
pub type ChanRecvWatch = crossbeam_channel::Receiver<WatchEvent>;

/// Watches one directory, non-recursively. Watching stops when dropped.
pub struct DirWatcher {
    _watcher: RecommendedWatcher,
    dir: FPath,
}

impl fmt::Debug for DirWatcher {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DirWatcher")
            .field("dir", &self.dir)
            .finish()
    }
}

fn notify_error(error: notify::Error, dir: &FPath) -> Error {
    let kind: ErrorKind = match &error.kind {
        notify::ErrorKind::Io(err) => err.kind(),
        notify::ErrorKind::PathNotFound => ErrorKind::NotFound,
        _ => ErrorKind::Other,
    };

    Error::new(kind, format!("watch of directory {:?} failed: {}", dir, error))
}

impl DirWatcher {
    /// Watch the directory of `primary`. Notifications are sent to the
    /// returned channel.
    pub fn new(primary: &FPath) -> Result<(DirWatcher, ChanRecvWatch)> {
        let dir: FPath = dirname(primary);
        defn!("({:?}) dir {:?}", primary, dir);
        let (chan_send, chan_recv): (ChanSendWatch, ChanRecvWatch) = crossbeam_channel::unbounded();
        let mut watcher: RecommendedWatcher =
            match notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                let event: WatchEvent = match result {
                    Ok(event) => WatchEvent::Changed(
                        event
                            .paths
                            .iter()
                            .map(|path| basename(&path_to_fpath(path)))
                            .collect(),
                    ),
                    Err(err) => WatchEvent::Error(err.to_string()),
                };
                // the receiver is gone when the session ended
                let _ = chan_send.send(event);
            }) {
                Ok(val) => val,
                Err(err) => {
                    defx!("recommended_watcher error {}", err);
                    return Err(notify_error(err, &dir));
                }
            };
        if let Err(err) = watcher.watch(fpath_to_path(&dir), RecursiveMode::NonRecursive) {
            defx!("watch error {}", err);
            return Err(notify_error(err, &dir));
        }
        defx!();

        Ok((DirWatcher { _watcher: watcher, dir }, chan_recv))
    }

    pub fn dir(&self) -> &FPath {
        &self.dir
    }
}

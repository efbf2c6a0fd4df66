use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use git2::Oid;
use thiserror::Error;

/// Why the sync status of a repository could not be determined.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to open repository: {0}")]
    Open(#[source] git2::Error),

    #[error("HEAD is detached")]
    DetachedHead,

    #[error("branch `{0}` has no upstream configured")]
    NoUpstream(String),

    #[error("could not resolve `{rev}`: {source}")]
    Resolve {
        rev: String,
        #[source]
        source: git2::Error,
    },

    #[error("{local} and {remote} share no history")]
    NoMergeBase { local: Oid, remote: Oid },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Failure refreshing remote-tracking refs. Never fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to start `git fetch`: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed waiting on `git fetch`: {0}")]
    Wait(#[source] io::Error),

    #[error("`git fetch` did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("`git fetch` exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

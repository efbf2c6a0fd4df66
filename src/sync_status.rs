//! Decides whether a repository's current branch has commits its upstream
//! does not.

use std::fmt;
use std::path::Path;

use git2::Oid;

use crate::config::IndeterminatePolicy;
use crate::error::CheckError;
use crate::git::GitBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncVerdict {
    /// Local and upstream tips are the same commit.
    UpToDate,
    /// Upstream is a strict ancestor of the local tip.
    Ahead,
    /// Local is a strict ancestor of upstream.
    Behind,
    /// Both sides have commits since their merge-base.
    Diverged,
}

impl SyncVerdict {
    /// Only `UpToDate` lets a repository be deleted.
    pub fn blocks_deletion(self) -> bool {
        !matches!(self, SyncVerdict::UpToDate)
    }
}

impl fmt::Display for SyncVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncVerdict::UpToDate => "up to date",
            SyncVerdict::Ahead => "ahead",
            SyncVerdict::Behind => "behind",
            SyncVerdict::Diverged => "diverged",
        };
        f.write_str(s)
    }
}

/// Compares the local tip, upstream tip and their merge-base.
///
/// The order matters: equal tips win over everything, then an upstream that
/// is the merge-base means local is ahead.
pub fn classify(local: Oid, remote: Oid, base: Oid) -> SyncVerdict {
    if local == remote {
        SyncVerdict::UpToDate
    } else if remote == base {
        SyncVerdict::Ahead
    } else if local == base {
        SyncVerdict::Behind
    } else {
        SyncVerdict::Diverged
    }
}

/// Refreshes remote-tracking refs, then compares the current branch with its
/// upstream.
///
/// A failed fetch is logged and the comparison runs against whatever tracking
/// refs are already on disk.
pub async fn check<B: GitBackend>(backend: &B, repo: &Path) -> Result<SyncVerdict, CheckError> {
    if let Err(e) = backend.fetch(repo).await {
        tracing::warn!(repo = %repo.display(), "fetch failed, using cached remote refs: {e}");
    }

    let branch = backend.current_branch(repo)?;
    let upstream = backend.upstream(repo, &branch)?;
    tracing::debug!(repo = %repo.display(), %branch, %upstream, "comparing with upstream");

    let local = backend.resolve(repo, &format!("refs/heads/{branch}"))?;
    let remote = backend.resolve(repo, &upstream)?;
    let base = backend.merge_base(repo, local, remote)?;

    Ok(classify(local, remote, base))
}

/// `true` when the repository must be kept.
///
/// Errors from [`check`] are resolved by `policy`: `TreatAsSynced` answers
/// `false`, so a detached HEAD or a branch without upstream counts as safe
/// to delete.
pub async fn has_unpushed_commits<B: GitBackend>(
    backend: &B,
    repo: &Path,
    policy: IndeterminatePolicy,
) -> bool {
    match check(backend, repo).await {
        Ok(verdict) => {
            tracing::info!(repo = %repo.display(), %verdict, "sync status");
            verdict.blocks_deletion()
        }
        Err(e) => {
            tracing::warn!(repo = %repo.display(), ?policy, "sync status unknown: {e}");
            match policy {
                IndeterminatePolicy::TreatAsSynced => false,
                IndeterminatePolicy::TreatAsUnpushed => true,
            }
        }
    }
}

//! The handful of git operations the sync check needs.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use git2::{BranchType, ErrorCode, Oid, Repository};
use tokio::process::Command;

use crate::error::{CheckError, FetchError};

pub trait GitBackend {
    /// Refresh the remote-tracking refs of the repository at `repo`.
    fn fetch(&self, repo: &Path) -> impl Future<Output = Result<(), FetchError>>;

    /// Short name of the branch HEAD points at.
    fn current_branch(&self, repo: &Path) -> Result<String, CheckError>;

    /// Full ref name of the upstream configured for `branch`,
    /// e.g. `refs/remotes/origin/main`.
    fn upstream(&self, repo: &Path, branch: &str) -> Result<String, CheckError>;

    /// Commit id that `rev` points at.
    fn resolve(&self, repo: &Path, rev: &str) -> Result<Oid, CheckError>;

    fn merge_base(&self, repo: &Path, a: Oid, b: Oid) -> Result<Oid, CheckError>;
}

/// Runs `git fetch` as a subprocess so the user's remotes, credential helpers
/// and ssh agent apply. Everything else is answered by libgit2.
#[derive(Debug, Clone)]
pub struct Git2Backend {
    fetch_timeout: Duration,
}

impl Git2Backend {
    pub fn new(fetch_timeout: Duration) -> Self {
        Self { fetch_timeout }
    }

    // `open`, not `discover`: a plain directory must never resolve to an
    // enclosing repository.
    fn open(repo: &Path) -> Result<Repository, CheckError> {
        Repository::open(repo).map_err(CheckError::Open)
    }
}

impl GitBackend for Git2Backend {
    async fn fetch(&self, repo: &Path) -> Result<(), FetchError> {
        tracing::debug!(repo = %repo.display(), "exec: git fetch");

        let child = Command::new("git")
            .arg("fetch")
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(FetchError::Spawn)?;

        // On timeout the child is dropped, and with it killed.
        let output = tokio::time::timeout(self.fetch_timeout, child.wait_with_output())
            .await
            .map_err(|_| FetchError::TimedOut(self.fetch_timeout))?
            .map_err(FetchError::Wait)?;

        if !output.status.success() {
            return Err(FetchError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn current_branch(&self, repo: &Path) -> Result<String, CheckError> {
        let repo = Self::open(repo)?;
        let head = repo.head().map_err(|source| CheckError::Resolve {
            rev: "HEAD".to_string(),
            source,
        })?;
        if !head.is_branch() {
            return Err(CheckError::DetachedHead);
        }
        head.shorthand()
            .map(str::to_owned)
            .ok_or_else(|| CheckError::Resolve {
                rev: "HEAD".to_string(),
                source: git2::Error::from_str("branch name is not valid UTF-8"),
            })
    }

    fn upstream(&self, repo: &Path, branch: &str) -> Result<String, CheckError> {
        let repo = Self::open(repo)?;
        let local = repo.find_branch(branch, BranchType::Local)?;
        let upstream = match local.upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(CheckError::NoUpstream(branch.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let name = upstream.get().name().map(str::to_owned);
        name.ok_or_else(|| CheckError::NoUpstream(branch.to_string()))
    }

    fn resolve(&self, repo: &Path, rev: &str) -> Result<Oid, CheckError> {
        let repo = Self::open(repo)?;
        let commit = repo
            .revparse_single(rev)
            .and_then(|object| object.peel_to_commit())
            .map_err(|source| CheckError::Resolve {
                rev: rev.to_string(),
                source,
            })?;
        Ok(commit.id())
    }

    fn merge_base(&self, repo: &Path, a: Oid, b: Oid) -> Result<Oid, CheckError> {
        let repo = Self::open(repo)?;
        match repo.merge_base(a, b) {
            Ok(base) => Ok(base),
            Err(e) if e.code() == ErrorCode::NotFound => Err(CheckError::NoMergeBase {
                local: a,
                remote: b,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

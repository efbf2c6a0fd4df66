use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::git::GitBackend;
use crate::repo_status::candidates;
use crate::sync_status::has_unpushed_commits;

/// What a sweep did to each repository it looked at.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Checks every repository directly under `root`, one at a time, and deletes
/// the ones with nothing left to push.
///
/// One line per repository goes to `out`. Directories that are not git
/// repositories are neither mentioned nor touched. The first deletion that
/// fails aborts the sweep.
pub async fn sweep<B, W>(root: &Path, backend: &B, config: &Config, out: &mut W) -> Result<SweepReport>
where
    B: GitBackend,
    W: Write,
{
    let mut report = SweepReport::default();

    for candidate in candidates(root)? {
        if !candidate.is_git_repo {
            tracing::trace!(path = %candidate.path.display(), "not a git repository");
            continue;
        }

        if has_unpushed_commits(backend, &candidate.path, config.on_indeterminate).await {
            writeln!(out, "{} has unpushed commits.", candidate.name)?;
            report.kept.push(candidate.path);
        } else {
            writeln!(out, "{} is up to date.", candidate.name)?;
            fs::remove_dir_all(&candidate.path)
                .with_context(|| format!("failed to delete {}", candidate.path.display()))?;
            tracing::info!(path = %candidate.path.display(), "deleted");
            report.deleted.push(candidate.path);
        }
    }

    tracing::info!(
        deleted = report.deleted.len(),
        kept = report.kept.len(),
        "sweep of {} finished",
        root.display()
    );
    Ok(report)
}

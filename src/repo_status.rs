// src/repo_status.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// An immediate child directory of the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCandidate {
    pub name: String,
    pub path: PathBuf,
    pub is_git_repo: bool,
}

impl RepoCandidate {
    pub fn new(name: String, path: PathBuf) -> Self {
        let is_git_repo = is_git_repo(&path);
        Self {
            name,
            path,
            is_git_repo,
        }
    }
}

/// A directory is a repository when it holds a `.git` metadata directory.
/// Worktrees and submodules, whose `.git` is a file, do not count.
pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").is_dir()
}

/// Lists the directories directly under `root`, sorted by name.
///
/// A symlink to a directory is listed under its own path, so deleting the
/// candidate removes the link and leaves the target alone. Files are skipped,
/// and nothing below depth 1 is visited.
pub fn candidates(root: &Path) -> Result<Vec<RepoCandidate>> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to list {}", root.display()))?;
        // `Path::is_dir` follows the link, `file_type` does not.
        if !entry.file_type().is_dir() && !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        found.push(RepoCandidate::new(name, entry.into_path()));
    }
    Ok(found)
}

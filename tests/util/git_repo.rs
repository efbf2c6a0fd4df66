use std::fs;
use std::path::{Path, PathBuf};

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

/// A bare repository standing in for `origin`.
pub struct Remote {
    pub dir: TempDir,
}

impl Remote {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Repository::init_bare(dir.path()).unwrap();
        Self { dir }
    }

    pub fn url(&self) -> String {
        self.dir.path().to_str().unwrap().to_string()
    }
}

/// A working repository on branch `main`.
pub struct GitRepo {
    pub path: PathBuf,
    pub repo: Repository,
    counter: u32,
}

impl GitRepo {
    pub fn init(path: &Path) -> Self {
        fs::create_dir_all(path).unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(path, &opts).unwrap();
        Self {
            path: path.to_path_buf(),
            repo,
            counter: 0,
        }
    }

    /// Commits a new file on top of HEAD.
    pub fn commit(&mut self) -> Oid {
        let parent = self.repo.head().ok().map(|h| h.peel_to_commit().unwrap().id());
        let parents: Vec<Oid> = parent.into_iter().collect();
        self.commit_onto(Some("HEAD"), &parents)
    }

    /// Commits a new file onto `reference` with the given parents, leaving
    /// HEAD alone unless `reference` is HEAD.
    pub fn commit_onto(&mut self, reference: Option<&str>, parents: &[Oid]) -> Oid {
        self.counter += 1;
        let file = format!("file-{}.txt", self.counter);
        fs::write(self.path.join(&file), format!("content {}\n", self.counter)).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(&file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parents: Vec<Commit> = parents.iter().map(|oid| self.find_commit(*oid)).collect();
        let parents: Vec<&Commit> = parents.iter().collect();
        self.repo
            .commit(reference, &sig, &sig, &format!("commit {}", self.counter), &tree, &parents)
            .unwrap()
    }

    pub fn add_origin(&self, remote: &Remote) {
        self.repo.remote("origin", &remote.url()).unwrap();
    }

    /// Makes `origin/main` the upstream of `main`.
    pub fn track_origin_main(&self) {
        let mut config = self.repo.config().unwrap();
        config.set_str("branch.main.remote", "origin").unwrap();
        config.set_str("branch.main.merge", "refs/heads/main").unwrap();
    }

    /// Pushes `src` to the remote's `main` and points `origin/main` at it, so
    /// the state matches what a later `git fetch` would produce.
    pub fn push_to_origin_main(&self, src: &str) {
        let mut origin = self.repo.find_remote("origin").unwrap();
        origin
            .push(&[format!("+{src}:refs/heads/main").as_str()], None)
            .unwrap();
        let oid = self.repo.revparse_single(src).unwrap().peel_to_commit().unwrap().id();
        self.repo
            .reference("refs/remotes/origin/main", oid, true, "test push")
            .unwrap();
    }

    /// Advances the remote's `main` by one commit the way another clone
    /// would: through an anonymous remote, so `origin/main` stays where it
    /// was until the next fetch.
    pub fn push_from_elsewhere(&mut self, remote: &Remote) -> Oid {
        let base = self.head_id();
        let theirs = self.commit_onto(Some("refs/heads/elsewhere"), &[base]);
        let mut anonymous = self.repo.remote_anonymous(&remote.url()).unwrap();
        anonymous
            .push(&["+refs/heads/elsewhere:refs/heads/main"], None)
            .unwrap();
        self.repo
            .find_reference("refs/heads/elsewhere")
            .unwrap()
            .delete()
            .unwrap();
        theirs
    }

    /// Points `origin` at a transport that never answers.
    pub fn hang_origin(&self) {
        let mut config = self.repo.config().unwrap();
        config.set_str("protocol.ext.allow", "always").unwrap();
        self.repo.remote_set_url("origin", "ext::sleep 120").unwrap();
    }

    pub fn tracking_id(&self) -> Oid {
        self.repo.refname_to_id("refs/remotes/origin/main").unwrap()
    }

    pub fn find_commit(&self, oid: Oid) -> Commit<'_> {
        self.repo.find_commit(oid).unwrap()
    }

    pub fn head_id(&self) -> Oid {
        self.repo.head().unwrap().peel_to_commit().unwrap().id()
    }
}

/// One commit, pushed, tracking `origin/main`.
pub fn up_to_date(path: &Path, remote: &Remote) -> GitRepo {
    let mut repo = GitRepo::init(path);
    repo.commit();
    repo.add_origin(remote);
    repo.push_to_origin_main("refs/heads/main");
    repo.track_origin_main();
    repo
}

/// Like [`up_to_date`] plus one local commit that was never pushed.
pub fn ahead(path: &Path, remote: &Remote) -> GitRepo {
    let mut repo = up_to_date(path, remote);
    repo.commit();
    repo
}

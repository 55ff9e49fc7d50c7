use std::fs;
use std::path::Path;

use git2::{Commit, Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// 2016-01-02T03:04:05Z
pub(crate) const JANUARY: i64 = 1_451_703_845;
/// 2016-02-03T04:05:06Z
pub(crate) const FEBRUARY: i64 = 1_454_472_306;
/// 2016-03-04T05:06:07Z
pub(crate) const MARCH: i64 = 1_457_067_967;

/// A throwaway git repository with commits at fixed author times.
pub(crate) struct TestRepo {
    dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Expected a temporary directory.");
        let repo = Repository::init(dir.path()).expect("Expected git init to succeed.");
        TestRepo { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Expected parent directories.");
        }
        fs::write(path, content).expect("Expected file write to succeed.");
    }

    /// Writes `files` and commits them on HEAD, authored at `seconds` in `offset_minutes`.
    pub fn commit<S: AsRef<str>>(
        &self,
        files: &[(&str, S)],
        seconds: i64,
        offset_minutes: i32,
    ) -> Oid {
        let parents: Vec<Oid> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .into_iter()
            .collect();

        self.commit_with_parents(Some("HEAD"), files, &parents, seconds, offset_minutes)
    }

    /// Writes `files` and commits the whole index on top of `parents`.
    ///
    /// With `reference` set to `None` the commit is left dangling, which is
    /// how side branches of a merge are built.
    pub fn commit_with_parents<S: AsRef<str>>(
        &self,
        reference: Option<&str>,
        files: &[(&str, S)],
        parents: &[Oid],
        seconds: i64,
        offset_minutes: i32,
    ) -> Oid {
        for (name, content) in files {
            self.write(name, content.as_ref());
        }
        let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();

        self.commit_paths(reference, &names, parents, seconds, offset_minutes)
    }

    /// Stages paths already present in the work tree, symlinks included, and commits them.
    pub fn commit_paths(
        &self,
        reference: Option<&str>,
        names: &[&str],
        parents: &[Oid],
        seconds: i64,
        offset_minutes: i32,
    ) -> Oid {
        let mut index = self.repo.index().expect("Expected an index.");
        for name in names {
            index
                .add_path(Path::new(name))
                .expect("Expected file to be staged.");
        }
        index.write().expect("Expected index write to succeed.");

        let tree_id = index.write_tree().expect("Expected tree write to succeed.");
        let tree = self.repo.find_tree(tree_id).expect("Expected written tree.");
        let signature = Signature::new(
            "Test Author",
            "author@example.com",
            &Time::new(seconds, offset_minutes),
        )
        .expect("Expected a valid signature.");

        let parents: Vec<Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("Expected parent commit."))
            .collect();
        let parents: Vec<&Commit> = parents.iter().collect();

        self.repo
            .commit(reference, &signature, &signature, "update", &tree, &parents)
            .expect("Expected commit to succeed.")
    }
}

/// Builds a small HTML page.
pub(crate) fn page(title: &str, keywords: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title>\
         <meta name=\"keywords\" content=\"{keywords}\"></head>\
         <body>{body}</body></html>"
    )
}

//! The history module reads creation and modification times of a document
//! from the git history of the repository it lives in.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset};
use git2::{Commit, ErrorCode, Oid, Repository, Sort};
use log::debug;

/// Author times of the first and last commits touching a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History {
    pub created: DateTime<FixedOffset>,
    pub modified: DateTime<FixedOffset>,
}

/// Opens the repository containing `dir`, searching parent directories.
///
/// # Errors
///
/// Returns an error if neither `dir` nor any of its parents is inside a repository.
pub fn open_repository(dir: &Path) -> Result<Repository> {
    Repository::discover(dir)
        .with_context(|| format!("no repository found for directory: {}", dir.display()))
}

/// Resolves a document path, absolute or relative to `base_dir`, to its
/// path inside the repository work tree.
///
/// Only the parent directory is canonicalized, so a tracked symlink keeps
/// its own path instead of resolving to its target.
///
/// # Errors
///
/// Returns an error if:
/// * The repository is bare
/// * The path does not exist
/// * The path lies outside the work tree
pub fn relative_path(repo: &Repository, base_dir: &Path, path: &Path) -> Result<PathBuf> {
    let workdir = repo
        .workdir()
        .ok_or_else(|| anyhow!("repository {} has no work tree", repo.path().display()))?
        .canonicalize()
        .context("Unable to resolve repository work tree")?;

    let joined = base_dir.join(path);
    let (Some(parent), Some(file_name)) = (joined.parent(), joined.file_name()) else {
        bail!("{} does not name a file", path.display());
    };
    let absolute = parent
        .canonicalize()
        .with_context(|| format!("Unable to resolve {}", path.display()))?
        .join(file_name);
    absolute
        .symlink_metadata()
        .with_context(|| format!("Unable to resolve {}", path.display()))?;

    absolute
        .strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| {
            anyhow!(
                "{} is outside the work tree {}",
                absolute.display(),
                workdir.display()
            )
        })
}

/// Looks up the first and last commits touching `path` and returns their author times.
///
/// `path` must be relative to the work tree, see [`relative_path`].
///
/// # Errors
///
/// Returns an error if the history cannot be walked or no commit touches `path`.
pub fn history(repo: &Repository, path: &Path) -> Result<History> {
    let first = first_commit(repo, path)?;
    let last = last_commit(repo, path)?;

    Ok(History {
        created: author_time(&first)?,
        modified: author_time(&last)?,
    })
}

/// Returns the oldest commit reachable from HEAD that touches `path`.
///
/// # Errors
///
/// Returns an error if the history cannot be walked or no commit touches `path`.
pub fn first_commit<'r>(repo: &'r Repository, path: &Path) -> Result<Commit<'r>> {
    find_touching_commit(repo, path, Sort::TIME | Sort::REVERSE)
}

/// Returns the newest commit reachable from HEAD that touches `path`.
///
/// # Errors
///
/// Returns an error if the history cannot be walked or no commit touches `path`.
pub fn last_commit<'r>(repo: &'r Repository, path: &Path) -> Result<Commit<'r>> {
    find_touching_commit(repo, path, Sort::TIME)
}

fn find_touching_commit<'r>(repo: &'r Repository, path: &Path, sorting: Sort) -> Result<Commit<'r>> {
    let mut walk = repo.revwalk()?;
    walk.set_sorting(sorting)?;
    walk.push_head().context("Unable to read HEAD")?;

    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        if touches(&commit, path)? {
            debug!("Commit {} touches {}", commit.id(), path.display());
            return Ok(commit);
        }
    }

    bail!("no commit for path: {}", path.display())
}

/// Checks whether `commit` adds or changes `path`.
///
/// A merge only counts when the path differs from every parent, the way
/// `git log -- <path>` simplifies history.
///
/// # Errors
///
/// Returns an error if a commit tree cannot be read.
pub fn touches(commit: &Commit, path: &Path) -> Result<bool> {
    let Some(blob) = blob_at(commit, path)? else {
        return Ok(false);
    };

    for parent in commit.parents() {
        if blob_at(&parent, path)? == Some(blob) {
            return Ok(false);
        }
    }

    Ok(true)
}

fn blob_at(commit: &Commit, path: &Path) -> Result<Option<Oid>> {
    match commit.tree()?.get_path(path) {
        Ok(entry) => Ok(Some(entry.id())),
        Err(error) if error.code() == ErrorCode::NotFound => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Converts the author time of `commit`, keeping the author's UTC offset.
///
/// # Errors
///
/// Returns an error if the stored time or offset is out of range.
pub fn author_time(commit: &Commit) -> Result<DateTime<FixedOffset>> {
    let when = commit.author().when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .ok_or_else(|| anyhow!("Invalid UTC offset in commit {}", commit.id()))?;

    DateTime::from_timestamp(when.seconds(), 0)
        .map(|time| time.with_timezone(&offset))
        .ok_or_else(|| anyhow!("Invalid author time in commit {}", commit.id()))
}

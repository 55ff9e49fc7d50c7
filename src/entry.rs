//! The entry module builds one feed entry per HTML document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::Repository;
use log::debug;

use crate::extract::{Document, decode_document, extract_document};
use crate::history::{History, history, relative_path};

/// A single HTML document with its metadata and git timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The document path exactly as it was passed in.
    pub path: String,
    /// Author time of the first commit touching the document.
    pub created: DateTime<FixedOffset>,
    /// Author time of the last commit touching the document.
    pub modified: DateTime<FixedOffset>,
    pub title: String,
    pub tags: Vec<String>,
    /// HTML fragment, written out verbatim inside CDATA.
    pub summary: String,
}

impl Entry {
    pub fn new(path: impl Into<String>, history: History, document: Document) -> Self {
        Self {
            path: path.into(),
            created: history.created,
            modified: history.modified,
            title: document.title,
            tags: document.tags,
            summary: document.summary,
        }
    }

    /// Whether any of the entry's tags equals `tag` exactly.
    pub fn tagged(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Creates an entry for the document at `path`, resolved against `base_dir`.
///
/// History is looked up first, so untracked documents are rejected before
/// they are read.
///
/// # Arguments
///
/// * `repo` - Repository the document is tracked in
/// * `base_dir` - Directory relative paths are resolved against
/// * `path` - Document path, kept verbatim in the entry
///
/// # Errors
///
/// Returns an error if:
/// * The document lies outside the repository work tree
/// * No commit touches the document
/// * The document cannot be read
pub fn create_entry(repo: &Repository, base_dir: &Path, path: &str) -> Result<Entry> {
    let relative = relative_path(repo, base_dir, Path::new(path))?;
    debug!("Looking up history of {}", relative.display());
    let history = history(repo, &relative)?;

    let bytes = fs::read(base_dir.join(path)).with_context(|| format!("Unable to read {path}"))?;
    let document = extract_document(&decode_document(&bytes));

    Ok(Entry::new(path, history, document))
}

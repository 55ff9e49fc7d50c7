//! The feed module collects entries, applies the tag filter and writes the
//! collection out as a single XML document.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use git2::Repository;
use log::{debug, info, warn};
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

use crate::constants::XML_INDENT_SIZE;
use crate::entry::{Entry, create_entry};
use crate::history::open_repository;

/// An ordered collection of entries with an optional tag filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    tag: Option<String>,
    entries: Vec<Entry>,
}

impl Feed {
    /// Creates an empty feed. An empty `tag` is the same as no filter.
    pub fn new(tag: Option<String>) -> Self {
        Self {
            tag: tag.filter(|tag| !tag.is_empty()),
            entries: Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether `entry` passes the tag filter.
    pub fn admits(&self, entry: &Entry) -> bool {
        self.tag.as_deref().is_none_or(|tag| entry.tagged(tag))
    }

    /// Appends `entry` if it passes the tag filter, returning whether it was kept.
    pub fn push(&mut self, entry: Entry) -> bool {
        if !self.admits(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Serializes the feed into an indented XML string.
    ///
    /// # Errors
    ///
    /// Returns an error if XML writing fails
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_xml(&mut buffer)?;
        String::from_utf8(buffer).context("Serialized feed is not valid UTF-8")
    }

    /// Writes the feed as XML to `out`. No declaration is emitted.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails
    pub fn write_xml<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(out, b' ', XML_INDENT_SIZE);

        let mut root = BytesStart::new("entries");
        if let Some(tag) = &self.tag {
            root.push_attribute(("tag", tag.as_str()));
        }
        writer.write_event(Event::Start(root))?;
        for entry in &self.entries {
            write_entry(&mut writer, entry)?;
        }
        writer.write_event(Event::End(BytesEnd::new("entries")))?;

        Ok(())
    }
}

fn write_entry<W: Write>(writer: &mut Writer<W>, entry: &Entry) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("entry")))?;

    write_text_element(writer, "path", &entry.path)?;
    write_text_element(writer, "ctime", &format_time(&entry.created))?;
    write_text_element(writer, "mtime", &format_time(&entry.modified))?;
    write_text_element(writer, "title", &entry.title)?;

    writer.write_event(Event::Start(BytesStart::new("tags")))?;
    for tag in &entry.tags {
        write_text_element(writer, "tag", tag)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tags")))?;

    writer.write_event(Event::Start(BytesStart::new("summary")))?;
    if entry.summary.is_empty() {
        writer.write_event(Event::Text(BytesText::new("")))?;
    } else {
        for section in cdata_sections(&entry.summary) {
            writer.write_event(Event::CData(BytesCData::new(section)))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("summary")))?;

    writer.write_event(Event::End(BytesEnd::new("entry")))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Formats a timestamp as RFC 3339, using `Z` for a zero offset.
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Splits `content` into CDATA section bodies so that no `]]>` ends a section early.
///
/// Each `]]>` is cut between `]]` and `>`; concatenating the sections gives
/// back `content`.
pub fn cdata_sections(content: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut rest = content;
    let mut prefix = "";

    while let Some((head, tail)) = rest.split_once("]]>") {
        sections.push(format!("{prefix}{head}]]"));
        rest = tail;
        prefix = ">";
    }
    sections.push(format!("{prefix}{rest}"));

    sections
}

/// Creates entries for `paths` in order and collects those passing the tag filter.
///
/// Documents that fail are logged and skipped.
pub fn build_feed(repo: &Repository, base_dir: &Path, paths: &[String], tag: Option<String>) -> Feed {
    let mut feed = Feed::new(tag);

    for path in paths {
        info!("Creating entry for {path}");
        let entry = match create_entry(repo, base_dir, path) {
            Ok(entry) => entry,
            Err(error) => {
                warn!("Unable to create entry {path}: {error:#}");
                continue;
            }
        };

        if !feed.push(entry) {
            debug!("Skipping {path}: not tagged {}", feed.tag().unwrap_or_default());
        }
    }

    feed
}

/// Composes the XML feed for `paths` and writes it to `output_path`,
/// or to standard output when no path is given.
///
/// # Arguments
///
/// * `base_dir` - Directory the repository is discovered from and documents are resolved against
/// * `paths` - Documents to include, in output order
/// * `tag` - Only include entries with this tag
/// * `output_path` - File to write, created or truncated
///
/// # Errors
///
/// Returns an error if:
/// * No repository contains `base_dir`
/// * Writing the output fails
pub fn compose(
    base_dir: &Path,
    paths: &[String],
    tag: Option<String>,
    output_path: Option<&Path>,
) -> Result<()> {
    let repo = open_repository(base_dir)?;
    let feed = build_feed(&repo, base_dir, paths, tag);

    let mut xml = feed.to_xml()?;
    xml.push('\n');

    match output_path {
        Some(output_path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(output_path)
                .with_context(|| format!("Unable to open {}", output_path.display()))?;
            file.write_all(xml.as_bytes())?;
        }
        None => io::stdout().lock().write_all(xml.as_bytes())?,
    }

    info!("Composed {} of {} entries", feed.entries().len(), paths.len());
    Ok(())
}

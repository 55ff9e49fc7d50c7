//! xentries is a CLI tool that collects HTML documents into an XML feed
//! for syndication post-processing.
//!
//! Every document must be tracked in a git repository: its creation and
//! modification times are the author times of the first and last commits
//! touching it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use xentries::{compose, constants::DIRECTORY_ENV_NAME};

/// XMLifies HTML documents for syndication feed post-processing
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTML documents to include, in output order
    #[arg(required = true)]
    documents: Vec<String>,

    /// Only include entries with this tag
    #[arg(long, short)]
    tag: Option<String>,

    /// Run as if started in this directory
    #[arg(long = "directory", short = 'C', env = DIRECTORY_ENV_NAME)]
    directory: Option<PathBuf>,

    /// Write the feed to this file instead of standard output
    #[arg(long, short)]
    output: Option<PathBuf>,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: warn (0), info (1), debug (2), trace (3)")]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let base_dir = match cli.directory {
        Some(directory) => directory,
        None => std::env::current_dir().context("Unable to read current directory")?,
    };

    compose(&base_dir, &cli.documents, cli.tag, cli.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectral::prelude::*;

    #[test]
    fn documents_are_required() {
        assert_that(&Cli::try_parse_from(["xentries", "-t", "rust"]).is_err()).is_true();
    }

    #[test]
    fn flags_are_parsed() {
        let cli = Cli::try_parse_from([
            "xentries", "-t", "rust", "-C", "/srv/site", "-o", "feed.xml", "-vv", "a.html",
            "b.html",
        ])
        .expect("Expected arguments to parse.");

        assert_that(&cli.documents).is_equal_to(vec!["a.html".to_owned(), "b.html".to_owned()]);
        assert_that(&cli.tag).is_equal_to(Some("rust".to_owned()));
        assert_that(&cli.directory).is_equal_to(Some(PathBuf::from("/srv/site")));
        assert_that(&cli.output).is_equal_to(Some(PathBuf::from("feed.xml")));
        assert_that(&cli.verbose).is_equal_to(2);
    }

    #[test]
    fn directory_falls_back_to_environment() {
        // SAFETY: no other test in this binary reads DIRECTORY_ENV_NAME without passing -C.
        unsafe { std::env::set_var(DIRECTORY_ENV_NAME, "/srv/from-env") };
        let from_env = Cli::try_parse_from(["xentries", "a.html"]);
        let from_flag = Cli::try_parse_from(["xentries", "-C", "/srv/flag", "a.html"]);
        unsafe { std::env::remove_var(DIRECTORY_ENV_NAME) };

        let from_env = from_env.expect("Expected arguments to parse.");
        let from_flag = from_flag.expect("Expected arguments to parse.");
        assert_that(&from_env.directory).is_equal_to(Some(PathBuf::from("/srv/from-env")));
        assert_that(&from_flag.directory).is_equal_to(Some(PathBuf::from("/srv/flag")));
    }
}

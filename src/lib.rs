//! The xentries library turns HTML documents tracked in a git repository
//! into a single XML feed of entries, with titles, tags and summaries taken
//! from the markup and timestamps taken from the history.

pub mod constants;
pub mod entry;
pub mod extract;
pub mod feed;
pub mod history;

pub use entry::{Entry, create_entry};
pub use extract::{Document, extract_document};
pub use feed::{Feed, build_feed, compose};
pub use history::{History, open_repository};

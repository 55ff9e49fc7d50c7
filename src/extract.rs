//! The extract module pulls entry metadata out of an HTML document:
//! its title, its keyword tags and a summary built from the body.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::constants::{
    BODY_SELECTOR, CHARSET_DECLARATION, CHARSET_SNIFF_LIMIT, KEYWORDS_ATTRIBUTE,
    KEYWORDS_SELECTOR, SUMMARY_BLACKLIST, TAG_SEPARATOR, TITLE_SELECTOR,
};

static CHARSET_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(CHARSET_DECLARATION).expect("Failed to compile CHARSET_DECLARATION regex")
});

static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(TITLE_SELECTOR).expect("Failed to parse TITLE_SELECTOR"));
static KEYWORDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(KEYWORDS_SELECTOR).expect("Failed to parse KEYWORDS_SELECTOR"));
static BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(BODY_SELECTOR).expect("Failed to parse BODY_SELECTOR"));

/// Metadata extracted from a single HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Text of the first `<title>`, empty if there is none.
    pub title: String,
    /// Comma separated keywords, trimmed. Never empty: a document
    /// without keywords yields a single empty tag.
    pub tags: Vec<String>,
    /// Outer HTML of the body's child elements, concatenated.
    pub summary: String,
}

/// Decodes raw document bytes using the charset the document declares.
///
/// A byte order mark wins over the declaration. Documents without a usable
/// declaration are read as UTF-8, with invalid sequences replaced.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let encoding = declared_encoding(bytes).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(bytes);
    text
}

/// Returns the encoding named by a `<meta>` charset declaration near the start of `bytes`.
///
/// UTF-16 labels map to UTF-8: a document that can declare its charset in
/// ASCII is not UTF-16.
pub fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = bytes.get(..CHARSET_SNIFF_LIMIT).unwrap_or(bytes);
    let label = CHARSET_REGEX.captures(head)?.get(1)?;

    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

/// Parses `html` and extracts title, tags and summary from it.
///
/// HTML parsing is lenient, so this never fails: missing parts come back empty.
pub fn extract_document(html: &str) -> Document {
    let document = Html::parse_document(html);

    Document {
        title: find_title(&document),
        tags: find_tags(&document),
        summary: find_summary(&document),
    }
}

/// Returns the text content of the first `<title>` element.
pub fn find_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|title| title.text().collect())
        .unwrap_or_default()
}

/// Returns the keywords of the document's `<meta name="keywords">` element.
pub fn find_tags(document: &Html) -> Vec<String> {
    let keywords = document
        .select(&KEYWORDS)
        .next()
        .and_then(|meta| meta.value().attr(KEYWORDS_ATTRIBUTE))
        .unwrap_or_default();

    split_tags(keywords)
}

/// Splits a keyword list on commas and trims every tag.
pub fn split_tags(keywords: &str) -> Vec<String> {
    keywords
        .split(TAG_SEPARATOR)
        .map(|tag| tag.trim().to_string())
        .collect()
}

/// Builds a summary from the direct child elements of `<body>`.
///
/// Text nodes and comments are dropped, as are headings and page chrome
/// such as `h1`, `address` and `footer`.
pub fn find_summary(document: &Html) -> String {
    let Some(body) = document.select(&BODY).next() else {
        return String::new();
    };

    body.children()
        .filter_map(ElementRef::wrap)
        .filter(|element| !is_blacklisted(element))
        .map(|element| element.html())
        .collect()
}

fn is_blacklisted(element: &ElementRef) -> bool {
    SUMMARY_BLACKLIST.contains(&element.value().name())
}

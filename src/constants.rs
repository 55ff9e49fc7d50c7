pub const DIRECTORY_ENV_NAME: &str = "XENTRIES_DIRECTORY";

pub(crate) const TITLE_SELECTOR: &str = "title";
pub(crate) const KEYWORDS_SELECTOR: &str = r#"head > meta[name="keywords"]"#;
pub(crate) const BODY_SELECTOR: &str = "body";

pub(crate) const KEYWORDS_ATTRIBUTE: &str = "content";
pub(crate) const TAG_SEPARATOR: char = ',';

/// Body children never carried into a summary.
pub(crate) const SUMMARY_BLACKLIST: [&str; 3] = ["h1", "address", "footer"];

pub(crate) const XML_INDENT_SIZE: usize = 2;

/// Charset declared by `<meta charset>` or `<meta http-equiv content>`.
pub(crate) const CHARSET_DECLARATION: &str =
    r#"(?i)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#;
/// Browsers only look for a charset declaration this far into a document.
pub(crate) const CHARSET_SNIFF_LIMIT: usize = 1024;

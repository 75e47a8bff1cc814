use std::fmt::Display;

use serde::Serialize;

/// Normalized Wiktionary page title.
///
/// Dedicated translation subpages are merged with their root article:
///
/// ```
/// use yue_wiktparser::wm::Title;
///
/// let root = Title::from_line("    <title>far</title>").unwrap();
/// let subpage = Title::from_line("    <title>far/translations</title>").unwrap();
/// let title = Title::from_title("far").unwrap();
/// assert_eq!(root, subpage);
/// assert_eq!(root, title);
/// assert_eq!("far", root.as_str());
///
/// let escaped = Title::from_line("<title>AT&amp;T</title>").unwrap();
/// assert_eq!("AT&T", escaped.as_str());
///
/// assert!(Title::from_line("<title>  </title>").is_err());
/// assert!(Title::from_line("<title>/translations</title>").is_err());
/// ```
#[derive(Debug, Clone, PartialOrd, Ord, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Title(String);

impl Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Title {
    pub const OPEN: &'static str = "<title>";
    pub const CLOSE: &'static str = "</title>";
    pub const TRANSLATIONS_SUFFIX: &'static str = "/translations";

    /// Parse the title out of a dump line containing `<title>...</title>`.
    ///
    /// A missing closing tag takes the rest of the line.
    pub fn from_line(line: &str) -> Result<Self, ParseTitleError> {
        let start = line.find(Self::OPEN).map_or(0, |i| i + Self::OPEN.len());
        let rest = &line[start..];
        let title = rest.find(Self::CLOSE).map_or(rest, |end| &rest[..end]);
        Self::from_title(&html_escape::decode_html_entities(title))
    }

    pub fn from_title(title: &str) -> Result<Self, ParseTitleError> {
        let title = title.trim();
        let title = title
            .strip_suffix(Self::TRANSLATIONS_SUFFIX)
            .unwrap_or(title)
            .trim_end();
        if title.is_empty() {
            return Err(ParseTitleError);
        }
        Ok(Self(title.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("title cannot be empty or whitespace")]
pub struct ParseTitleError;

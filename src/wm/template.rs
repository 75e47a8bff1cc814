//! Template tokenizing and decoding for translation lists.
//!
//! Templates are matched lazily from `{{` to the nearest `}}`, so nested
//! templates are not supported.
use std::{borrow::Cow, collections::BTreeMap};

use once_cell::sync::Lazy;
use regex::Regex;

use super::Translation;

/// Template names that produce a [Translation].
pub const TERM_TAGS: [&str; 5] = ["t", "t+", "t-simple", "tt", "tt+"];

pub const QUALIFIER_TAG: &str = "qualifier";

static TEMPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty template")]
    Empty,
    #[error("unsupported template {0:?}")]
    UnknownTag(String),
    #[error("positional argument {0:?} after keyword arguments")]
    PositionalAfterKeyword(String),
    #[error("expected language and translation, found {0} positional arguments")]
    MissingPositional(usize),
    #[error("{0} is empty")]
    EmptyArgument(&'static str),
}

/// A template found on a line, split on `|`.
#[derive(Debug, PartialEq, Eq)]
pub enum Template<'a> {
    /// `{{qualifier|...}}`, with any remaining arguments rejoined.
    Qualifier(String),
    Other(Vec<&'a str>),
}

/// Find all templates in `line`, from left to right.
///
/// ```
/// use yue_wiktparser::wm::template::{scan_line, Template};
///
/// let line = "*: Cantonese: {{qualifier|colloquial}} {{t+|yue|遠|tr=jyun5}}";
/// let templates: Vec<_> = scan_line(line).collect();
/// assert_eq!(
///     vec![
///         Template::Qualifier("colloquial".into()),
///         Template::Other(vec!["t+", "yue", "遠", "tr=jyun5"]),
///     ],
///     templates
/// );
/// ```
pub fn scan_line(line: &str) -> impl Iterator<Item = Template<'_>> {
    TEMPLATE.captures_iter(line).map(|captures| {
        let inner = captures.get(1).map_or("", |m| m.as_str());
        let args: Vec<_> = inner.split('|').collect();
        match args.as_slice() {
            [QUALIFIER_TAG, qualifier @ ..] if !qualifier.is_empty() => {
                Template::Qualifier(qualifier.join("|"))
            }
            _ => Template::Other(args),
        }
    })
}

/// Template arguments separated into positional and keyword arguments.
///
/// Each argument has its html entities decoded. All positional arguments must
/// come before any keyword argument.
///
/// ```
/// use yue_wiktparser::wm::template::Arguments;
///
/// let args = Arguments::parse(["yue", "&#36960;", "tr=jyun5", "lit=a=b"]).unwrap();
/// assert_eq!(vec!["yue", "遠"], args.positional);
/// assert_eq!(Some("jyun5"), args.keyword.get("tr").map(String::as_str));
/// assert_eq!(Some("a=b"), args.keyword.get("lit").map(String::as_str));
///
/// assert!(Arguments::parse(["yue", "tr=jyun5", "遠"]).is_err());
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Arguments {
    pub positional: Vec<String>,
    pub keyword: BTreeMap<String, String>,
}

impl Arguments {
    pub fn parse<'a>(args: impl IntoIterator<Item = &'a str>) -> Result<Self, DecodeError> {
        let mut parsed = Self::default();
        for arg in args {
            let arg = html_escape::decode_html_entities(arg);
            match arg.split_once('=') {
                Some((key, value)) => {
                    parsed.keyword.insert(key.to_owned(), value.to_owned());
                }
                None if parsed.keyword.is_empty() => parsed.positional.push(arg.into_owned()),
                None => return Err(DecodeError::PositionalAfterKeyword(arg.into_owned())),
            }
        }
        Ok(parsed)
    }
}

/// Decode the arguments of a translation template, e.g. `["t", "yue", "遠", "tr=jyun5"]`.
pub fn decode_term(args: &[&str]) -> Result<Translation, DecodeError> {
    let (tag, args) = args.split_first().ok_or(DecodeError::Empty)?;
    if !TERM_TAGS.contains(tag) {
        return Err(DecodeError::UnknownTag(tag.to_string()));
    }

    let Arguments {
        positional,
        mut keyword,
    } = Arguments::parse(args.iter().copied())?;

    let [language_code, translation, rest @ ..] = positional.as_slice() else {
        return Err(DecodeError::MissingPositional(positional.len()));
    };

    // Phrases link each word separately instead of being a single term.
    let is_equivalent_term = !(translation.contains("[[") && translation.contains("]]"));

    let language_code = strip_links(language_code);
    if language_code.is_empty() {
        return Err(DecodeError::EmptyArgument("language code"));
    }
    let translation = strip_links(translation);
    if translation.is_empty() {
        return Err(DecodeError::EmptyArgument("translation"));
    }

    let mut take = |key: &str| keyword.remove(key).map(|v| strip_links(&v).into_owned());

    Ok(Translation {
        language_code: language_code.into_owned(),
        translation: translation.into_owned(),
        is_equivalent_term,
        script_code: take("sc"),
        transliteration: take("tr"),
        alternate_form: take("alt"),
        literal_translation: take("lit"),
        gender: take("g").or_else(|| rest.first().map(|g| strip_links(g).into_owned())),
        qualifier: None,
    })
}

/// Extract the sense description from the arguments of a `{{trans-top|...}}` template.
///
/// `header` starts after the opening braces. A trailing `}}` is ignored.
///
/// ```
/// use yue_wiktparser::wm::template::block_meaning;
///
/// assert_eq!("distant", block_meaning("trans-top|id=Q1|distant}}"));
/// assert_eq!("distant", block_meaning("trans-top|distant}}"));
/// assert_eq!("", block_meaning("trans-top}}"));
/// assert_eq!("", block_meaning("trans-top|id=Q1}}"));
/// ```
pub fn block_meaning(header: &str) -> String {
    let header = header.trim_end();
    let header = header.strip_suffix("}}").unwrap_or(header);
    let mut args = header
        .split('|')
        .skip(1)
        .map(|arg| html_escape::decode_html_entities(arg));

    let meaning = match args.next() {
        Some(id) if id.starts_with("id=") => args.next(),
        first => first,
    };
    meaning.map(Cow::into_owned).unwrap_or_default()
}

/// Remove `[[` and `]]` link markup, keeping the link text.
///
/// Removing one token can join the brackets around it into another (`[]][` → `[[`),
/// so this repeats until none are left.
fn strip_links(s: &str) -> Cow<str> {
    let mut s = Cow::Borrowed(s);
    while s.contains("[[") || s.contains("]]") {
        s = Cow::Owned(s.replace("[[", "").replace("]]", ""));
    }
    s
}

//! Line-based extraction of translation blocks from a Wiktionary XML dump.
//!
//! The dump is not parsed as XML or wikitext. Each line is checked for the
//! page title and the `{{trans-top}}`/`{{trans-bottom}}` markers that delimit
//! a translation block, and only lines inside a block are tokenized.
use std::{io::BufRead, mem};

use anyhow::Context;

use crate::{
    config::{Config, MissingReading, QualifierScope},
    sink::RecordSink,
    wm::{
        template::{self, Template},
        DecodeError, Page, Title, Translation, TranslationGroup,
    },
    ReadingIndex,
};

pub const BLOCK_OPEN: &str = "{{trans-top";
pub const BLOCK_CLOSE: &str = "{{trans-bottom}}";
/// Splits a block into columns when rendered.
pub const BLOCK_MID: &str = "{{trans-mid}}";

/// Counts of what was extracted and skipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub lines: u64,
    pub pages: usize,
    pub groups: usize,
    pub translations: usize,
    pub malformed_templates: usize,
    pub unterminated_blocks: usize,
    pub missing_readings: usize,
}

#[derive(Debug)]
enum State {
    Idle,
    Recording(TranslationGroup),
}

/// State machine fed one dump line at a time.
///
/// ```
/// use yue_wiktparser::{Config, ReadingIndex, Scanner};
///
/// let config = Config::default();
/// let readings = ReadingIndex::default();
/// let mut scanner = Scanner::new(&config, &readings);
///
/// for line in [
///     "<title>far</title>",
///     "{{trans-top|id=Q1|distant from both}}",
///     "* Cantonese: {{t|yue|遠|tr=jyun5}}",
///     "{{trans-bottom}}",
/// ] {
///     assert!(scanner.push_line(line).is_none());
/// }
///
/// let page = scanner.finish().unwrap();
/// assert_eq!("far", page.title.as_str());
/// assert_eq!("distant from both", page.groups[0].meaning);
/// assert_eq!("遠", page.groups[0].translations[0].translation);
/// ```
pub struct Scanner<'a> {
    config: &'a Config,
    readings: &'a ReadingIndex,
    state: State,
    title: Option<Title>,
    groups: Vec<TranslationGroup>,
    qualifier: Option<String>,
    stats: Stats,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a Config, readings: &'a ReadingIndex) -> Self {
        Self {
            config,
            readings,
            state: State::Idle,
            title: None,
            groups: Vec::new(),
            qualifier: None,
            stats: Stats::default(),
        }
    }

    /// Process the next line of the dump.
    ///
    /// Returns the previous page once a new page title is reached, if it had any translations.
    pub fn push_line(&mut self, line: &str) -> Option<Page> {
        self.stats.lines += 1;

        if line.contains(Title::OPEN) {
            return self.start_page(line);
        }

        if line.contains(BLOCK_OPEN) {
            self.open_block(line);
        } else if line.contains(BLOCK_CLOSE) {
            self.close_block();
        } else if line.contains(BLOCK_MID) {
            // layout only
        } else {
            self.record(line);
        }
        None
    }

    /// Finish the current page at the end of the dump.
    ///
    /// An unterminated block is discarded.
    pub fn finish(&mut self) -> Option<Page> {
        self.discard_block();
        self.take_page()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    fn start_page(&mut self, line: &str) -> Option<Page> {
        self.discard_block();

        let title = match Title::from_line(line) {
            Ok(title) => Some(title),
            Err(e) => {
                warn!("Could not parse title from {:?}: {}", line.trim(), e);
                None
            }
        };

        // `Page` and `Page/translations` are often adjacent in the dump.
        if title.is_some() && title == self.title {
            return None;
        }

        let page = self.take_page();
        self.title = title;
        page
    }

    fn take_page(&mut self) -> Option<Page> {
        let groups = mem::take(&mut self.groups);
        let title = self.title.take()?;
        if groups.is_empty() {
            return None;
        }

        let page = Page { title, groups };
        self.stats.pages += 1;
        self.stats.groups += page.groups.len();
        self.stats.translations += page.translation_count();
        Some(page)
    }

    fn discard_block(&mut self) {
        self.qualifier = None;
        if let State::Recording(group) = mem::replace(&mut self.state, State::Idle) {
            self.stats.unterminated_blocks += 1;
            debug!(
                "Discarding unterminated translation block {:?} on page {:?}",
                group.meaning,
                self.title.as_ref().map(Title::as_str),
            );
        }
    }

    fn open_block(&mut self, line: &str) {
        if let State::Recording(group) = &self.state {
            trace!("Ignoring translation block start inside {:?}", group.meaning);
            return;
        }

        let header = line.find(BLOCK_OPEN).map_or("", |i| &line[i + 2..]);
        self.qualifier = None;
        self.state = State::Recording(TranslationGroup::new(template::block_meaning(header)));
    }

    fn close_block(&mut self) {
        let State::Recording(mut group) = mem::replace(&mut self.state, State::Idle) else {
            trace!("Ignoring translation block end outside of a block");
            return;
        };
        self.qualifier = None;

        if group.translations.is_empty() {
            return;
        }
        group.retain_preferred(&self.config.target_language);
        self.groups.push(group);
    }

    fn record(&mut self, line: &str) {
        let State::Recording(group) = &mut self.state else {
            return;
        };

        if self.config.qualifier_scope == QualifierScope::Line {
            self.qualifier = None;
        }

        for template in template::scan_line(line) {
            let args = match template {
                Template::Qualifier(qualifier) => {
                    self.qualifier = Some(qualifier);
                    continue;
                }
                Template::Other(args) => args,
            };

            let term = match template::decode_term(&args) {
                Ok(term) => term,
                Err(DecodeError::UnknownTag(tag)) => {
                    trace!("Skipping template {:?}", tag);
                    continue;
                }
                Err(e) => {
                    self.stats.malformed_templates += 1;
                    debug!("Skipping malformed template {:?}: {}", args.join("|"), e);
                    continue;
                }
            };

            if let Some(mut term) = resolve(term, self.config, self.readings, &mut self.stats) {
                term.qualifier = self.qualifier.clone();
                group.translations.push(term);
            }
        }
    }
}

/// Decide if a decoded term is kept, filling in its reading if needed.
///
/// Target-language terms are kept as is. Reference-language terms get the
/// first known target-language reading of their text. Other languages are dropped.
fn resolve(
    mut term: Translation,
    config: &Config,
    readings: &ReadingIndex,
    stats: &mut Stats,
) -> Option<Translation> {
    if term.language_code == config.target_language {
        return Some(term);
    }
    if term.language_code != config.reference_language {
        return None;
    }

    match readings.first(&term.translation) {
        Some(reading) => {
            term.transliteration = Some(reading.to_owned());
            Some(term)
        }
        None => {
            stats.missing_readings += 1;
            match config.missing_reading {
                MissingReading::Drop => None,
                MissingReading::Keep => {
                    // The markup transliteration is in the wrong language.
                    term.transliteration = None;
                    Some(term)
                }
            }
        }
    }
}

/// Extract translations from every page in `dump`, writing each page to `sink`.
pub fn extract<S: RecordSink + ?Sized>(
    mut dump: impl BufRead,
    readings: &ReadingIndex,
    config: &Config,
    sink: &mut S,
) -> anyhow::Result<Stats> {
    let mut scanner = Scanner::new(config, readings);

    let mut write = |page: Page| {
        sink.write_page(&page)
            .with_context(|| format!("writing page {:?}", page.title.as_str()))
    };

    let mut buffer = String::new();
    loop {
        buffer.clear();
        if 0 == dump.read_line(&mut buffer).context("reading dump")? {
            // Reached end of file.
            break;
        }

        if let Some(page) = scanner.push_line(&buffer) {
            write(page)?;
        }

        let lines = scanner.stats().lines;
        if lines % 10_000_000 == 0 {
            debug!("Scanned {lines} lines");
        }
    }

    if let Some(page) = scanner.finish() {
        write(page)?;
    }

    Ok(scanner.stats())
}

//! Known Cantonese readings of Chinese words, used to fill in transliterations.
use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    io::{BufRead, Read},
};

use anyhow::{anyhow, bail, Context};

/// Lookup from a word (in traditional or simplified characters) to its known readings.
///
/// Readings keep the order they were first inserted in, without duplicates.
///
/// ```
/// use yue_wiktparser::ReadingIndex;
///
/// let mut index = ReadingIndex::default();
/// index.insert("遠", "远", "jyun5");
/// index.insert("遠", "远", "jyun6");
/// index.insert("遠", "远", "jyun5");
///
/// assert_eq!(["jyun5", "jyun6"], index.get("远"));
/// assert_eq!(Some("jyun5"), index.first("遠"));
/// assert!(index.get("近").is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ReadingIndex {
    readings: HashMap<String, Vec<String>>,
}

impl ReadingIndex {
    /// Record `reading` under both character forms.
    pub fn insert(&mut self, traditional: &str, simplified: &str, reading: &str) {
        let reading = reading.trim();
        if reading.is_empty() {
            return;
        }
        for word in [traditional, simplified] {
            let word = word.trim();
            if word.is_empty() {
                continue;
            }
            let known = self.readings.entry(word.to_owned()).or_default();
            if !known.iter().any(|r| r == reading) {
                known.push(reading.to_owned());
            }
        }
    }

    pub fn get(&self, word: &str) -> &[String] {
        self.readings.get(word).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn first(&self, word: &str) -> Option<&str> {
        self.get(word).first().map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.readings.contains_key(word)
    }

    /// Number of distinct words with at least one reading.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Read a CC-Canto readings file, with lines like `遠 远 [yuan3] {jyun5}`.
///
/// Blank lines and `#` comments are skipped.
pub fn parse_cc_canto_file(
    r: impl BufRead,
    index: &mut ReadingIndex,
    line_errors: &mut impl Extend<ParseLineError>,
) -> anyhow::Result<()> {
    for (i, line) in r.lines().enumerate() {
        let line_num = i as u64 + 1;
        let line = line.with_context(|| format!("reading line {line_num}"))?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        match parse_cc_canto_line(text) {
            Ok((traditional, simplified, reading)) => index.insert(traditional, simplified, reading),
            Err(kind) => line_errors.extend(Some(ParseLineError {
                kind,
                text: text.to_owned(),
                line: line_num,
            })),
        }
    }

    Ok(())
}

fn parse_cc_canto_line(line: &str) -> Result<(&str, &str, &str), ParseErrorKind> {
    let mut words = line.split_whitespace();
    let (Some(traditional), Some(simplified)) = (words.next(), words.next()) else {
        return Err(ParseErrorKind::MissingCharacters);
    };
    if [traditional, simplified]
        .iter()
        .any(|w| w.starts_with(['[', '{']))
    {
        return Err(ParseErrorKind::MissingCharacters);
    }

    let reading = line
        .split_once('{')
        .and_then(|(_, rest)| rest.split_once('}'))
        .map(|(reading, _)| reading.trim())
        .filter(|reading| !reading.is_empty())
        .ok_or(ParseErrorKind::MissingReading)?;

    Ok((traditional, simplified, reading))
}

/// Read a TSV file with `traditional`, `simplified`, and `reading` columns.
///
/// The `simplified` column is optional.
pub fn parse_readings_tsv(
    r: impl Read,
    index: &mut ReadingIndex,
    line_errors: &mut impl Extend<ParseLineError>,
) -> anyhow::Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(r);

    let mut traditional_col = None;
    let mut simplified_col = None;
    let mut reading_col = None;
    for (column, title) in rdr.headers()?.iter().enumerate() {
        match title.trim() {
            "traditional" => traditional_col = Some(column),
            "simplified" => simplified_col = Some(column),
            "reading" => reading_col = Some(column),
            _ => (),
        }
    }

    let traditional_col =
        traditional_col.ok_or_else(|| anyhow!("Cannot find 'traditional' column"))?;
    let reading_col = reading_col.ok_or_else(|| anyhow!("Cannot find 'reading' column"))?;

    let mut row = csv::StringRecord::new();
    loop {
        match rdr.read_record(&mut row) {
            Ok(true) => {}
            // finished
            Ok(false) => break,
            // attempt to recover from parsing errors
            Err(e) => {
                if e.is_io_error() {
                    bail!(e)
                }
                line_errors.extend(Some(ParseLineError {
                    kind: e.into(),
                    text: String::new(),
                    line: rdr.position().line(),
                }));
                continue;
            }
        }

        let traditional = row.get(traditional_col).unwrap_or_default();
        let simplified = simplified_col
            .and_then(|i| row.get(i))
            .unwrap_or_default();
        let reading = row.get(reading_col).unwrap_or_default();

        let kind = if traditional.trim().is_empty() && simplified.trim().is_empty() {
            ParseErrorKind::MissingCharacters
        } else if reading.trim().is_empty() {
            ParseErrorKind::MissingReading
        } else {
            index.insert(traditional, simplified, reading);
            continue;
        };

        line_errors.extend(Some(ParseLineError {
            kind,
            text: row.iter().collect::<Vec<_>>().join("\t"),
            line: row.position().map_or(0, |p| p.line()),
        }));
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("missing characters")]
    MissingCharacters,
    #[error("missing reading")]
    MissingReading,
    #[error("TSV line")]
    Tsv(#[from] csv::Error),
}

#[derive(Debug)]
pub struct ParseLineError {
    pub kind: ParseErrorKind,
    pub text: String,
    pub line: u64,
}

impl Display for ParseLineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "on line {}: {} {:?}", self.line, self.kind, self.text)?;

        // Write source error chain to ensure they are logged.
        let mut source = self.kind.source();
        while let Some(e) = source {
            write!(f, ": {}", e)?;
            source = e.source();
        }
        Ok(())
    }
}

impl Error for ParseLineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        // Return nothing because Display prints source chain.
        None
    }
}

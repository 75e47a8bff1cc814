//! Destinations for extracted pages.
use std::{collections::HashMap, io::Write};

use crate::wm::{Page, Title};

/// Receives each page once all of its translations are known.
pub trait RecordSink {
    fn write_page(&mut self, page: &Page) -> anyhow::Result<()>;

    /// Flush any buffered output after the last page.
    fn finish(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<Page> {
    fn write_page(&mut self, page: &Page) -> anyhow::Result<()> {
        self.push(page.clone());
        Ok(())
    }
}

/// Writes one row per translation, with the title and meaning repeated on each row.
pub struct TsvSink<W: Write> {
    output: csv::Writer<W>,
}

impl<W: Write> TsvSink<W> {
    pub const HEADER: [&'static str; 7] = [
        "english",
        "meaning",
        "translation",
        "transliteration",
        "alternate",
        "literal",
        "qualifier",
    ];

    pub fn new(w: W) -> anyhow::Result<Self> {
        let mut output = csv::WriterBuilder::new().delimiter(b'\t').from_writer(w);
        output.write_record(Self::HEADER)?;
        Ok(Self { output })
    }

    pub fn into_inner(self) -> anyhow::Result<W> {
        Ok(self.output.into_inner().map_err(|e| e.into_error())?)
    }
}

impl<W: Write> RecordSink for TsvSink<W> {
    fn write_page(&mut self, page: &Page) -> anyhow::Result<()> {
        for group in &page.groups {
            for t in &group.translations {
                self.output.write_record([
                    page.title.as_str(),
                    group.meaning.as_str(),
                    t.translation.as_str(),
                    t.transliteration.as_deref().unwrap_or_default(),
                    t.alternate_form.as_deref().unwrap_or_default(),
                    t.literal_translation.as_deref().unwrap_or_default(),
                    t.qualifier.as_deref().unwrap_or_default(),
                ])?;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

/// Writes newline-delimited JSON, one object per page.
///
/// A title can appear on more than one line, e.g. for `Foo` and a `Foo/translations`
/// page that is not next to it in the dump. Consumers should merge objects by title
/// (see [`PageRecords`]).
pub struct JsonSink<W: Write> {
    output: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write_page(&mut self, page: &Page) -> anyhow::Result<()> {
        // Write to string buffer first so each page is a single write.
        let mut line = serde_json::to_string(page)?;
        line.push('\n');
        self.output.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.output.flush()?;
        Ok(())
    }
}

/// Collects pages in memory, merging pages with the same title.
///
/// Pages keep the order their title was first written in.
#[derive(Debug, Default)]
pub struct PageRecords {
    pages: Vec<Page>,
    index: HashMap<Title, usize>,
}

impl PageRecords {
    pub fn get(&self, title: &Title) -> Option<&Page> {
        self.index.get(title).map(|&i| &self.pages[i])
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl RecordSink for PageRecords {
    fn write_page(&mut self, page: &Page) -> anyhow::Result<()> {
        match self.index.get(&page.title) {
            Some(&i) => self.pages[i].groups.extend(page.groups.iter().cloned()),
            None => {
                self.index.insert(page.title.clone(), self.pages.len());
                self.pages.push(page.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wm::{Translation, TranslationGroup};

    fn page(title: &str, meaning: &str, translations: Vec<Translation>) -> Page {
        Page {
            title: Title::from_title(title).unwrap(),
            groups: vec![TranslationGroup {
                meaning: meaning.to_owned(),
                translations,
            }],
        }
    }

    #[test]
    fn tsv_rows() {
        let far = page(
            "far",
            "distant",
            vec![
                Translation {
                    transliteration: Some("jyun5".into()),
                    literal_translation: Some("far away".into()),
                    ..Translation::new("yue", "遠")
                },
                Translation {
                    qualifier: Some("formal".into()),
                    alternate_form: Some("遥远".into()),
                    ..Translation::new("yue", "遙遠")
                },
            ],
        );

        let mut sink = TsvSink::new(Vec::new()).unwrap();
        sink.write_page(&far).unwrap();
        sink.finish().unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        assert_eq!(
            "english\tmeaning\ttranslation\ttransliteration\talternate\tliteral\tqualifier\n\
             far\tdistant\t遠\tjyun5\t\tfar away\t\n\
             far\tdistant\t遙遠\t\t遥远\t\tformal\n",
            output
        );
    }

    #[test]
    fn json_lines() {
        let mut sink = JsonSink::new(Vec::new());
        sink.write_page(&page("far", "distant", vec![Translation::new("yue", "遠")]))
            .unwrap();
        sink.write_page(&page("near", "", vec![Translation::new("yue", "近")]))
            .unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(2, lines.len());
        assert_eq!(
            r#"{"title":"far","groups":[{"meaning":"distant","translations":[{"language_code":"yue","translation":"遠","is_equivalent_term":true}]}]}"#,
            lines[0]
        );
    }

    #[test]
    fn json_repeats_titles() {
        let mut sink = JsonSink::new(Vec::new());
        sink.write_page(&page("far", "distant", vec![Translation::new("yue", "遠")]))
            .unwrap();
        sink.write_page(&page("far/translations", "remote", vec![Translation::new("yue", "偏遠")]))
            .unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();

        let titles: Vec<_> = output
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["title"].clone())
            .collect();
        assert_eq!(vec!["far", "far"], titles);
    }

    #[test]
    fn merge_pages_by_title() {
        let mut records = PageRecords::default();
        records
            .write_page(&page("far", "distant", vec![Translation::new("yue", "遠")]))
            .unwrap();
        records
            .write_page(&page("near", "close", vec![Translation::new("yue", "近")]))
            .unwrap();
        records
            .write_page(&page("far", "remote", vec![Translation::new("yue", "偏遠")]))
            .unwrap();

        let titles: Vec<_> = records.pages().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(vec!["far", "near"], titles);

        let far = records.get(&Title::from_title("far").unwrap()).unwrap();
        let meanings: Vec<_> = far.groups.iter().map(|g| g.meaning.as_str()).collect();
        assert_eq!(vec!["distant", "remote"], meanings);
    }
}

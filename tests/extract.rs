//! Tests to check for changes in extracted translations.
//!
//! To update the expected output, run the test again with the env variable
//! `UPDATE_EXPECT=1` set.
//! See https://docs.rs/expect-test/ for more information.
use yue_wiktparser::{
    extract, parse_cc_canto_file,
    sink::{PageRecords, TsvSink},
    Config, ReadingIndex, Stats,
};

use expect_test::{expect_file, ExpectFile};

const FAR_DUMP: &str = include_str!("./data/far/dump.xml");

fn readings() -> ReadingIndex {
    let mut readings = ReadingIndex::default();
    let mut errors = Vec::new();
    parse_cc_canto_file(
        include_str!("./data/readings.txt").as_bytes(),
        &mut readings,
        &mut errors,
    )
    .unwrap();
    assert!(errors.is_empty(), "Test readings should parse: {errors:?}");
    readings
}

fn check(dump: &str, expect: ExpectFile) -> Stats {
    let mut sink = TsvSink::new(Vec::new()).unwrap();
    let stats = extract(dump.as_bytes(), &readings(), &Config::default(), &mut sink).unwrap();
    let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();

    expect.assert_eq(&output);
    stats
}

#[test]
fn extract_far() {
    let stats = check(FAR_DUMP, expect_file!["./data/far/output.tsv"]);

    assert_eq!(4, stats.pages);
    assert_eq!(6, stats.groups);
    assert_eq!(7, stats.translations);
    assert_eq!(1, stats.malformed_templates);
    assert_eq!(1, stats.unterminated_blocks);
    assert_eq!(1, stats.missing_readings);
}

#[test]
fn translation_subpages_merge() {
    let mut records = PageRecords::default();
    extract(
        FAR_DUMP.as_bytes(),
        &readings(),
        &Config::default(),
        &mut records,
    )
    .unwrap();

    let titles: Vec<_> = records.pages().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(vec!["far", "near", "window"], titles);

    let meanings: Vec<_> = records.pages()[0]
        .groups
        .iter()
        .map(|g| g.meaning.as_str())
        .collect();
    assert_eq!(
        vec![
            "distant from both",
            "remote",
            "to a great distance",
            "at a great distance in time"
        ],
        meanings
    );
}

#[test]
fn output_is_stable() {
    let run = || {
        let mut sink = TsvSink::new(Vec::new()).unwrap();
        extract(
            FAR_DUMP.as_bytes(),
            &readings(),
            &Config::default(),
            &mut sink,
        )
        .unwrap();
        sink.into_inner().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn no_readings() {
    let mut records = PageRecords::default();
    let stats = extract(
        FAR_DUMP.as_bytes(),
        &ReadingIndex::default(),
        &Config::default(),
        &mut records,
    )
    .unwrap();

    // Only Cantonese terms remain.
    assert!(records
        .pages()
        .iter()
        .flat_map(|p| &p.groups)
        .flat_map(|g| &g.translations)
        .all(|t| t.language_code == "yue"));
    assert_eq!(5, stats.translations);
    assert_eq!(7, stats.missing_readings);
}

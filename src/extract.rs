use std::{
    ffi::OsStr,
    fs::File,
    io::{stdin, stdout, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use bzip2::read::MultiBzDecoder;
use tracing::info_span;

use yue_wiktparser::{
    extract, parse_cc_canto_file, parse_readings_tsv,
    sink::{JsonSink, RecordSink, TsvSink},
    Config, ParseLineError, ReadingIndex,
};

#[derive(clap::ValueEnum, Copy, Clone)]
pub enum Format {
    /// One row per translation, with a header
    Tsv,
    /// One JSON object per page
    Json,
}

/// Extract Cantonese translations from an English Wiktionary XML dump.
///
/// Mandarin translations are kept if their Cantonese reading is known.
#[derive(clap::Args)]
pub struct Args {
    /// Path to the dump (`.xml` or `.xml.bz2`). Reads uncompressed xml from stdin if not provided.
    pub input: Option<PathBuf>,

    /// Path to a CC-Canto readings file (lines like `遠 远 [yuan3] {jyun5}`).
    #[arg(long, help_heading = "READINGS", value_name = "FILE")]
    pub readings: Vec<PathBuf>,

    /// Path to a TSV file with `traditional`, `simplified`, and `reading` columns.
    #[arg(long, help_heading = "READINGS", value_name = "FILE.tsv")]
    pub readings_tsv: Vec<PathBuf>,

    /// Path to a JSON file overriding the default extraction settings.
    #[arg(long, value_name = "FILE.json")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Tsv)]
    pub format: Format,

    /// File to write to instead of stdout.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading config from {path:?}");
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    debug!("Using {:?}", config);

    let readings = load_readings(&args)?;
    if readings.is_empty() {
        warn!(
            "No readings loaded, {:?} translations will be skipped",
            config.reference_language
        );
    }

    let dump: Box<dyn BufRead> = match &args.input {
        Some(path) => open_dump(path)?,
        None => Box::new(stdin().lock()),
    };

    let output: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating output file {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(stdout().lock())),
    };

    let mut sink: Box<dyn RecordSink> = match args.format {
        Format::Tsv => Box::new(TsvSink::new(output)?),
        Format::Json => Box::new(JsonSink::new(output)),
    };

    info!("Processing dump");
    let stats = extract(dump, &readings, &config, sink.as_mut())?;
    sink.finish().context("flushing output")?;

    info!(
        "Finished processing {} lines: {} translations in {} groups on {} pages",
        stats.lines, stats.translations, stats.groups, stats.pages
    );
    info!(
        "Skipped {} malformed templates, {} unterminated blocks, {} terms without readings",
        stats.malformed_templates, stats.unterminated_blocks, stats.missing_readings
    );

    Ok(())
}

fn load_readings(args: &Args) -> anyhow::Result<ReadingIndex> {
    let mut readings = ReadingIndex::default();

    for path in &args.readings {
        let span = info_span!("readings", path = path.to_string_lossy().as_ref());
        let _handle = span.enter();

        info!("Loading CC-Canto readings");
        let file = BufReader::new(File::open(path).with_context(|| format!("opening {path:?}"))?);
        let mut errors = Vec::new();
        parse_cc_canto_file(file, &mut readings, &mut errors)
            .with_context(|| format!("parsing readings from {path:?}"))?;
        report_errors(path, &errors);
    }

    for path in &args.readings_tsv {
        let span = info_span!("readings", path = path.to_string_lossy().as_ref());
        let _handle = span.enter();

        info!("Loading TSV readings");
        let file = File::open(path).with_context(|| format!("opening {path:?}"))?;
        let mut errors = Vec::new();
        parse_readings_tsv(file, &mut readings, &mut errors)
            .with_context(|| format!("parsing readings from {path:?}"))?;
        report_errors(path, &errors);
    }

    debug!("Loaded readings for {} words", readings.len());
    Ok(readings)
}

fn report_errors(path: &Path, errors: &[ParseLineError]) {
    for e in errors {
        debug!("Could not parse reading {}", e);
    }
    if !errors.is_empty() {
        warn!("{} errors parsing readings from {path:?}", errors.len());
    }
}

/// Open a dump file, decompressing it if it ends in `.bz2`.
fn open_dump(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(path).with_context(|| format!("opening dump {path:?}"))?;
    if path.extension() == Some(OsStr::new("bz2")) {
        // Wikimedia dumps may be split into multiple bzip2 streams.
        Ok(Box::new(BufReader::new(MultiBzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

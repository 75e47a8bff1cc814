use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter};
#[macro_use]
extern crate log;

mod extract;

/// Get the version returned by `git describe`, e.g.:
/// - `v2.0` if a git tag
/// - the commit hash `034ac04` if not a tag
/// - `034ac04-dirty` if uncommited changes are present,
/// or the crate version if not available (if installed from crates.io).
///
/// See `build.rs` file for more info.
fn version() -> &'static str {
    option_env!("CARGO_GIT_VERSION")
        .or(option_env!("CARGO_PKG_VERSION"))
        .unwrap_or("unknown")
}

#[derive(Parser)]
#[command(version = crate::version())]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    Extract(extract::Args),

    /// Decode the translation templates on each line of stdin, and write them to stdout as JSON.
    ///
    /// No reading lookup or language filtering is done.
    /// This is meant for testing and debugging.
    Decode,
}

fn main() -> anyhow::Result<()> {
    // Use info level by default, load overrides from `RUST_LOG` env variable.
    // See https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    // Extracted records are written to stdout.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_logfmt::builder().layer().with_writer(std::io::stderr))
        .try_init()?;

    let args = Args::parse();

    info!("{} {}", Args::command().get_name(), version());

    match args.cmd {
        Cmd::Extract(args) => extract::run(args),
        Cmd::Decode => {
            use std::io::{stdin, stdout, BufRead, Write};

            use yue_wiktparser::wm::template::{decode_term, scan_line, Template};

            let mut stdout = stdout().lock();
            for line in stdin().lock().lines() {
                let line = line?;
                for template in scan_line(&line) {
                    let Template::Other(args) = template else {
                        continue;
                    };
                    match decode_term(&args) {
                        Ok(term) => {
                            let mut json = serde_json::to_string(&term)?;
                            json.push('\n');
                            stdout.write_all(json.as_bytes())?;
                        }
                        Err(e) => debug!("Skipping template {:?}: {}", args.join("|"), e),
                    }
                }
            }

            Ok(())
        }
    }
}

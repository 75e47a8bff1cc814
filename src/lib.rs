//! Extract Cantonese translations of English headwords from a Wiktionary dump.
#[macro_use]
extern crate log;

pub mod config;
pub use config::Config;
mod readings;
pub use readings::*;
pub mod scanner;
pub use scanner::{extract, Scanner, Stats};
pub mod sink;
pub mod wm;

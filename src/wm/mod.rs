//! Wiktionary types
pub mod template;
pub use template::DecodeError;
mod title;
pub use title::*;
mod translation;
pub use translation::*;

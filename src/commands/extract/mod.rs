//! Well record extraction: page text in, header and stimulation records out.
//!
//! Each field is found by walking an ordered list of candidate locators and
//! keeping the first value that survives the field's cleaner. Structural
//! matches (the stimulation table row, grouped row patterns) come before
//! single-label lookups, and broad fallback patterns come last.

mod cleaners;
mod locators;
mod normalize;
mod page_text;
mod parser;
mod persist;
mod plans;
mod run;
mod tabular;
#[cfg(test)]
mod tests;

pub use run::run;

pub(crate) use persist::count_rows;
pub(crate) use run::{DEFAULT_DB_FILENAME, RUN_MANIFEST_FILENAME};

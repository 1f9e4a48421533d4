//! Preprocess: folds multi-line constructs into logical lines and drops noise.

pub mod group;
mod pattern;

pub use group::Preprocessor;

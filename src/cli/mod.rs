//! Command-line interface for catalog-scraper.

mod commands;
pub mod icons;

pub use commands::{is_verbose, run};

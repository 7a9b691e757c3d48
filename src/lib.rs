//! catalog-scraper - browser-driven product listing scraper.
//!
//! Walks category search pages in Chromium, reads every product card,
//! optionally visits product pages for extended fields, and writes the
//! result to CSV.

pub mod browser;
pub mod cli;
pub mod config;
pub mod listing;
pub mod output;

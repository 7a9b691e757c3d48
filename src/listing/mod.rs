//! Listing scraper core.
//!
//! Walks category listings page by page, reads each product card and
//! optionally visits the product page for extended fields. Everything here
//! is generic over [`BrowserSession`](crate::browser::BrowserSession).

pub mod enricher;
pub mod navigator;
pub mod normalize;
pub mod resolve;
mod runner;
mod selectors;
mod types;

pub use enricher::{with_return, DetailEnricher};
pub use navigator::{poll_until, LoadOutcome, Navigator, Pacing};
pub use runner::{absolutize, scrape_to_csv, ListingScraper, RunLimits};
pub use selectors::{DetailSelectors, ListingSelectors, SelectorConfig};
pub use types::{
    CardContext, CardFields, DetailRecord, ProductRecord, RunSummary, Section, Subcategory,
    SubcategoryProgress, ALL_SUBCATEGORY, IN_STOCK,
};

//! Records produced by a listing run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the synthetic subcategory wrapping a whole section.
pub const ALL_SUBCATEGORY: &str = "(All)";

/// Availability recorded when a product page shows no stock message.
pub const IN_STOCK: &str = "In Stock";

/// A top-level category with its listing URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub url: String,
}

impl Section {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A URL-bearing grouping under a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcategory {
    pub name: String,
    pub url: String,
}

impl Subcategory {
    /// Subcategories of `section`. Sections are not split further, so this is
    /// always the single `(All)` entry over the section URL.
    pub fn for_section(section: &Section) -> Vec<Subcategory> {
        vec![Subcategory {
            name: ALL_SUBCATEGORY.to_string(),
            url: section.url.clone(),
        }]
    }
}

/// Extended fields read from a product's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRecord {
    pub brand: String,
    pub rating: String,
    pub reviews_count: u64,
    pub seller: String,
    pub availability: String,
    pub description: String,
    pub breadcrumb: String,
    pub image_urls: String,
}

/// One output row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Scraped At")]
    pub scraped_at: String,
    #[serde(rename = "Top Section")]
    pub section: String,
    #[serde(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Product Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: u64,
    #[serde(rename = "Product URL")]
    pub url: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Rating")]
    pub rating: String,
    #[serde(rename = "Reviews Count")]
    pub reviews_count: u64,
    #[serde(rename = "Seller")]
    pub seller: String,
    #[serde(rename = "Availability")]
    pub availability: String,
    #[serde(rename = "Full Description")]
    pub description: String,
    #[serde(rename = "Breadcrumb")]
    pub breadcrumb: String,
    #[serde(rename = "Image URLs (detail)")]
    pub image_urls: String,
    #[serde(rename = "Page")]
    pub page: u32,
}

impl ProductRecord {
    /// CSV header, matching the serialized field names.
    pub const HEADERS: [&'static str; 15] = [
        "Scraped At",
        "Top Section",
        "Subcategory",
        "Product Name",
        "Price",
        "Product URL",
        "Brand",
        "Rating",
        "Reviews Count",
        "Seller",
        "Availability",
        "Full Description",
        "Breadcrumb",
        "Image URLs (detail)",
        "Page",
    ];
}

/// Fields read off a listing card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub name: String,
    pub price: u64,
    pub url: String,
}

/// Where a card was found.
#[derive(Debug, Clone, Copy)]
pub struct CardContext<'a> {
    pub section: &'a Section,
    pub subcategory: &'a Subcategory,
    pub page: u32,
}

impl ProductRecord {
    pub fn assemble(
        scraped_at: String,
        ctx: CardContext<'_>,
        card: CardFields,
        detail: DetailRecord,
    ) -> Self {
        Self {
            scraped_at,
            section: ctx.section.name.clone(),
            subcategory: ctx.subcategory.name.clone(),
            name: card.name,
            price: card.price,
            url: card.url,
            brand: detail.brand,
            rating: detail.rating,
            reviews_count: detail.reviews_count,
            seller: detail.seller,
            availability: detail.availability,
            description: detail.description,
            breadcrumb: detail.breadcrumb,
            image_urls: detail.image_urls,
            page: ctx.page,
        }
    }
}

/// Running count for the subcategory being walked.
#[derive(Debug, Default)]
pub struct SubcategoryProgress {
    pub collected: usize,
    pub pages: u32,
}

impl SubcategoryProgress {
    pub fn cap_reached(&self, cap: Option<usize>) -> bool {
        cap.is_some_and(|cap| self.collected >= cap)
    }
}

/// Outcome of a full scrape-and-write.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub output: PathBuf,
    pub sections: usize,
}

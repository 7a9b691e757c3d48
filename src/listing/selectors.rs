//! Locator chains for listing cards, pagination and product pages.
//!
//! Each field lists candidates in priority order; the resolver uses the
//! first one that matches. Defaults target Snapdeal's markup.

use serde::{Deserialize, Serialize};

use crate::browser::Locator;

fn locators(list: &[&str]) -> Vec<Locator> {
    list.iter().map(|s| Locator::parse(s)).collect()
}

/// Selectors used on listing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Presence of this element means the product grid rendered.
    pub marker: Locator,
    /// Card containers, primary first. The first selector that yields any
    /// cards is used for the page.
    pub cards: Vec<Locator>,
    pub name: Vec<Locator>,
    pub price: Vec<Locator>,
    pub link: Vec<Locator>,
    /// Next-page controls, tried in order.
    pub next_page: Vec<Locator>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            marker: Locator::css("div.product-tuple-listing"),
            cards: locators(&["div.product-tuple-listing", "div.product-tuple"]),
            name: locators(&["p.product-title"]),
            price: locators(&["span.product-price"]),
            link: locators(&["a.dp-widget-link"]),
            next_page: locators(&[
                "a[rel='next']",
                "a.pagination-number.next",
                "a.next",
                "//a[contains(translate(., 'NEXT', 'next'), 'next')]",
            ]),
        }
    }
}

/// Selectors used on product detail pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailSelectors {
    pub brand: Vec<Locator>,
    pub rating_value: Vec<Locator>,
    /// Filled star bar whose `style` width encodes the rating.
    pub rating_bar: Vec<Locator>,
    pub review_count: Vec<Locator>,
    pub availability: Vec<Locator>,
    pub seller: Vec<Locator>,
    pub description: Vec<Locator>,
    pub breadcrumb: Locator,
    pub images: Locator,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            brand: locators(&["span[itemprop='brand']", "a#brand", ".pdp-e-i-brand a"]),
            rating_value: locators(&["span[itemprop='ratingValue']", ".pdp-e-i-rating"]),
            rating_bar: locators(&[".filled-stars"]),
            review_count: locators(&["span[itemprop='reviewCount']", ".pdp-review-count"]),
            availability: locators(&[".sold-out-err", ".availability-msg"]),
            seller: locators(&["#sellerName", ".pdp-seller-info a"]),
            description: locators(&["#description", ".product-desc"]),
            breadcrumb: Locator::css("ul.breadcrumb li"),
            images: Locator::css("img"),
        }
    }
}

/// All locator chains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub listing: ListingSelectors,
    pub detail: DetailSelectors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_next_page_ends_with_text_match() {
        let selectors = ListingSelectors::default();
        assert_eq!(selectors.next_page.len(), 4);
        assert!(selectors.next_page[3].is_xpath());
        assert!(selectors.next_page[..3].iter().all(|l| !l.is_xpath()));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let json = r#"{"listing": {"price": ["span.final-price", "span.product-price"]}}"#;
        let config: SelectorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.listing.price.len(), 2);
        assert_eq!(config.listing.price[0], Locator::css("span.final-price"));
        assert_eq!(config.listing.cards, ListingSelectors::default().cards);
        assert_eq!(config.detail, DetailSelectors::default());
    }
}

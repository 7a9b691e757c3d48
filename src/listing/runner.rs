//! Section → subcategory → page → card loop.

use anyhow::Context;
use chrono::Local;
use tracing::{debug, error, info, warn};
use url::Url;

use super::enricher::DetailEnricher;
use super::navigator::{Navigator, Pacing};
use super::normalize::extract_integer;
use super::resolve::{resolve_all_first, resolve_attribute, resolve_text};
use super::selectors::SelectorConfig;
use super::types::{
    CardContext, CardFields, DetailRecord, ProductRecord, RunSummary, Section, Subcategory,
    SubcategoryProgress,
};
use crate::browser::{BrowserResult, BrowserSession};
use crate::config::Config;
use crate::output::write_csv;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Limits and toggles for one run.
#[derive(Debug, Clone)]
pub struct RunLimits {
    pub max_pages_per_subcategory: u32,
    pub max_products_per_subcategory: Option<usize>,
    pub max_scrolls: u32,
    pub deep_scrape: bool,
    pub image_urls_max_len: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_pages_per_subcategory: 3,
            max_products_per_subcategory: None,
            max_scrolls: 20,
            deep_scrape: false,
            image_urls_max_len: 2000,
        }
    }
}

/// Resolve a card link against the listing page it was found on.
pub fn absolutize(base: &str, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    match Url::parse(base).and_then(|b| b.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Walks configured sections and collects one record per listing card.
pub struct ListingScraper<'a> {
    sections: &'a [Section],
    selectors: &'a SelectorConfig,
    pacing: &'a Pacing,
    limits: &'a RunLimits,
}

impl<'a> ListingScraper<'a> {
    pub fn new(
        sections: &'a [Section],
        selectors: &'a SelectorConfig,
        pacing: &'a Pacing,
        limits: &'a RunLimits,
    ) -> Self {
        Self {
            sections,
            selectors,
            pacing,
            limits,
        }
    }

    fn navigator(&self) -> Navigator<'a> {
        Navigator::new(&self.selectors.listing, self.pacing)
    }

    /// Scrape every section, appending to `records` as cards are read.
    ///
    /// Records already pushed stay in `records` if an error cuts the run
    /// short, so the caller can still write them out.
    pub async fn run<S: BrowserSession>(
        &self,
        session: &mut S,
        records: &mut Vec<ProductRecord>,
    ) -> BrowserResult<()> {
        for section in self.sections {
            info!("=== Section: {} ===", section.name);
            self.navigator().load(session, &section.url).await;

            for subcategory in Subcategory::for_section(section) {
                let progress = self
                    .scrape_subcategory(session, section, &subcategory, records)
                    .await?;
                info!(
                    "Collected {} products from '{}' ({} page(s))",
                    progress.collected, subcategory.name, progress.pages
                );
            }
        }
        Ok(())
    }

    async fn scrape_subcategory<S: BrowserSession>(
        &self,
        session: &mut S,
        section: &Section,
        subcategory: &Subcategory,
        records: &mut Vec<ProductRecord>,
    ) -> BrowserResult<SubcategoryProgress> {
        info!("→ Subcategory: {}", subcategory.name);
        let navigator = self.navigator();
        let mut progress = SubcategoryProgress::default();

        if !navigator.load(session, &subcategory.url).await.is_reachable() {
            warn!("Skipping '{}' of {}: page unreachable", subcategory.name, section.name);
            return Ok(progress);
        }

        let cap = self.limits.max_products_per_subcategory;
        let max_pages = self.limits.max_pages_per_subcategory;

        for page in 1..=max_pages {
            info!("  • Page {}", page);
            progress.pages = page;
            navigator
                .scroll_to_bottom(&*session, self.limits.max_scrolls)
                .await;

            let cards = resolve_all_first(&*session, &self.selectors.listing.cards, None).await;
            if cards.is_empty() {
                debug!("No cards on page {}, ending '{}'", page, subcategory.name);
                break;
            }
            debug!("{} card(s) on page {}", cards.len(), page);

            let listing_url = session.current_url().await.unwrap_or_default();
            let ctx = CardContext {
                section,
                subcategory,
                page,
            };

            // Card handles die once the tab navigates, so every card on the
            // page is read before any detail page is visited.
            let remaining =
                cap.map_or(cards.len(), |cap| cap.saturating_sub(progress.collected));
            let mut fields = Vec::with_capacity(remaining.min(cards.len()));
            for card in cards.iter().take(remaining) {
                fields.push(self.read_card(&*session, card, &listing_url).await);
            }

            for card in fields {
                let detail = if self.limits.deep_scrape && !card.url.is_empty() {
                    self.enricher().fetch_details(session, &card.url).await?
                } else {
                    DetailRecord::default()
                };

                let scraped_at = Local::now().format(TIMESTAMP_FORMAT).to_string();
                records.push(ProductRecord::assemble(scraped_at, ctx, card, detail));
                progress.collected += 1;
            }

            if progress.cap_reached(cap) {
                debug!(
                    "Reached {} product(s) for '{}' on page {}",
                    progress.collected, subcategory.name, page
                );
            }

            if page == max_pages {
                debug!("Page cap {} reached for '{}'", max_pages, subcategory.name);
                break;
            }
            if !navigator.advance_page(&*session).await {
                debug!("No next page after page {}", page);
                break;
            }
        }

        Ok(progress)
    }

    fn enricher(&self) -> DetailEnricher<'a> {
        DetailEnricher::new(&self.selectors.detail, self.limits.image_urls_max_len)
    }

    async fn read_card<S: BrowserSession>(
        &self,
        session: &S,
        card: &S::Element,
        listing_url: &str,
    ) -> CardFields {
        let sel = &self.selectors.listing;
        let name = resolve_text(session, &sel.name, Some(card)).await;
        let price_text = resolve_text(session, &sel.price, Some(card)).await;
        let href = resolve_attribute(session, &sel.link, "href", Some(card)).await;

        CardFields {
            name,
            price: extract_integer(&price_text),
            url: absolutize(listing_url, &href),
        }
    }
}

/// Run the scraper over `config` and write whatever was collected.
///
/// The output file is written and the session quit whether or not the run
/// finished. When several steps fail, the run's own error is returned and
/// the others are logged.
pub async fn scrape_to_csv<S: BrowserSession>(
    session: &mut S,
    config: &Config,
) -> anyhow::Result<RunSummary> {
    let pacing = config.pacing();
    let limits = config.limits();
    let scraper = ListingScraper::new(&config.sections, &config.selectors, &pacing, &limits);

    let mut records = Vec::new();
    let outcome = scraper.run(session, &mut records).await;
    if let Err(e) = &outcome {
        error!("Run aborted after {} product(s): {}", records.len(), e);
    }

    let output = config.output_path();
    let written = write_csv(&output, &records);
    match &written {
        Ok(()) => info!("Saved {} rows to {}", records.len(), output.display()),
        Err(e) => warn!("Could not write {}: {}", output.display(), e),
    }

    let quit = session.quit().await;
    if let Err(e) = &quit {
        warn!("Browser did not shut down cleanly: {}", e);
    }

    outcome.context("scrape run failed")?;
    written.with_context(|| format!("failed to write {}", output.display()))?;
    quit.context("failed to close browser session")?;

    Ok(RunSummary {
        rows: records.len(),
        output,
        sections: config.sections.len(),
    })
}

//! In-memory browser serving canned HTML, for driving the scraper in tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use catalog_scraper::browser::{BrowserError, BrowserResult, BrowserSession, Locator};
use catalog_scraper::config::Config;
use catalog_scraper::listing::{absolutize, Pacing, Section};

pub const LISTING_URL: &str = "https://shop.test/footwear";

/// Snapshot of an element taken when it was located.
///
/// Like a real DOM handle it only stays usable until the tab navigates.
#[derive(Debug, Clone)]
pub struct FixtureElement {
    generation: u64,
    html: String,
    text: String,
    attrs: HashMap<String, String>,
}

impl FixtureElement {
    fn from_ref(el: ElementRef<'_>, generation: u64) -> Self {
        Self {
            generation,
            html: el.html(),
            text: el.text().collect(),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

struct FixturePage {
    html: String,
    /// Scroll height after 0, 1, 2... scrolls; the last value repeats.
    heights: Vec<u64>,
}

#[derive(Default)]
struct TabState {
    current: String,
    scrolls: usize,
    /// Bumped on every navigation.
    generation: u64,
}

/// A single-tab browser over a fixed set of pages.
#[derive(Default)]
pub struct FixtureBrowser {
    pages: HashMap<String, FixturePage>,
    tab: Mutex<TabState>,
    history: Mutex<Vec<String>>,
    total_scrolls: Mutex<usize>,
    gotos: usize,
    fail_goto_at: Option<usize>,
    fail_urls: HashSet<String>,
    closed: bool,
}

impl FixtureBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(
            url.to_string(),
            FixturePage {
                html: html.into(),
                heights: vec![1000],
            },
        );
        self
    }

    pub fn page_with_heights(mut self, url: &str, html: impl Into<String>, heights: &[u64]) -> Self {
        self.pages.insert(
            url.to_string(),
            FixturePage {
                html: html.into(),
                heights: heights.to_vec(),
            },
        );
        self
    }

    /// Make the n-th `goto` call (1-based) fail.
    pub fn fail_goto_at(mut self, n: usize) -> Self {
        self.fail_goto_at = Some(n);
        self
    }

    /// Make every `goto` to `url` fail.
    pub fn fail_url(mut self, url: &str) -> Self {
        self.fail_urls.insert(url.to_string());
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn goto_count(&self) -> usize {
        self.gotos
    }

    pub fn current(&self) -> String {
        self.tab.lock().unwrap().current.clone()
    }

    /// Every URL shown, in order, whether reached by `goto` or a click.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    pub fn total_scrolls(&self) -> usize {
        *self.total_scrolls.lock().unwrap()
    }

    fn ensure_open(&self) -> BrowserResult<()> {
        if self.closed {
            Err(BrowserError::Closed)
        } else {
            Ok(())
        }
    }

    fn show(&self, url: &str) {
        let mut tab = self.tab.lock().unwrap();
        tab.current = url.to_string();
        tab.scrolls = 0;
        tab.generation += 1;
        self.history.lock().unwrap().push(url.to_string());
    }

    fn check_live(&self, element: &FixtureElement) -> BrowserResult<()> {
        if element.generation == self.tab.lock().unwrap().generation {
            Ok(())
        } else {
            Err(BrowserError::Protocol("stale element handle".to_string()))
        }
    }

    fn current_html(&self) -> String {
        let tab = self.tab.lock().unwrap();
        self.pages
            .get(&tab.current)
            .map(|p| p.html.clone())
            .unwrap_or_default()
    }

    fn select(
        &self,
        locator: &Locator,
        scope: Option<&FixtureElement>,
    ) -> BrowserResult<Vec<FixtureElement>> {
        let css = match locator {
            Locator::Css(css) => css,
            Locator::XPath(_) => return Err(BrowserError::Unsupported(locator.to_string())),
        };
        let selector =
            Selector::parse(css).map_err(|e| BrowserError::Protocol(e.to_string()))?;

        let doc = match scope {
            Some(el) => {
                self.check_live(el)?;
                Html::parse_fragment(&el.html)
            }
            None => Html::parse_document(&self.current_html()),
        };
        let generation = self.tab.lock().unwrap().generation;
        Ok(doc
            .select(&selector)
            .map(|el| FixtureElement::from_ref(el, generation))
            .collect())
    }
}

#[async_trait]
impl BrowserSession for FixtureBrowser {
    type Element = FixtureElement;

    async fn goto(&mut self, url: &str) -> BrowserResult<()> {
        self.ensure_open()?;
        self.gotos += 1;

        if self.fail_goto_at == Some(self.gotos) || self.fail_urls.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        if !self.pages.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                reason: "404".to_string(),
            });
        }
        self.show(url);
        Ok(())
    }

    async fn current_url(&self) -> BrowserResult<String> {
        self.ensure_open()?;
        Ok(self.current())
    }

    async fn scroll_height(&self) -> BrowserResult<u64> {
        self.ensure_open()?;
        let tab = self.tab.lock().unwrap();
        let heights = self
            .pages
            .get(&tab.current)
            .map(|p| p.heights.as_slice())
            .unwrap_or_default();
        Ok(heights
            .get(tab.scrolls)
            .or(heights.last())
            .copied()
            .unwrap_or(0))
    }

    async fn scroll_to_bottom(&self) -> BrowserResult<()> {
        self.ensure_open()?;
        self.tab.lock().unwrap().scrolls += 1;
        *self.total_scrolls.lock().unwrap() += 1;
        Ok(())
    }

    async fn find(
        &self,
        locator: &Locator,
        scope: Option<&FixtureElement>,
    ) -> BrowserResult<FixtureElement> {
        self.ensure_open()?;
        self.select(locator, scope)?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NotFound(locator.to_string()))
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&FixtureElement>,
    ) -> BrowserResult<Vec<FixtureElement>> {
        self.ensure_open()?;
        self.select(locator, scope)
    }

    async fn text(&self, element: &FixtureElement) -> BrowserResult<String> {
        self.check_live(element)?;
        Ok(element.text.clone())
    }

    async fn attribute(&self, element: &FixtureElement, name: &str) -> BrowserResult<Option<String>> {
        self.check_live(element)?;
        Ok(element.attrs.get(name).cloned())
    }

    async fn click(&self, element: &FixtureElement) -> BrowserResult<()> {
        self.ensure_open()?;
        self.check_live(element)?;
        if let Some(href) = element.attrs.get("href") {
            let target = absolutize(&self.current(), href);
            self.show(&target);
        }
        Ok(())
    }

    async fn quit(&mut self) -> BrowserResult<()> {
        self.closed = true;
        Ok(())
    }
}

/// Pacing with no pauses and a single check per wait.
pub fn instant_pacing() -> Pacing {
    Pacing {
        scroll_pause: Duration::ZERO,
        click_pause: Duration::ZERO,
        listing_wait: Duration::ZERO,
        url_change_wait: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
    }
}

/// Config for a one-section run against the fixture, writing to `output`.
pub fn test_config(output: &std::path::Path) -> Config {
    Config {
        output: output.to_string_lossy().into_owned(),
        scroll_pause_ms: 0,
        listing_wait_secs: 0,
        click_pause_ms: 0,
        url_change_wait_secs: 0,
        poll_interval_ms: 1,
        sections: vec![Section::new("Footwear", LISTING_URL)],
        ..Config::default()
    }
}

pub struct Card {
    pub name: String,
    pub price: String,
    pub href: String,
}

pub fn card(name: &str, price: &str, href: &str) -> Card {
    Card {
        name: name.to_string(),
        price: price.to_string(),
        href: href.to_string(),
    }
}

/// `n` cards named `Product 1..=n` priced `Rs. 100` apart, linking to `/p/1..=n`.
pub fn numbered_cards(n: usize) -> Vec<Card> {
    (1..=n)
        .map(|i| {
            card(
                &format!("Product {}", i),
                &format!("Rs. {}", i * 100),
                &format!("/p/{}", i),
            )
        })
        .collect()
}

/// A listing page in Snapdeal's markup, with an optional `a.next` link.
pub fn listing_html(cards: &[Card], next_href: Option<&str>) -> String {
    let mut html = String::from("<html><body><section class=\"products\">");
    for c in cards {
        html.push_str(&format!(
            r#"<div class="product-tuple-listing">
                 <a class="dp-widget-link" href="{}">
                   <p class="product-title"> {} </p>
                 </a>
                 <span class="product-price">{}</span>
               </div>"#,
            c.href, c.name, c.price
        ));
    }
    html.push_str("</section>");
    if let Some(href) = next_href {
        html.push_str(&format!(r#"<a class="next" href="{}">Next</a>"#, href));
    }
    html.push_str("</body></html>");
    html
}

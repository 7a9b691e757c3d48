//! Page loads, lazy-load scrolling and pagination.
//!
//! Nothing in here fails the run: a stalled wait proceeds with whatever the
//! page holds, and a pagination attempt that goes nowhere reports `false`.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::selectors::ListingSelectors;
use crate::browser::BrowserSession;

/// Fixed pauses and bounded waits used while driving the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// Pause after each scroll-to-bottom.
    pub scroll_pause: Duration,
    /// Pause after clicking a next-page control.
    pub click_pause: Duration,
    /// Longest wait for the listing marker after a page load.
    pub listing_wait: Duration,
    /// Longest wait for the URL to change after a next-page click.
    pub url_change_wait: Duration,
    /// Polling interval for the bounded waits.
    pub poll_interval: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            scroll_pause: Duration::from_millis(800),
            click_pause: Duration::from_millis(1200),
            listing_wait: Duration::from_secs(10),
            url_change_wait: Duration::from_secs(6),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Poll `check` until it reports true or `timeout` elapses.
/// `check` always runs at least once.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// What a listing page load ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The listing marker showed up.
    Ready,
    /// The page loaded but the marker never appeared within the wait.
    MarkerMissing,
    /// Navigation itself failed; the browser still shows the previous page.
    Unreachable,
}

impl LoadOutcome {
    pub fn is_reachable(self) -> bool {
        self != LoadOutcome::Unreachable
    }
}

/// Drives listing pages for the scraper.
pub struct Navigator<'a> {
    selectors: &'a ListingSelectors,
    pacing: &'a Pacing,
}

impl<'a> Navigator<'a> {
    pub fn new(selectors: &'a ListingSelectors, pacing: &'a Pacing) -> Self {
        Self { selectors, pacing }
    }

    /// Navigate to a listing URL and wait for the product grid.
    ///
    /// Navigation errors and marker timeouts are logged, never returned.
    /// An unreachable page skips the marker wait, since whatever the tab
    /// shows belongs to an earlier URL.
    pub async fn load<S: BrowserSession>(&self, session: &mut S, url: &str) -> LoadOutcome {
        if let Err(e) = session.goto(url).await {
            warn!("Failed to load {}: {}", url, e);
            return LoadOutcome::Unreachable;
        }

        let session = &*session;
        let marker = &self.selectors.marker;
        let found = poll_until(
            self.pacing.listing_wait,
            self.pacing.poll_interval,
            move || async move { session.find(marker, None).await.is_ok() },
        )
        .await;

        if found {
            LoadOutcome::Ready
        } else {
            debug!("Listing marker {} not found on {}", marker, url);
            LoadOutcome::MarkerMissing
        }
    }

    /// Scroll to the bottom until the document stops growing or
    /// `max_iterations` scrolls were made. Returns the number of scrolls.
    pub async fn scroll_to_bottom<S: BrowserSession>(&self, session: &S, max_iterations: u32) -> u32 {
        let mut last_height = match session.scroll_height().await {
            Ok(h) => h,
            Err(e) => {
                debug!("Cannot read scroll height: {}", e);
                return 0;
            }
        };

        let mut scrolls = 0;
        while scrolls < max_iterations {
            if let Err(e) = session.scroll_to_bottom().await {
                debug!("Scroll failed: {}", e);
                break;
            }
            scrolls += 1;
            tokio::time::sleep(self.pacing.scroll_pause).await;

            let height = match session.scroll_height().await {
                Ok(h) => h,
                Err(e) => {
                    debug!("Cannot read scroll height: {}", e);
                    break;
                }
            };
            if height == last_height {
                break;
            }
            last_height = height;
        }

        debug!("Scrolled {} time(s), height {}", scrolls, last_height);
        scrolls
    }

    /// Click through to the next results page.
    ///
    /// Each next-page locator is tried in order; the first click that
    /// changes the URL wins. Returns false when no strategy moved the page.
    pub async fn advance_page<S: BrowserSession>(&self, session: &S) -> bool {
        let before = match session.current_url().await {
            Ok(url) => url,
            Err(e) => {
                debug!("Cannot read current URL before paginating: {}", e);
                return false;
            }
        };

        for locator in &self.selectors.next_page {
            let control = match session.find(locator, None).await {
                Ok(el) => el,
                Err(_) => continue,
            };

            if let Err(e) = session.click(&control).await {
                debug!("Click on {} failed: {}", locator, e);
                continue;
            }
            tokio::time::sleep(self.pacing.click_pause).await;

            let before = before.as_str();
            let moved = poll_until(
                self.pacing.url_change_wait,
                self.pacing.poll_interval,
                move || async move {
                    session
                        .current_url()
                        .await
                        .map(|now| now != before)
                        .unwrap_or(false)
                },
            )
            .await;

            if moved {
                debug!("Paginated via {}", locator);
                return true;
            }
            debug!("{} clicked but URL stayed at {}", locator, before);
        }

        false
    }
}

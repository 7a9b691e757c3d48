//! Product detail enrichment (deep scrape).

use std::future::Future;

use tracing::{debug, warn};

use super::normalize::{
    extract_integer, join_breadcrumb, join_image_urls, normalize_rating, rating_from_bar_width,
};
use super::resolve::{all_attributes, all_texts, resolve_attribute, resolve_text};
use super::selectors::DetailSelectors;
use super::types::{DetailRecord, IN_STOCK};
use crate::browser::{BrowserResult, BrowserSession};

/// Run `body` away from the current page, then navigate back to it.
///
/// The return navigation happens whatever `body` produced. An error reading
/// the origin or getting back to it is returned, since the caller's
/// position is lost.
pub async fn with_return<'s, S, T, F, Fut>(session: &'s mut S, body: F) -> BrowserResult<T>
where
    S: BrowserSession,
    F: FnOnce(&'s mut S) -> Fut,
    Fut: Future<Output = (T, &'s mut S)>,
{
    let origin = session.current_url().await?;
    let (value, session) = body(session).await;
    debug!("Returning to {}", origin);
    session.goto(&origin).await?;
    Ok(value)
}

/// Visits product pages and reads extended fields.
pub struct DetailEnricher<'a> {
    selectors: &'a DetailSelectors,
    image_urls_max_len: usize,
}

impl<'a> DetailEnricher<'a> {
    pub fn new(selectors: &'a DetailSelectors, image_urls_max_len: usize) -> Self {
        Self {
            selectors,
            image_urls_max_len,
        }
    }

    /// Fetch extended fields for `url`, then return to the listing page.
    ///
    /// An empty URL yields the default record without navigating. A product
    /// page that fails to load yields the default record too.
    pub async fn fetch_details<S: BrowserSession>(
        &self,
        session: &mut S,
        url: &str,
    ) -> BrowserResult<DetailRecord> {
        if url.is_empty() {
            return Ok(DetailRecord::default());
        }

        with_return(session, |session| async move {
            let detail = match session.goto(url).await {
                Ok(()) => self.read_details(&*session).await,
                Err(e) => {
                    warn!("[fetch_details] could not open {}: {}", url, e);
                    DetailRecord::default()
                }
            };
            (detail, session)
        })
        .await
    }

    /// Read every detail field from the current page. Each field is
    /// resolved on its own so one miss never blanks the others.
    pub async fn read_details<S: BrowserSession>(&self, session: &S) -> DetailRecord {
        let sel = self.selectors;

        let brand = resolve_text(session, &sel.brand, None).await;

        let mut rating = normalize_rating(&resolve_text(session, &sel.rating_value, None).await);
        if rating.is_empty() {
            let style = resolve_attribute(session, &sel.rating_bar, "style", None).await;
            rating = rating_from_bar_width(&style);
        }

        let reviews_count = extract_integer(&resolve_text(session, &sel.review_count, None).await);

        let mut availability = resolve_text(session, &sel.availability, None).await;
        if availability.is_empty() {
            availability = IN_STOCK.to_string();
        }

        let seller = resolve_text(session, &sel.seller, None).await;
        let description = resolve_text(session, &sel.description, None).await;
        let breadcrumb = join_breadcrumb(all_texts(session, &sel.breadcrumb).await);
        let image_urls = join_image_urls(
            all_attributes(session, &sel.images, "src").await,
            self.image_urls_max_len,
        );

        DetailRecord {
            brand,
            rating,
            reviews_count,
            seller,
            availability,
            description,
            breadcrumb,
            image_urls,
        }
    }
}

//! Browser session abstraction.
//!
//! The scraper core talks to the browser only through [`BrowserSession`].
//! The production implementation drives Chromium over CDP via chromiumoxide
//! (see [`ChromeSession`]); anything that can load a URL and answer selector
//! queries can stand in for it.

mod config;
mod error;
mod locator;

#[cfg(feature = "browser")]
mod chrome;
#[cfg(feature = "browser")]
mod stealth;

pub use config::{BrowserEngineConfig, BrowserEngineType};
pub use error::{BrowserError, BrowserResult};
pub use locator::Locator;

#[cfg(feature = "browser")]
pub use chrome::ChromeSession;

use async_trait::async_trait;

/// A single live browser tab that the scraper drives sequentially.
///
/// Element handles are opaque to the caller. Lookups that match nothing
/// return [`BrowserError::NotFound`]; callers that treat absence as normal
/// go through `crate::listing::resolve` instead of matching on errors.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Send + Sync;

    /// Navigate the tab to `url` and wait for the load to finish.
    async fn goto(&mut self, url: &str) -> BrowserResult<()>;

    /// URL of the document currently shown.
    async fn current_url(&self) -> BrowserResult<String>;

    /// `document.body.scrollHeight` of the current document.
    async fn scroll_height(&self) -> BrowserResult<u64>;

    /// Scroll the window to the bottom of the document.
    async fn scroll_to_bottom(&self) -> BrowserResult<()>;

    /// First element matching `locator`, searched within `scope` or the whole document.
    async fn find(
        &self,
        locator: &Locator,
        scope: Option<&Self::Element>,
    ) -> BrowserResult<Self::Element>;

    /// Every element matching `locator`, in document order.
    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&Self::Element>,
    ) -> BrowserResult<Vec<Self::Element>>;

    /// Rendered text of an element.
    async fn text(&self, element: &Self::Element) -> BrowserResult<String>;

    /// Attribute value, `None` when the attribute is not set.
    async fn attribute(&self, element: &Self::Element, name: &str)
        -> BrowserResult<Option<String>>;

    /// Click through script so overlays cannot intercept the event.
    async fn click(&self, element: &Self::Element) -> BrowserResult<()>;

    /// Tear down the session. Further calls are errors.
    async fn quit(&mut self) -> BrowserResult<()>;
}

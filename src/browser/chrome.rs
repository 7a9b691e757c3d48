//! Chromium session over CDP.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, NavigateParams,
};
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::{BrowserEngineConfig, BrowserEngineType};
use super::stealth::STEALTH_SCRIPTS;
use super::{BrowserError, BrowserResult, BrowserSession, Locator};

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

const CLICK_FN: &str = "function() { this.click(); }";

/// One Chromium tab driven over the DevTools protocol.
pub struct ChromeSession {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    /// Launch a local browser, or connect to `remote_url` when configured,
    /// and open the tab the scraper will drive.
    pub async fn start(config: BrowserEngineConfig) -> BrowserResult<Self> {
        let (browser, handler) = match config.remote_url.clone() {
            Some(remote_url) => connect_remote(&remote_url, config.timeout).await?,
            None => launch(&config).await?,
        };

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(format!("failed to open tab: {}", e)))?;

        let session = Self {
            config,
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
        };

        if session.config.engine == BrowserEngineType::Stealth {
            session.apply_stealth().await?;
        }

        Ok(session)
    }

    fn page(&self) -> BrowserResult<&Page> {
        self.page.as_ref().ok_or(BrowserError::Closed)
    }

    async fn apply_stealth(&self) -> BrowserResult<()> {
        let page = self.page()?;
        debug!("Applying stealth user agent and init scripts");

        page.execute(SetUserAgentOverrideParams::new(
            self.config.user_agent.clone(),
        ))
        .await?;

        for script in STEALTH_SCRIPTS {
            if let Err(e) = page
                .evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(
                    script.to_string(),
                ))
                .await
            {
                debug!("Stealth script injection skipped: {}", e);
            }
        }
        Ok(())
    }
}

/// Find Chrome: explicit path, then well-known locations, then PATH.
fn find_chrome(explicit: Option<&Path>) -> BrowserResult<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(BrowserError::NotInstalled(format!(
            "configured chrome_path {} does not exist",
            path.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(BrowserError::NotInstalled(
        "install Chromium or Google Chrome, or set browser.chrome_path".to_string(),
    ))
}

fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

async fn launch(config: &BrowserEngineConfig) -> BrowserResult<(Browser, JoinHandle<()>)> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome(config.chrome_path.as_deref())?;
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(Duration::from_secs(config.timeout));

    // with_head means NOT headless
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg("--window-size=1920,1080")
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--no-first-run")
        .arg("--no-default-browser-check");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| BrowserError::Launch(format!("invalid browser config: {}", e)))?;

    let (browser, handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

    Ok((browser, spawn_handler(handler)))
}

/// Connect to a running Chrome through its DevTools endpoint.
async fn connect_remote(url: &str, timeout: u64) -> BrowserResult<(Browser, JoinHandle<()>)> {
    info!("Connecting to remote browser at {} (timeout: {}s)", url, timeout);

    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .timeout(Duration::from_secs(timeout))
        .send()
        .await
        .map_err(|e| BrowserError::Launch(format!("remote browser unreachable: {}", e)))?
        .json()
        .await
        .map_err(|e| BrowserError::Launch(format!("bad /json/version response: {}", e)))?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| BrowserError::Launch("no webSocketDebuggerUrl in response".to_string()))?;

    debug!("Connecting to WebSocket: {}", ws_url);

    let handler_config = HandlerConfig {
        request_timeout: Duration::from_secs(timeout),
        ..Default::default()
    };

    let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
        .await
        .map_err(|e| BrowserError::Launch(e.to_string()))?;

    Ok((browser, spawn_handler(handler)))
}

#[async_trait]
impl BrowserSession for ChromeSession {
    type Element = Element;

    async fn goto(&mut self, url: &str) -> BrowserResult<()> {
        let page = self.page()?;
        debug!("Navigating to {}", url);

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let secs = self.config.timeout;
        tokio::time::timeout(Duration::from_secs(secs), page.goto(params))
            .await
            .map_err(|_| BrowserError::Timeout {
                url: url.to_string(),
                secs,
            })?
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> BrowserResult<String> {
        self.page()?
            .url()
            .await?
            .ok_or_else(|| BrowserError::Protocol("page has no URL".to_string()))
    }

    async fn scroll_height(&self) -> BrowserResult<u64> {
        let height: f64 = self
            .page()?
            .evaluate("document.body ? document.body.scrollHeight : 0")
            .await?
            .into_value()
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        Ok(height.max(0.0) as u64)
    }

    async fn scroll_to_bottom(&self) -> BrowserResult<()> {
        self.page()?
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        Ok(())
    }

    async fn find(&self, locator: &Locator, scope: Option<&Element>) -> BrowserResult<Element> {
        let page = self.page()?;
        let found = match (locator, scope) {
            (Locator::Css(sel), None) => page.find_element(sel.as_str()).await,
            (Locator::Css(sel), Some(el)) => el.find_element(sel.as_str()).await,
            (Locator::XPath(xpath), None) => page.find_xpath(xpath.as_str()).await,
            (Locator::XPath(_), Some(_)) => {
                return Err(BrowserError::Unsupported(locator.to_string()))
            }
        };
        found.map_err(|e| {
            debug!("Lookup of {} failed: {}", locator, e);
            BrowserError::NotFound(locator.to_string())
        })
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&Element>,
    ) -> BrowserResult<Vec<Element>> {
        let page = self.page()?;
        let found = match (locator, scope) {
            (Locator::Css(sel), None) => page.find_elements(sel.as_str()).await,
            (Locator::Css(sel), Some(el)) => el.find_elements(sel.as_str()).await,
            (Locator::XPath(xpath), None) => page.find_xpaths(xpath.as_str()).await,
            (Locator::XPath(_), Some(_)) => {
                return Err(BrowserError::Unsupported(locator.to_string()))
            }
        };
        Ok(found?)
    }

    async fn text(&self, element: &Element) -> BrowserResult<String> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: &Element, name: &str) -> BrowserResult<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn click(&self, element: &Element) -> BrowserResult<()> {
        element.call_js_fn(CLICK_FN, false).await?;
        Ok(())
    }

    async fn quit(&mut self) -> BrowserResult<()> {
        self.page = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let result = match browser.close().await {
            Ok(_) => {
                if let Err(e) = browser.wait().await {
                    warn!("Browser process did not exit cleanly: {}", e);
                }
                Ok(())
            }
            Err(e) => Err(BrowserError::from(e)),
        };

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        info!("Browser session closed");
        result
    }
}

//! Scrape command.

use std::path::PathBuf;

use clap::Args;
use console::style;

use crate::cli::icons::{dim_arrow, success};
use crate::config::Config;

/// Per-run overrides on top of the loaded configuration.
#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// CSV output path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Visit each product page for brand, rating, seller and more
    #[arg(long)]
    pub deep: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Pages to read per subcategory
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Products to keep per subcategory
    #[arg(long)]
    pub max_products: Option<usize>,

    /// Only scrape sections with this name (repeatable, case-insensitive)
    #[arg(short, long)]
    pub section: Vec<String>,

    /// Connect to a running Chrome DevTools endpoint instead of launching
    #[arg(long, env = "CHROME_REMOTE_URL")]
    pub remote_url: Option<String>,
}

impl ScrapeArgs {
    pub fn apply(self, config: &mut Config) -> anyhow::Result<()> {
        if let Some(output) = self.output {
            config.output = output.to_string_lossy().into_owned();
            // CLI paths are relative to the working directory.
            if !output.is_absolute() {
                config.source_path = None;
            }
        }
        if self.deep {
            config.deep_scrape = true;
        }
        if self.headful {
            config.browser.headless = false;
        }
        if let Some(pages) = self.max_pages {
            config.max_pages_per_subcategory = pages;
        }
        if let Some(products) = self.max_products {
            config.max_products_per_subcategory = Some(products);
        }
        if let Some(url) = self.remote_url {
            config.browser.remote_url = Some(url);
        }
        config.retain_sections(&self.section)?;
        Ok(())
    }
}

/// Scrape all selected sections into the configured CSV.
pub async fn cmd_scrape(mut config: Config, args: ScrapeArgs) -> anyhow::Result<()> {
    args.apply(&mut config)?;
    config.validate()?;

    println!(
        "{} Scraping {} section(s), up to {} page(s) each{}",
        dim_arrow(),
        config.sections.len(),
        config.max_pages_per_subcategory,
        if config.deep_scrape { ", deep" } else { "" }
    );

    let summary = run_browser(&config).await?;

    println!(
        "{} Saved {} rows to {}",
        success(),
        style(summary.rows).bold(),
        style(summary.output.display()).cyan()
    );
    Ok(())
}

#[cfg(feature = "browser")]
async fn run_browser(config: &Config) -> anyhow::Result<crate::listing::RunSummary> {
    use anyhow::Context;

    use crate::browser::ChromeSession;
    use crate::listing::scrape_to_csv;

    let mut session = ChromeSession::start(config.browser.clone())
        .await
        .context("failed to start browser")?;
    scrape_to_csv(&mut session, config).await
}

#[cfg(not(feature = "browser"))]
async fn run_browser(_config: &Config) -> anyhow::Result<crate::listing::RunSummary> {
    anyhow::bail!("built without the `browser` feature; rebuild with --features browser")
}

mod common;

use catalog_scraper::listing::{
    scrape_to_csv, ListingScraper, ProductRecord, RunLimits, Section, SelectorConfig,
};

use common::{
    instant_pacing, listing_html, numbered_cards, test_config, FixtureBrowser, LISTING_URL,
};

const PAGE_2: &str = "https://shop.test/footwear?page=2";
const PAGE_3: &str = "https://shop.test/footwear?page=3";

fn read_rows(path: &std::path::Path) -> Vec<ProductRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.deserialize().map(|r| r.unwrap()).collect()
}

async fn run_listing(browser: &mut FixtureBrowser, limits: RunLimits) -> Vec<ProductRecord> {
    let sections = vec![Section::new("Footwear", LISTING_URL)];
    let selectors = SelectorConfig::default();
    let pacing = instant_pacing();
    let scraper = ListingScraper::new(&sections, &selectors, &pacing, &limits);

    let mut records = Vec::new();
    scraper.run(browser, &mut records).await.unwrap();
    records
}

#[tokio::test]
async fn test_single_page_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("products.csv");
    let mut browser = FixtureBrowser::new().page(LISTING_URL, listing_html(&numbered_cards(3), None));

    let summary = scrape_to_csv(&mut browser, &test_config(&output))
        .await
        .unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.output, output);
    assert_eq!(summary.sections, 1);
    assert!(browser.is_closed());

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 3);
    for (i, row) in rows.iter().enumerate() {
        let n = i + 1;
        assert_eq!(row.section, "Footwear");
        assert_eq!(row.subcategory, "(All)");
        assert_eq!(row.name, format!("Product {}", n));
        assert_eq!(row.price, n as u64 * 100);
        assert_eq!(row.url, format!("https://shop.test/p/{}", n));
        assert_eq!(row.page, 1);
        assert_eq!(row.brand, "");
        assert_eq!(row.rating, "");
        assert_eq!(row.reviews_count, 0);
        assert_eq!(row.availability, "");
        assert_eq!(row.image_urls, "");
        assert!(
            chrono::NaiveDateTime::parse_from_str(&row.scraped_at, "%Y-%m-%d %H:%M:%S").is_ok(),
            "bad timestamp {}",
            row.scraped_at
        );
    }
}

#[tokio::test]
async fn test_pages_followed_until_no_next_control() {
    let mut browser = FixtureBrowser::new()
        .page(LISTING_URL, listing_html(&numbered_cards(2), Some("/footwear?page=2")))
        .page(PAGE_2, listing_html(&numbered_cards(2), None));

    let records = run_listing(&mut browser, RunLimits::default()).await;

    let pages: Vec<u32> = records.iter().map(|r| r.page).collect();
    assert_eq!(pages, [1, 1, 2, 2]);
    assert_eq!(browser.history(), [LISTING_URL, LISTING_URL, PAGE_2]);
}

#[tokio::test]
async fn test_failed_pagination_never_reads_next_page() {
    // Page 2 exists but nothing on page 1 links to it.
    let mut browser = FixtureBrowser::new()
        .page(LISTING_URL, listing_html(&numbered_cards(2), None))
        .page(PAGE_2, listing_html(&numbered_cards(4), None));

    let records = run_listing(&mut browser, RunLimits::default()).await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.page == 1));
    assert!(!browser.history().iter().any(|u| u == PAGE_2));
}

#[tokio::test]
async fn test_page_cap_stops_pagination() {
    let mut browser = FixtureBrowser::new()
        .page(LISTING_URL, listing_html(&numbered_cards(1), Some("/footwear?page=2")))
        .page(PAGE_2, listing_html(&numbered_cards(1), Some("/footwear?page=3")))
        .page(PAGE_3, listing_html(&numbered_cards(1), None));

    let limits = RunLimits {
        max_pages_per_subcategory: 2,
        ..RunLimits::default()
    };
    let records = run_listing(&mut browser, limits).await;

    let pages: Vec<u32> = records.iter().map(|r| r.page).collect();
    assert_eq!(pages, [1, 2]);
    assert!(!browser.history().iter().any(|u| u == PAGE_3));
}

#[tokio::test]
async fn test_product_cap_stops_cards_but_keeps_paginating() {
    let mut browser = FixtureBrowser::new()
        .page(LISTING_URL, listing_html(&numbered_cards(8), Some("/footwear?page=2")))
        .page(PAGE_2, listing_html(&numbered_cards(8), None));

    let limits = RunLimits {
        max_products_per_subcategory: Some(5),
        ..RunLimits::default()
    };
    let records = run_listing(&mut browser, limits).await;

    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.page == 1));
    assert_eq!(records[4].name, "Product 5");
    assert_eq!(browser.history(), [LISTING_URL, LISTING_URL, PAGE_2]);
}

#[tokio::test]
async fn test_empty_listing_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("empty.csv");
    let mut browser = FixtureBrowser::new().page(LISTING_URL, listing_html(&[], None));

    let summary = scrape_to_csv(&mut browser, &test_config(&output))
        .await
        .unwrap();

    assert_eq!(summary.rows, 0);
    assert!(read_rows(&output).is_empty());
    let mut rdr = csv::Reader::from_path(&output).unwrap();
    assert_eq!(rdr.headers().unwrap().len(), ProductRecord::HEADERS.len());
}

#[tokio::test]
async fn test_sections_run_in_configured_order() {
    let shoes = "https://shop.test/shoes";
    let bags = "https://shop.test/bags";
    let mut browser = FixtureBrowser::new()
        .page(shoes, listing_html(&numbered_cards(1), None))
        .page(bags, listing_html(&numbered_cards(2), None));

    let sections = vec![Section::new("Bags", bags), Section::new("Shoes", shoes)];
    let selectors = SelectorConfig::default();
    let pacing = instant_pacing();
    let limits = RunLimits::default();
    let mut records = Vec::new();
    ListingScraper::new(&sections, &selectors, &pacing, &limits)
        .run(&mut browser, &mut records)
        .await
        .unwrap();

    let sections: Vec<&str> = records.iter().map(|r| r.section.as_str()).collect();
    assert_eq!(sections, ["Bags", "Bags", "Shoes"]);
}

#[tokio::test]
async fn test_unreachable_section_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let mut config = test_config(&output);
    config.sections.insert(0, Section::new("Gone", "https://shop.test/gone"));

    let mut browser = FixtureBrowser::new().page(LISTING_URL, listing_html(&numbered_cards(2), None));
    let summary = scrape_to_csv(&mut browser, &config).await.unwrap();

    assert_eq!(summary.rows, 2);
    assert!(read_rows(&output).iter().all(|r| r.section == "Footwear"));
}

#[tokio::test]
async fn test_unreachable_later_section_adds_no_rows() {
    let gone = "https://shop.test/gone";
    let mut browser = FixtureBrowser::new().page(LISTING_URL, listing_html(&numbered_cards(2), None));

    let sections = vec![Section::new("Footwear", LISTING_URL), Section::new("Gone", gone)];
    let selectors = SelectorConfig::default();
    let pacing = instant_pacing();
    let limits = RunLimits::default();
    let mut records = Vec::new();
    ListingScraper::new(&sections, &selectors, &pacing, &limits)
        .run(&mut browser, &mut records)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.section == "Footwear"));
    assert_eq!(browser.current(), LISTING_URL);
}

#[tokio::test]
async fn test_failure_flushes_partial_results_and_closes() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("partial.csv");
    let mut config = test_config(&output);
    config.deep_scrape = true;

    let mut browser = FixtureBrowser::new().page(LISTING_URL, listing_html(&numbered_cards(10), None));
    for i in 1..=10 {
        browser = browser.page(
            &format!("https://shop.test/p/{}", i),
            "<html><body><span itemprop='brand'>Acme</span></body></html>",
        );
    }
    // gotos: section, subcategory, then a product visit and a return per card.
    // The 8th is the return from the third product.
    browser = browser.fail_goto_at(8);

    let err = scrape_to_csv(&mut browser, &config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("connection reset"));
    assert!(browser.is_closed());
    assert_eq!(browser.goto_count(), 8);

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Product 1");
    assert_eq!(rows[1].brand, "Acme");
}

// src/stores/topdeckhero.rs

//! TopDeckHero store backend.
//!
//! The store has no product API, so results come from the search page
//! markup. Each product lists variant rows, one per condition. Listed
//! prices carry a 20% checkout discount, so this backend is flagged
//! discount-eligible; the discount itself is applied by the aggregator.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Card, HttpConfig, Offer, Quality};
use crate::stores::{MAX_PAGES, Store};
use crate::utils::{card_name_matches_query, normalize_whitespace, parse_price};

const BASE_URL: &str = "https://www.topdeckhero.com";

/// TopDeckHero backend.
pub struct TopDeckHero {
    client: reqwest::Client,
    page_delay: Duration,
    selectors: Selectors,
}

struct Selectors {
    product: Selector,
    name: Selector,
    category: Selector,
    product_url: Selector,
    variant_row: Selector,
    description: Selector,
    cart_form: Selector,
    foil_icon: Selector,
}

impl Selectors {
    fn new() -> Self {
        let parse = |s: &str| Selector::parse(s).expect("valid selector literal");
        Self {
            product: parse("li.product"),
            name: parse("h4.name"),
            category: parse("span.category"),
            product_url: parse("a[itemprop=\"url\"]"),
            variant_row: parse("div.variant-row"),
            description: parse("span.variant-description"),
            cart_form: parse("form.add-to-cart-form"),
            foil_icon: parse("i.ss-foil"),
        }
    }
}

impl TopDeckHero {
    /// Registry id.
    pub const ID: &'static str = "topdeckhero";

    const NAME: &'static str = "TopDeckHero";

    pub fn new(client: reqwest::Client, http: &HttpConfig) -> Self {
        Self {
            client,
            page_delay: Duration::from_millis(http.page_delay_ms),
            selectors: Selectors::new(),
        }
    }

    async fn fetch_page(&self, card: &Card, page: usize) -> Result<String> {
        let mut request = self
            .client
            .get(format!("{BASE_URL}/products/search"))
            .query(&[("q", card.name.as_str())]);
        if page > 1 {
            request = request.query(&[("page", page.to_string())]);
        }

        request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::store_unavailable(Self::NAME, e))?
            .text()
            .await
            .map_err(|e| AppError::store_unavailable(Self::NAME, e))
    }

    /// Parse one search results page. Returns the number of product
    /// listings seen, so the caller can detect the last page.
    fn parse_page(&self, html: &str, card: &Card, out: &mut Vec<Offer>) -> usize {
        let document = Html::parse_document(html);
        let mut product_count = 0;

        for product in document.select(&self.selectors.product) {
            product_count += 1;

            let Some(name_elem) = product.select(&self.selectors.name).next() else {
                continue;
            };
            let product_name = normalize_whitespace(&name_elem.text().collect::<String>());
            if !card_name_matches_query(&product_name, &card.name) {
                log::debug!("Skipping non-matching listing: {product_name}");
                continue;
            }

            let set = product
                .select(&self.selectors.category)
                .next()
                .map(|e| normalize_whitespace(&e.text().collect::<String>()))
                .unwrap_or_else(|| "Unknown".to_string());

            let url = product
                .select(&self.selectors.product_url)
                .next()
                .and_then(|e| e.value().attr("href"))
                .map(|href| format!("{BASE_URL}{href}"))
                .unwrap_or_default();

            for variant in product.select(&self.selectors.variant_row) {
                if let Some(offer) = self.parse_variant(variant, &product_name, &set, &url) {
                    out.push(offer);
                }
            }
        }

        product_count
    }

    fn parse_variant(
        &self,
        variant: ElementRef<'_>,
        product_name: &str,
        set: &str,
        url: &str,
    ) -> Option<Offer> {
        let in_stock = variant.value().classes().any(|c| c == "in-stock");

        let description = variant
            .select(&self.selectors.description)
            .next()
            .map(|e| normalize_whitespace(&e.text().collect::<String>()))?;

        // Format is "Condition, Language"; a lone part means English.
        let mut parts = description.split(',').map(str::trim);
        let condition_text = parts.next()?;
        let language = parts.next().unwrap_or("English");
        if !language.eq_ignore_ascii_case("english") {
            log::debug!("Skipping non-English variant: {product_name} ({language})");
            return None;
        }

        let condition = match Quality::parse(condition_text) {
            Ok(q) => q,
            Err(_) => {
                log::debug!("Skipping variant with condition {condition_text:?}");
                return None;
            }
        };

        let price = variant
            .select(&self.selectors.cart_form)
            .next()
            .and_then(|form| form.value().attr("data-price"))
            .and_then(parse_price)?;

        let foil = variant.select(&self.selectors.foil_icon).next().is_some();

        Some(Offer {
            store: Self::NAME.to_string(),
            card_name: product_name.to_string(),
            set: set.to_string(),
            condition,
            foil,
            price,
            availability: u32::from(in_stock),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Store for TopDeckHero {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn discount_eligible(&self) -> bool {
        true
    }

    async fn search(&self, card: &Card) -> Result<Vec<Offer>> {
        let mut offers = Vec::new();

        for page in 1..=MAX_PAGES {
            if page > 1 {
                tokio::time::sleep(self.page_delay).await;
            }

            let html = self.fetch_page(card, page).await?;
            let product_count = self.parse_page(&html, card, &mut offers);

            // An empty page means pagination ran out.
            if product_count == 0 {
                break;
            }
        }

        log::info!(
            "{}: {} offer(s) for {}",
            Self::NAME,
            offers.len(),
            card.name
        );
        Ok(offers)
    }
}

// src/stores/facetoface.rs

//! FaceToFaceGames store backend.
//!
//! Talks to the store's product-indexer JSON API rather than scraping
//! markup. One product hit carries several variants, one per condition.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

use crate::error::{AppError, Result};
use crate::models::{Card, HttpConfig, Offer, Quality};
use crate::stores::{MAX_PAGES, Store};
use crate::utils::{card_name_matches_query, normalize_whitespace};

const BASE_URL: &str = "https://facetofacegames.com";
const PAGE_SIZE: usize = 50;

/// Title markers for non-English printings, e.g. "Lightning Bolt - Japanese".
const LANGUAGE_MARKERS: [&str; 11] = [
    " - french",
    " - japanese",
    " - german",
    " - spanish",
    " - italian",
    " - portuguese",
    " - russian",
    " - korean",
    " - chinese",
    " - simplified chinese",
    " - traditional chinese",
];

/// FaceToFaceGames backend.
pub struct FaceToFace {
    client: reqwest::Client,
    page_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize, Default)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Product,
}

#[derive(Debug, Deserialize, Default)]
struct Product {
    #[serde(default)]
    title: String,
    #[serde(default)]
    handle: String,
    #[serde(default)]
    variants: Vec<Variant>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Variant {
    price: Option<f64>,
    #[serde(default)]
    inventory_quantity: i64,
    #[serde(default)]
    selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Deserialize)]
struct SelectedOption {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

impl FaceToFace {
    /// Registry id.
    pub const ID: &'static str = "facetoface";

    const NAME: &'static str = "FaceToFaceGames";

    pub fn new(client: reqwest::Client, http: &HttpConfig) -> Self {
        Self {
            client,
            page_delay: Duration::from_millis(http.page_delay_ms),
        }
    }

    /// The indexer decodes the keyword twice, so the query must be
    /// URL-encoded twice; a single pass searches for the wrong string.
    fn search_url(card_name: &str, page: usize) -> String {
        let once: String = byte_serialize(card_name.as_bytes()).collect();
        let twice: String = byte_serialize(once.as_bytes()).collect();
        format!("{BASE_URL}/apps/prod-indexer/search/keyword/{twice}/pageSize/{PAGE_SIZE}/page/{page}")
    }

    async fn fetch_page(&self, card: &Card, page: usize) -> Result<Vec<Hit>> {
        let url = Self::search_url(&card.name, page);
        log::debug!("Fetching {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::store_unavailable(Self::NAME, e))?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::store_unavailable(Self::NAME, e))?;

        Ok(parsed.hits.hits)
    }

    fn parse_product(&self, product: &Product, card: &Card, out: &mut Vec<Offer>) {
        if is_non_english(&product.title) {
            log::debug!("Skipping non-English listing: {}", product.title);
            return;
        }

        let clean_name = clean_card_name(&product.title);
        if !card_name_matches_query(&clean_name, &card.name) {
            log::debug!("Skipping non-matching listing: {}", product.title);
            return;
        }

        let set = extract_set(&product.title);
        let foil = is_foil(&product.title);
        let url = format!("{BASE_URL}/products/{}", product.handle);

        for variant in &product.variants {
            let Some(price) = variant.price else { continue };
            if price < 0.0 {
                continue;
            }

            let condition_code = variant
                .selected_options
                .iter()
                .find(|o| o.name == "Condition")
                .map(|o| o.value.as_str())
                .unwrap_or("");

            let condition = match Quality::parse(condition_code) {
                Ok(q) => q,
                Err(_) => {
                    log::debug!("Skipping variant with condition {condition_code:?}");
                    continue;
                }
            };

            out.push(Offer {
                store: Self::NAME.to_string(),
                card_name: clean_name.clone(),
                set: set.clone(),
                condition,
                foil,
                price,
                availability: variant.inventory_quantity.max(0) as u32,
                url: url.clone(),
            });
        }
    }
}

#[async_trait]
impl Store for FaceToFace {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn search(&self, card: &Card) -> Result<Vec<Offer>> {
        let mut offers = Vec::new();

        for page in 1..=MAX_PAGES {
            if page > 1 {
                tokio::time::sleep(self.page_delay).await;
            }

            let hits = self.fetch_page(card, page).await?;
            let short_page = hits.len() < PAGE_SIZE;

            for hit in &hits {
                self.parse_product(&hit.source, card, &mut offers);
            }

            // A short page is the last page.
            if short_page {
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

fn is_non_english(title: &str) -> bool {
    let lower = title.to_lowercase();
    LANGUAGE_MARKERS.iter().any(|m| lower.contains(m))
}

fn bracket_groups() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]").unwrap())
}

/// Extract the set name from a title like
/// `"Lightning Bolt [117] [Double Masters 2022] [Foil]"`.
///
/// The first bracket group is typically the collector number; the second
/// is the set name.
fn extract_set(title: &str) -> String {
    let groups: Vec<&str> = bracket_groups()
        .captures_iter(title)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    match groups.as_slice() {
        [_, set, ..] => set.to_string(),
        [only] => {
            let lower = only.to_lowercase();
            if lower != "foil" && lower != "non-foil" && !only.chars().all(|c| c.is_ascii_digit()) {
                only.to_string()
            } else {
                "Unknown".to_string()
            }
        }
        [] => "Unknown".to_string(),
    }
}

fn is_foil(title: &str) -> bool {
    let lower = title.to_lowercase();
    if lower.contains("[non-foil]") || lower.contains("(non-foil)") {
        return false;
    }
    lower.contains("[foil]") || lower.contains("(foil)")
}

fn clean_card_name(title: &str) -> String {
    let stripped = bracket_groups().replace_all(title, "");
    static FOIL_WORD: OnceLock<Regex> = OnceLock::new();
    let foil_word = FOIL_WORD.get_or_init(|| Regex::new(r"(?i)\bfoil\b").unwrap());
    normalize_whitespace(&foil_word.replace_all(&stripped, ""))
}

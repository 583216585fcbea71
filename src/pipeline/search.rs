// src/pipeline/search.rs

//! Offer aggregation.
//!
//! Fans every card out to every enabled store backend, merges the raw
//! results per card, and applies the normalization rules (checkout
//! discount, minimum-quality filter) before selection.
//!
//! One (card, store) search is one unit of work. Concurrency is bounded
//! per store so the politeness rules hold; different stores run freely in
//! parallel. Page fetches within one search are sequential inside the
//! backend. Merge order never affects selection: the winner is computed
//! over the full set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::models::{Card, Offer, RunOptions};
use crate::stores::Store;
use crate::utils::round_cents;

/// Price multiplier for discount-eligible stores.
const DISCOUNT_MULTIPLIER: f64 = 0.80;

/// A recorded per-(card, store) fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub store: String,
    pub message: String,
}

/// Raw merged results for one card.
#[derive(Debug)]
pub struct CardOffers {
    pub card: Card,
    pub offers: Vec<Offer>,
    pub failures: Vec<StoreFailure>,
}

/// Search every enabled store for every card.
///
/// Individual store failures are recorded and never abort the card or
/// the run; the card keeps whatever the remaining stores returned.
pub async fn gather(
    stores: &[Arc<dyn Store>],
    cards: &[Card],
    per_store_concurrency: usize,
) -> Vec<CardOffers> {
    let concurrency = per_store_concurrency.max(1);

    // One bounded stream per store; stores run concurrently with each other.
    let per_store = stores.iter().map(|store| {
        let store = Arc::clone(store);
        async move {
            stream::iter(cards.iter().enumerate())
                .map(|(index, card)| {
                    let store = Arc::clone(&store);
                    async move { (index, store.name(), store.search(card).await) }
                })
                .buffer_unordered(concurrency)
                .collect::<Vec<_>>()
                .await
        }
    });

    let mut merged: Vec<CardOffers> = cards
        .iter()
        .map(|card| CardOffers {
            card: card.clone(),
            offers: Vec::new(),
            failures: Vec::new(),
        })
        .collect();

    for results in futures::future::join_all(per_store).await {
        for (index, store_name, result) in results {
            match result {
                Ok(offers) => merged[index].offers.extend(offers),
                Err(error) => {
                    log::warn!(
                        "Store {} failed for {}: {}",
                        store_name,
                        merged[index].card.name,
                        error
                    );
                    merged[index].failures.push(StoreFailure {
                        store: store_name.to_string(),
                        message: error.to_string(),
                    });
                }
            }
        }
    }

    merged
}

/// Store names whose prices carry the checkout discount.
pub fn discount_stores(stores: &[Arc<dyn Store>]) -> HashSet<String> {
    stores
        .iter()
        .filter(|s| s.discount_eligible())
        .map(|s| s.name().to_string())
        .collect()
}

/// Apply the discount rule and the minimum-quality filter, in that order.
///
/// The discount multiplies the price by 0.80 (rounded to the cent) for
/// offers from discount-eligible stores, before any comparison happens.
pub fn normalize(
    offers: Vec<Offer>,
    discount_stores: &HashSet<String>,
    options: &RunOptions,
) -> Vec<Offer> {
    offers
        .into_iter()
        .map(|offer| {
            if options.apply_discount && discount_stores.contains(&offer.store) {
                offer.with_price(round_cents(offer.price * DISCOUNT_MULTIPLIER))
            } else {
                offer
            }
        })
        .filter(|offer| match options.min_quality {
            Some(min) => offer.condition.meets_minimum(min),
            None => true,
        })
        .collect()
}

/// Count failures per store across all cards, for the run summary.
pub fn failure_counts(results: &[CardOffers]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for result in results {
        for failure in &result.failures {
            *counts.entry(failure.store.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{Config, Quality};
    use async_trait::async_trait;

    struct FixedStore {
        name: &'static str,
        offers: Vec<Offer>,
        eligible: bool,
        fail: bool,
    }

    #[async_trait]
    impl Store for FixedStore {
        fn name(&self) -> &'static str {
            self.name
        }

        fn discount_eligible(&self) -> bool {
            self.eligible
        }

        async fn search(&self, _card: &Card) -> Result<Vec<Offer>> {
            if self.fail {
                return Err(AppError::store_unavailable(self.name, "timeout"));
            }
            Ok(self.offers.clone())
        }
    }

    fn offer(store: &str, price: f64, condition: Quality) -> Offer {
        Offer {
            store: store.to_string(),
            card_name: "Brainstorm".to_string(),
            set: "Ice Age".to_string(),
            condition,
            foil: false,
            price,
            availability: 1,
            url: String::new(),
        }
    }

    fn options() -> RunOptions {
        Config::default().resolve().unwrap()
    }

    #[tokio::test]
    async fn gather_merges_results_per_card() {
        let stores: Vec<Arc<dyn Store>> = vec![
            Arc::new(FixedStore {
                name: "A",
                offers: vec![offer("A", 2.0, Quality::NearMint)],
                eligible: false,
                fail: false,
            }),
            Arc::new(FixedStore {
                name: "B",
                offers: vec![offer("B", 1.5, Quality::Played)],
                eligible: false,
                fail: false,
            }),
        ];
        let cards = vec![
            Card::parse("Brainstorm").unwrap(),
            Card::parse("Sol Ring").unwrap(),
        ];

        let results = gather(&stores, &cards, 2).await;

        assert_eq!(results.len(), 2);
        for result in &results {
            assert_eq!(result.offers.len(), 2);
            assert!(result.failures.is_empty());
        }
        assert_eq!(results[0].card.name, "Brainstorm");
        assert_eq!(results[1].card.name, "Sol Ring");
    }

    #[tokio::test]
    async fn gather_records_partial_failures_and_continues() {
        let stores: Vec<Arc<dyn Store>> = vec![
            Arc::new(FixedStore {
                name: "Broken",
                offers: vec![],
                eligible: false,
                fail: true,
            }),
            Arc::new(FixedStore {
                name: "Healthy",
                offers: vec![offer("Healthy", 1.0, Quality::NearMint)],
                eligible: false,
                fail: false,
            }),
        ];
        let cards = vec![Card::parse("Brainstorm").unwrap()];

        let results = gather(&stores, &cards, 1).await;

        assert_eq!(results[0].offers.len(), 1);
        assert_eq!(results[0].failures.len(), 1);
        assert_eq!(results[0].failures[0].store, "Broken");
        assert_eq!(failure_counts(&results).get("Broken"), Some(&1));
    }

    #[test]
    fn discount_applies_once_to_eligible_stores_only() {
        let mut opts = options();
        opts.apply_discount = true;

        let discount: HashSet<String> = ["TopDeckHero".to_string()].into();
        let offers = vec![
            offer("TopDeckHero", 10.00, Quality::NearMint),
            offer("FaceToFaceGames", 10.00, Quality::NearMint),
        ];

        let normalized = normalize(offers, &discount, &opts);
        assert_eq!(normalized[0].price, 8.00);
        assert_eq!(normalized[1].price, 10.00);
    }

    #[test]
    fn discount_disabled_leaves_prices_alone() {
        let discount: HashSet<String> = ["TopDeckHero".to_string()].into();
        let offers = vec![offer("TopDeckHero", 10.00, Quality::NearMint)];

        let normalized = normalize(offers, &discount, &options());
        assert_eq!(normalized[0].price, 10.00);
    }

    #[test]
    fn discount_rounds_to_the_cent() {
        let mut opts = options();
        opts.apply_discount = true;
        let discount: HashSet<String> = ["TopDeckHero".to_string()].into();

        // 1.99 * 0.80 = 1.592 -> 1.59
        let normalized = normalize(
            vec![offer("TopDeckHero", 1.99, Quality::NearMint)],
            &discount,
            &opts,
        );
        assert_eq!(normalized[0].price, 1.59);
    }

    #[test]
    fn min_quality_filter_keeps_meeting_conditions() {
        let mut opts = options();
        opts.min_quality = Some(Quality::LightlyPlayed);

        let offers = vec![
            offer("A", 1.0, Quality::NearMint),
            offer("A", 2.0, Quality::LightlyPlayed),
            offer("A", 3.0, Quality::ModeratelyPlayed),
        ];

        let kept = normalize(offers, &HashSet::new(), &opts);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|o| o.condition != Quality::ModeratelyPlayed));
    }

    #[test]
    fn filter_can_empty_a_card_without_error() {
        let mut opts = options();
        opts.min_quality = Some(Quality::NearMint);

        let offers = vec![offer("A", 1.0, Quality::Damaged)];
        assert!(normalize(offers, &HashSet::new(), &opts).is_empty());
    }
}

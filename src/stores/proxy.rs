// src/stores/proxy.rs

//! Proxy offer generator.
//!
//! Not a real store: synthesizes a fixed-price proxy offer for every card
//! so the comparison always has a floor. No network, never unavailable.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Card, Offer, Quality};
use crate::stores::Store;

const PROXY_PRICE: f64 = 0.45;

/// Proxy backend.
pub struct Proxy {
    allow_foil: bool,
}

impl Proxy {
    /// Registry id.
    pub const ID: &'static str = "proxy";

    const NAME: &'static str = "Proxy";

    pub fn new(allow_foil: bool) -> Self {
        Self { allow_foil }
    }

    fn offer(&self, card: &Card, foil: bool) -> Offer {
        Offer {
            store: Self::NAME.to_string(),
            card_name: card.name.clone(),
            set: card.set.clone().unwrap_or_else(|| "Proxy".to_string()),
            condition: Quality::Mint,
            foil,
            price: PROXY_PRICE,
            availability: 1,
            url: String::new(),
        }
    }
}

#[async_trait]
impl Store for Proxy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn search(&self, card: &Card) -> Result<Vec<Offer>> {
        let mut offers = vec![self.offer(card, false)];
        if self.allow_foil {
            offers.push(self.offer(card, true));
        }
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_non_foil_offer_by_default() {
        let card = Card::parse("Sol Ring").unwrap();
        let offers = Proxy::new(false).search(&card).await.unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].price, PROXY_PRICE);
        assert!(!offers[0].foil);
        assert_eq!(offers[0].set, "Proxy");
        assert!(offers[0].in_stock());
    }

    #[tokio::test]
    async fn allow_foil_adds_a_foil_offer() {
        let card = Card::parse("Sol Ring (C21)").unwrap();
        let offers = Proxy::new(true).search(&card).await.unwrap();

        assert_eq!(offers.len(), 2);
        assert!(!offers[0].foil);
        assert!(offers[1].foil);
        assert_eq!(offers[1].set, "C21");
    }
}

// src/strategy.rs

//! Selection strategies.
//!
//! Each strategy is a pure function from a filtered offer list to at most
//! one chosen offer. All strategies prefer in-stock offers: the candidate
//! set is restricted to offers with stock if any exist, otherwise the full
//! list is considered so a result is still reported. Ties break by lowest
//! price, then store name.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{AppError, Result};
use crate::models::Offer;

/// Named, stateless selection policy, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Cheapest,
    CheapestNonfoil,
    CheapestFoil,
    FoilFirstCheapest,
    BestCondition,
    Blingiest,
}

/// Recognized strategy names, listed for help text.
pub const STRATEGY_NAMES: [&str; 6] = [
    "cheapest",
    "cheapest-nonfoil",
    "cheapest-foil",
    "foil-first-cheapest",
    "best-condition",
    "blingiest",
];

impl Strategy {
    /// Parse a strategy name, case-insensitively.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "cheapest" => Ok(Self::Cheapest),
            "cheapest-nonfoil" => Ok(Self::CheapestNonfoil),
            "cheapest-foil" => Ok(Self::CheapestFoil),
            "foil-first-cheapest" => Ok(Self::FoilFirstCheapest),
            "best-condition" => Ok(Self::BestCondition),
            "blingiest" => Ok(Self::Blingiest),
            _ => Err(AppError::config(format!(
                "Unknown strategy: {}. Available strategies: {}",
                name,
                STRATEGY_NAMES.join(", ")
            ))),
        }
    }

    /// The canonical name of this strategy.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::CheapestNonfoil => "cheapest-nonfoil",
            Self::CheapestFoil => "cheapest-foil",
            Self::FoilFirstCheapest => "foil-first-cheapest",
            Self::BestCondition => "best-condition",
            Self::Blingiest => "blingiest",
        }
    }

    /// Select at most one offer from the list.
    pub fn select<'a>(self, offers: &'a [Offer]) -> Option<&'a Offer> {
        let candidates = stock_preferred(offers);
        match self {
            Self::Cheapest => cheapest(&candidates, |_| true),
            Self::CheapestNonfoil => cheapest(&candidates, |o| !o.foil),
            Self::CheapestFoil => cheapest(&candidates, |o| o.foil),
            Self::FoilFirstCheapest => {
                cheapest(&candidates, |o| o.foil).or_else(|| cheapest(&candidates, |o| !o.foil))
            }
            Self::BestCondition => {
                let best_rank = candidates.iter().map(|o| o.condition.rank()).min()?;
                cheapest(&candidates, |o| o.condition.rank() == best_rank)
            }
            Self::Blingiest => priciest(&candidates, |o| o.foil),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Restrict to in-stock offers when any exist; otherwise keep everything.
fn stock_preferred(offers: &[Offer]) -> Vec<&Offer> {
    let in_stock: Vec<&Offer> = offers.iter().filter(|o| o.in_stock()).collect();
    if in_stock.is_empty() {
        offers.iter().collect()
    } else {
        in_stock
    }
}

/// Deterministic total order: ascending price, then store name, then URL.
pub fn by_price_then_store(a: &Offer, b: &Offer) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| a.store.cmp(&b.store))
        .then_with(|| a.url.cmp(&b.url))
}

fn cheapest<'a>(candidates: &[&'a Offer], keep: impl Fn(&Offer) -> bool) -> Option<&'a Offer> {
    candidates
        .iter()
        .filter(|o| keep(o))
        .copied()
        .min_by(|a, b| by_price_then_store(a, b))
}

fn priciest<'a>(candidates: &[&'a Offer], keep: impl Fn(&Offer) -> bool) -> Option<&'a Offer> {
    // Highest price wins; price ties resolve to the lexicographically
    // smallest store name.
    candidates
        .iter()
        .filter(|o| keep(o))
        .copied()
        .max_by(|a, b| {
            a.price
                .total_cmp(&b.price)
                .then_with(|| b.store.cmp(&a.store))
                .then_with(|| b.url.cmp(&a.url))
        })
}

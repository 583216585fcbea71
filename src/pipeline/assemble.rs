// src/pipeline/assemble.rs

//! Result assembly.
//!
//! Joins each card's selected offer back with its full offer list for
//! presentation. Pure pass-through: no re-filtering, no mutation of the
//! offers themselves. Cards stay in want-list input order; within a card
//! the selected offer comes first, the rest ascend by price.

use crate::models::{Card, Offer};
use crate::pipeline::search::StoreFailure;
use crate::strategy::{Strategy, by_price_then_store};

/// Presentation-ready result for one card.
#[derive(Debug)]
pub struct CardReport {
    pub card: Card,

    /// Full filtered offer list, selected offer first, remainder by
    /// ascending price.
    pub offers: Vec<Offer>,

    /// The strategy's pick, if any.
    pub selected: Option<Offer>,

    /// Stores that failed for this card.
    pub failures: Vec<StoreFailure>,
}

/// Run selection and build the report for one card.
pub fn assemble(
    card: Card,
    mut offers: Vec<Offer>,
    strategy: Strategy,
    failures: Vec<StoreFailure>,
) -> CardReport {
    let selected = strategy.select(&offers).cloned();

    offers.sort_by(by_price_then_store);
    if let Some(chosen) = &selected {
        if let Some(position) = offers.iter().position(|o| o == chosen) {
            let chosen = offers.remove(position);
            offers.insert(0, chosen);
        }
    }

    CardReport {
        card,
        offers,
        selected,
        failures,
    }
}

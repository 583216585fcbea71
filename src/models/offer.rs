//! Store offer structure.

use serde::{Deserialize, Serialize};

use super::Quality;

/// One store's priced listing of a specific card printing.
///
/// Offers are never mutated after creation; normalization (e.g. the
/// checkout discount) produces a new value via [`Offer::with_price`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    /// Canonical store name
    pub store: String,

    /// Card name as matched against the query
    pub card_name: String,

    /// Set code or set name as listed by the store
    pub set: String,

    /// Card condition
    pub condition: Quality,

    /// Whether the listing is foil
    pub foil: bool,

    /// Price in CAD, always >= 0
    pub price: f64,

    /// Stock count; 0 means out of stock but still informative
    pub availability: u32,

    /// Direct URL to the product page
    pub url: String,
}

impl Offer {
    /// Copy of this offer with a different price.
    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }

    /// Whether the offer has stock.
    pub fn in_stock(&self) -> bool {
        self.availability > 0
    }
}

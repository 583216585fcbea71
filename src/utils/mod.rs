//! Utility functions and helpers.

pub mod http;
pub mod normalize;

pub use normalize::{card_name_matches_query, normalize_whitespace, parse_price, round_cents};

// src/utils/normalize.rs

//! Text and price normalization helpers.

use std::sync::OnceLock;

use regex::Regex;

/// Words that describe a printing rather than name a card. Ignored when
/// matching a store listing against a search query.
const DESCRIPTOR_WORDS: [&str; 10] = [
    "foil",
    "non-foil",
    "nonfoil",
    "promo",
    "extended",
    "art",
    "showcase",
    "borderless",
    "alternate",
    "alt",
];

/// Collapse runs of whitespace and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check that a store listing's card name matches the search query.
///
/// Case-insensitive word containment: every core word of the query must
/// appear in the listing name. Descriptor words ("foil", "promo", ...)
/// are not required to match. This is light cleanup matching, not fuzzy
/// resolution against a canonical card database.
pub fn card_name_matches_query(card_name: &str, query: &str) -> bool {
    if card_name.is_empty() || query.is_empty() {
        return false;
    }

    let name = normalize_whitespace(card_name).to_lowercase();
    let query = normalize_whitespace(query).to_lowercase();

    let core_words: Vec<&str> = query
        .split(' ')
        .filter(|w| !DESCRIPTOR_WORDS.contains(w))
        .collect();

    // A query made entirely of descriptor words must match exactly.
    if core_words.is_empty() {
        return name == query;
    }

    core_words.iter().all(|word| name.contains(word))
}

fn price_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap())
}

/// Extract a price from a string like `"CAD$ 12.99"` or `"$12.99"`.
pub fn parse_price(text: &str) -> Option<f64> {
    price_digits()
        .find(text)?
        .as_str()
        .parse()
        .ok()
}

/// Round a currency amount to the cent, standard half-up rounding.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize_whitespace("  Lightning   Bolt "), "Lightning Bolt");
    }

    #[test]
    fn name_matching_is_word_containment() {
        assert!(card_name_matches_query("Lightning Bolt", "lightning bolt"));
        assert!(card_name_matches_query("Lightning Bolt - Borderless", "Lightning Bolt"));
        assert!(!card_name_matches_query("Brainstone", "brainstorm"));
        assert!(card_name_matches_query("Brainstorm", "brainstorm"));
    }

    #[test]
    fn descriptor_words_are_optional() {
        assert!(card_name_matches_query("Sol Ring", "sol ring foil"));
        // Descriptor-only queries need an exact match.
        assert!(!card_name_matches_query("Sol Ring", "foil"));
        assert!(card_name_matches_query("foil", "foil"));
    }

    #[test]
    fn price_parsing_strips_currency_markers() {
        assert_eq!(parse_price("CAD$ 12.99"), Some(12.99));
        assert_eq!(parse_price("$0.45"), Some(0.45));
        assert_eq!(parse_price("free"), None);
    }

    #[test]
    fn cent_rounding_is_half_up() {
        assert_eq!(round_cents(7.992), 7.99);
        assert_eq!(round_cents(7.995), 8.0);
        assert_eq!(round_cents(10.0 * 0.80), 8.0);
    }
}

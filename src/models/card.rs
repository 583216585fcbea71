//! Want-list card structure and line parser.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::normalize_whitespace;

/// One entry from the user's want-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    /// Card name, case preserved for display
    pub name: String,

    /// Optional set code or set name qualifier
    pub set: Option<String>,

    /// Requested quantity, always >= 1. Metadata only; never used
    /// for matching or cache identity.
    pub quantity: u32,
}

fn quantity_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:(\d+)x|x(\d+))$").unwrap())
}

fn set_qualifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]*)\)|\[([^\]]*)\]").unwrap())
}

impl Card {
    /// Parse one free-text want-list line.
    ///
    /// Recognized clauses, order-independent:
    /// - a leading or trailing quantity marker: `4x Brainstorm`, `Brainstorm x4`
    /// - a set qualifier in parentheses or brackets: `Counterspell (7ED)`
    ///
    /// The remaining text, whitespace-collapsed, is the card name.
    /// Quantity defaults to 1.
    pub fn parse(line: &str) -> Result<Self> {
        let mut set = None;
        let without_set = set_qualifier().replace(line, |caps: &regex::Captures<'_>| {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let trimmed = inner.trim();
            if set.is_none() && !trimmed.is_empty() {
                set = Some(trimmed.to_string());
            }
            String::new()
        });

        let mut quantity = 1u32;
        let mut tokens: Vec<&str> = without_set.split_whitespace().collect();

        let take_marker = |token: &str| -> Option<u32> {
            let caps = quantity_marker().captures(token)?;
            caps.get(1)
                .or_else(|| caps.get(2))
                .and_then(|m| m.as_str().parse().ok())
        };

        if let Some(qty) = tokens.first().and_then(|t| take_marker(t)) {
            quantity = qty;
            tokens.remove(0);
        } else if let Some(qty) = tokens.last().and_then(|t| take_marker(t)) {
            quantity = qty;
            tokens.pop();
        }

        let name = tokens.join(" ");
        if name.is_empty() || quantity == 0 {
            return Err(AppError::malformed_line(line));
        }

        Ok(Self {
            name,
            set,
            quantity,
        })
    }

    /// Identity key for matching and caching: normalized name plus
    /// normalized set-or-absent. Quantity is excluded.
    pub fn identity(&self) -> String {
        let name = normalize_whitespace(&self.name).to_lowercase();
        match &self.set {
            Some(set) => format!("{}|{}", name, set.trim().to_lowercase()),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_name() {
        let card = Card::parse("Lightning Bolt").unwrap();
        assert_eq!(card.name, "Lightning Bolt");
        assert_eq!(card.set, None);
        assert_eq!(card.quantity, 1);
    }

    #[test]
    fn parse_trailing_quantity() {
        let card = Card::parse("Brainstorm x4").unwrap();
        assert_eq!(card.name, "Brainstorm");
        assert_eq!(card.set, None);
        assert_eq!(card.quantity, 4);
    }

    #[test]
    fn parse_leading_quantity() {
        let card = Card::parse("4x Sol Ring").unwrap();
        assert_eq!(card.name, "Sol Ring");
        assert_eq!(card.quantity, 4);
    }

    #[test]
    fn parse_set_in_parens() {
        let card = Card::parse("Counterspell (7ED)").unwrap();
        assert_eq!(card.name, "Counterspell");
        assert_eq!(card.set.as_deref(), Some("7ED"));
    }

    #[test]
    fn parse_set_in_brackets_with_quantity() {
        let card = Card::parse("2x Counterspell [Seventh Edition]").unwrap();
        assert_eq!(card.name, "Counterspell");
        assert_eq!(card.set.as_deref(), Some("Seventh Edition"));
        assert_eq!(card.quantity, 2);
    }

    #[test]
    fn parse_collapses_whitespace_preserving_case() {
        let card = Card::parse("  Lightning   Bolt  ").unwrap();
        assert_eq!(card.name, "Lightning Bolt");
    }

    #[test]
    fn parse_uppercase_marker() {
        let card = Card::parse("Brainstorm X4").unwrap();
        assert_eq!(card.quantity, 4);
    }

    #[test]
    fn parse_rejects_empty_residual_name() {
        assert!(matches!(
            Card::parse("x4"),
            Err(AppError::MalformedCardLine { .. })
        ));
        assert!(Card::parse("   ").is_err());
        assert!(Card::parse("(7ED)").is_err());
    }

    #[test]
    fn parse_rejects_zero_quantity() {
        assert!(Card::parse("Brainstorm x0").is_err());
    }

    #[test]
    fn identity_ignores_quantity_and_case() {
        let a = Card::parse("Brainstorm x4").unwrap();
        let b = Card::parse("brainstorm").unwrap();
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_distinguishes_sets() {
        let a = Card::parse("Counterspell (7ED)").unwrap();
        let b = Card::parse("Counterspell").unwrap();
        assert_ne!(a.identity(), b.identity());
    }
}

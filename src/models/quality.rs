//! Card condition ranking.
//!
//! A total order over the seven standard condition labels, used for the
//! minimum-quality filter and the best-condition selection strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Card condition, ranked best to worst.
///
/// Rank index is the discriminant: lower index means better condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quality {
    Mint,
    NearMint,
    LightlyPlayed,
    ModeratelyPlayed,
    Played,
    HeavilyPlayed,
    Damaged,
}

/// Canonical aliases accepted on the CLI, listed for help text.
pub const QUALITY_OPTIONS: [&str; 7] = ["mint", "nm", "lp", "mp", "played", "hp", "damaged"];

impl Quality {
    /// Rank index of this level. Lower is better.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Parse a condition label or alias, case-insensitively.
    ///
    /// Unknown input is a hard error, never a silent default.
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_lowercase().as_str() {
            "mint" | "m" => Ok(Self::Mint),
            "near mint" | "nearmint" | "nm" => Ok(Self::NearMint),
            "lightly played" | "lightlyplayed" | "lp" => Ok(Self::LightlyPlayed),
            "moderately played" | "moderatelyplayed" | "mp" => Ok(Self::ModeratelyPlayed),
            "played" | "pl" | "p" => Ok(Self::Played),
            "heavily played" | "heavilyplayed" | "heavy played" | "hp" => Ok(Self::HeavilyPlayed),
            "damaged" | "dmg" => Ok(Self::Damaged),
            _ => Err(AppError::invalid_quality(format!(
                "{}. Available qualities: {}",
                text.trim(),
                QUALITY_OPTIONS.join(", ")
            ))),
        }
    }

    /// Whether this condition meets a minimum requirement.
    pub fn meets_minimum(self, minimum: Quality) -> bool {
        self.rank() <= minimum.rank()
    }

    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Mint => "Mint",
            Self::NearMint => "Near Mint",
            Self::LightlyPlayed => "Lightly Played",
            Self::ModeratelyPlayed => "Moderately Played",
            Self::Played => "Played",
            Self::HeavilyPlayed => "Heavily Played",
            Self::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

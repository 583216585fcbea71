// src/models/mod.rs

//! Domain models for the deal finder.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod card;
mod config;
mod offer;
mod quality;

// Re-export all public types
pub use card::Card;
pub use config::{CacheConfig, Config, HttpConfig, ProxyConfig, RunOptions, SearchConfig};
pub use offer::Offer;
pub use quality::{QUALITY_OPTIONS, Quality};

// src/lib.rs

//! MTG Deal Finder Library
//!
//! Finds the cheapest available offer for each card in a want-list by
//! querying several online store backends, normalizing their results
//! into one data model, and selecting a best offer per card under a
//! pluggable strategy.

pub mod cache;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod stores;
pub mod strategy;
pub mod utils;

//! Core domain types and the strength computation.

pub mod currency;
pub mod price_series;
pub mod price_matrix;
pub mod pair_resolver;
pub mod indicator;
pub mod strength;
pub mod ranking;
pub mod engine;
pub mod market_data;
pub mod config;
pub mod error;

//! Data layer for the bike-share dashboard.
//!
//! Locates and parses the daily and hourly rental CSV tables, filters them to
//! a date range, derives the aggregated views and assembles the report the
//! presenter renders.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use rental_core as core;

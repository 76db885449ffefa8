//! Shared types for the bike-share rental dashboard.
//!
//! Holds the rental record model, inclusive date ranges, category labels, the
//! error type, command-line settings and number formatting used by the data
//! and UI crates.

pub mod error;
pub mod formatting;
pub mod labels;
pub mod models;
pub mod settings;

pub use error::{RentalError, Result};

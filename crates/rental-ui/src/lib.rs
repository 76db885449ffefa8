//! Terminal UI layer for the bike-share dashboard.
//!
//! Provides themes, the header and metric components, chart and RFM views,
//! and the interactive application loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod rfm_view;
pub mod themes;

pub use rental_core as core;

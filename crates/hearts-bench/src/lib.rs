//! Seeded tournament harness pitting the search bot against baselines.

pub mod analytics;
pub mod config;
pub mod logging;
pub mod tournament;

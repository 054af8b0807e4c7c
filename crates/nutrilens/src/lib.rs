//! NutriLens: personalized nutrition ratings for scanned food labels.
//!
//! [`scoring`] holds the pure rating engine, [`scans`] the service and HTTP surface
//! around it, and [`ledger`] the append-only record of every computed rating.

pub mod config;
pub mod error;
pub mod ledger;
pub mod scans;
pub mod scoring;
pub mod telemetry;

//! Referral rebate bookkeeping engine.
//!
//! Users are identified by numeric id, trades accrue fees, and a two-level
//! referral tree earns first-level and second-level commission on downstream
//! fees. The crate provides the referral graph, trade and rebate ledgers,
//! the hourly settlement calculator, and a ledger-vs-theoretical stats
//! reconciler, all behind a swappable [`store::Store`] seam.

pub mod calculator;
pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod query;
pub mod service;
pub mod stats;
pub mod store;

pub use error::{LedgerError, Result};

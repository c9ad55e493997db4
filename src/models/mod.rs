//! Shared models for the bookkeeping engine.
//!
//! One file per ledger: users and referral edges, trades, rebate records.

pub mod rebate;
pub mod trade;
pub mod user;

/// Numeric user id.
pub type Uid = u64;

/// Trade ledger id.
pub type TradeId = u64;

/// Rebate ledger id.
pub type RecordId = u64;

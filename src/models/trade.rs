//! Trade ledger models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{TradeId, Uid};

/// A single trade event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub uid: Uid,
    /// Gross traded amount.
    pub amount: Decimal,
    /// Fee charged on the trade; the base for rebate attribution.
    pub fee: Decimal,
    pub timestamp_ms: i64,
    /// Flips false→true exactly once when the hourly settlement picks the
    /// trade up, and never reverts.
    pub rebate_settled: bool,
}

//! Rebate ledger models.

use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::models::{RecordId, TradeId, Uid};

/// Referral distance between the trading user and the rebate recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RebateLevel {
    /// Direct inviter.
    First,
    /// Inviter of the inviter.
    Second,
}

impl RebateLevel {
    /// Wire representation used in record payloads (1 or 2).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            RebateLevel::First => 1,
            RebateLevel::Second => 2,
        }
    }
}

// Records carry the level as a plain integer, so the enum serializes as
// 1 or 2 rather than a variant name.
impl Serialize for RebateLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

impl<'de> Deserialize<'de> for RebateLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(RebateLevel::First),
            2 => Ok(RebateLevel::Second),
            other => Err(de::Error::custom(format!(
                "rebate level must be 1 or 2, got {other}"
            ))),
        }
    }
}

/// An append-only rebate ledger entry.
///
/// `amount` equals the source trade's fee times the configured rate for
/// `level`. Entries are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RebateRecord {
    pub id: RecordId,
    pub trade_id: TradeId,
    /// User whose trade generated the commission.
    pub from_uid: Uid,
    /// Upstream inviter the commission is paid to.
    pub to_uid: Uid,
    pub amount: Decimal,
    pub level: RebateLevel,
    /// Settlement time, not the trade time.
    pub timestamp_ms: i64,
}

/// A rebate entry before the ledger assigns its id.
#[derive(Debug, Clone)]
pub struct RebateDraft {
    pub trade_id: TradeId,
    pub from_uid: Uid,
    pub to_uid: Uid,
    pub amount: Decimal,
    pub level: RebateLevel,
    pub timestamp_ms: i64,
}

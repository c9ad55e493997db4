//! Hourly rebate settlement.
//!
//! Consumes the unsettled trades of one hour bucket, walks the referral
//! graph one and two levels up from each trading user, and appends the
//! resulting commission records to the rebate ledger in a single batch.
//! Each trade is settled at most once: the settled flag flips as part of
//! the pass, and selection filters on it, so re-running a bucket is a
//! no-op.

use tracing::debug;

use crate::config::RebateRates;
use crate::models::rebate::{RebateDraft, RebateLevel, RebateRecord};
use crate::store::Store;

/// One hour in milliseconds; the width of a settlement bucket.
pub const HOUR_MS: i64 = 3_600_000;

/// Floors a timestamp to the start of its hour bucket.
#[must_use]
pub fn bucket_start(ts_ms: i64) -> i64 {
    ts_ms - ts_ms.rem_euclid(HOUR_MS)
}

/// Outcome of settling one hour bucket.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Number of trades consumed from the bucket.
    pub trades_processed: usize,
    /// Records appended to the ledger, in emission order.
    pub records: Vec<RebateRecord>,
}

/// Settles every unsettled trade in the hour containing `bucket_ts_ms`.
///
/// Per trade: a level-1 record is emitted when a direct inviter exists
/// (amount = fee × first-level rate) and a level-2 record when the
/// inviter's inviter exists (amount = fee × second-level rate). Records
/// carry `now_ms` as their timestamp, not the trade time. A trade with no
/// upstream inviters is still marked settled and emits nothing.
///
/// The loop has no partial-failure semantics: drafts accumulate in memory
/// and land in the ledger as one batch at the end.
pub fn settle_bucket<S: Store + ?Sized>(
    store: &mut S,
    rates: &RebateRates,
    bucket_ts_ms: i64,
    now_ms: i64,
) -> Settlement {
    let start = bucket_start(bucket_ts_ms);
    let trades = store.unsettled_trades_in(start, start + HOUR_MS);

    let mut drafts = Vec::new();
    for trade in &trades {
        if let Some(inviter) = store.inviter_of(trade.uid) {
            drafts.push(RebateDraft {
                trade_id: trade.id,
                from_uid: trade.uid,
                to_uid: inviter,
                amount: trade.fee * rates.first_level,
                level: RebateLevel::First,
                timestamp_ms: now_ms,
            });
        }
        if let Some(grandparent) = store.second_level_inviter_of(trade.uid) {
            drafts.push(RebateDraft {
                trade_id: trade.id,
                from_uid: trade.uid,
                to_uid: grandparent,
                amount: trade.fee * rates.second_level,
                level: RebateLevel::Second,
                timestamp_ms: now_ms,
            });
        }
        store.mark_settled(trade.id);
    }

    let records = store.append_records(drafts);
    debug!(
        bucket_start_ms = start,
        trades = trades.len(),
        records = records.len(),
        "settled hour bucket"
    );
    Settlement {
        trades_processed: trades.len(),
        records,
    }
}

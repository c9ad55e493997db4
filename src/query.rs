//! Rebate ledger queries.
//!
//! Role-filtered record listings, level-split received totals, and the
//! per-invitee breakdown shown on a user's referral dashboard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RebateRates;
use crate::models::rebate::{RebateLevel, RebateRecord};
use crate::models::user::User;
use crate::models::{RecordId, Uid};
use crate::store::Store;

/// Which side of a rebate record a listing selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordRole {
    /// Records paid to the user.
    Received,
    /// Records generated by the user's own trades.
    Generated,
    /// Either side.
    #[default]
    Any,
}

/// Level-split totals over a record listing.
///
/// Totals only count amounts actually paid to the queried user, so a
/// `Generated` listing reports zero received totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    pub total: Decimal,
    pub first_level_total: Decimal,
    pub second_level_total: Decimal,
    pub count: usize,
}

/// Lists `uid`'s rebate records filtered by role, newest first.
pub fn records_for<S: Store + ?Sized>(
    store: &S,
    uid: Uid,
    role: RecordRole,
) -> (Vec<RebateRecord>, RecordStats) {
    let mut records = match role {
        RecordRole::Received => store.records_to(uid),
        RecordRole::Generated => store.records_from(uid),
        RecordRole::Any => {
            let mut both = store.records_to(uid);
            both.extend(
                store
                    .records_from(uid)
                    .into_iter()
                    .filter(|r| r.to_uid != uid),
            );
            both
        }
    };
    records.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));

    let received_at = |level: RebateLevel| -> Decimal {
        records
            .iter()
            .filter(|r| r.to_uid == uid && r.level == level)
            .map(|r| r.amount)
            .sum()
    };
    let first_level_total = received_at(RebateLevel::First);
    let second_level_total = received_at(RebateLevel::Second);

    let stats = RecordStats {
        total: first_level_total + second_level_total,
        first_level_total,
        second_level_total,
        count: records.len(),
    };
    (records, stats)
}

/// One direct invitee with the rebate contributions attributable to them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteeSummary {
    /// `None` when the referral edge points at an unknown user.
    pub user: Option<User>,
    pub trade_amount: Decimal,
    pub fees: Decimal,
    /// First-level rebate the queried user earns from this invitee's fees.
    pub first_level_rebate: Decimal,
    /// How many users this invitee has invited in turn.
    pub sub_invited_count: usize,
    /// Second-level rebate the queried user earns from those sub-invitees.
    pub second_level_rebate_from_sub_users: Decimal,
}

/// Breaks down `uid`'s direct invitees with trade totals and the rebate
/// attributable to each, theoretical (settled flag ignored).
pub fn invitee_summaries<S: Store + ?Sized>(
    store: &S,
    rates: &RebateRates,
    uid: Uid,
) -> Vec<InviteeSummary> {
    store
        .invitees_of(uid)
        .into_iter()
        .map(|invitee| {
            let trades = store.trades_of(invitee);
            let trade_amount = trades.iter().map(|t| t.amount).sum();
            let fees: Decimal = trades.iter().map(|t| t.fee).sum();

            let sub_invitees = store.invitees_of(invitee);
            let sub_fees: Decimal = sub_invitees
                .iter()
                .map(|sub| {
                    store
                        .trades_of(*sub)
                        .into_iter()
                        .map(|t| t.fee)
                        .sum::<Decimal>()
                })
                .sum();

            InviteeSummary {
                user: store.user(invitee),
                trade_amount,
                fees,
                first_level_rebate: fees * rates.first_level,
                sub_invited_count: sub_invitees.len(),
                second_level_rebate_from_sub_users: sub_fees * rates.second_level,
            }
        })
        .collect()
}

/// A recent rebate with the paying user embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRebate {
    pub id: RecordId,
    /// `None` when the payer is no longer a known user.
    pub from_user: Option<User>,
    pub amount: Decimal,
    pub level: RebateLevel,
    pub timestamp_ms: i64,
}

/// The `limit` newest rebates paid to `uid`.
pub fn recent_rebates<S: Store + ?Sized>(store: &S, uid: Uid, limit: usize) -> Vec<RecentRebate> {
    let mut received = store.records_to(uid);
    received.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    received
        .into_iter()
        .take(limit)
        .map(|r| RecentRebate {
            id: r.id,
            from_user: store.user(r.from_uid),
            amount: r.amount,
            level: r.level,
            timestamp_ms: r.timestamp_ms,
        })
        .collect()
}

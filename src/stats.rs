//! Ledger-vs-theoretical rebate reconciliation.
//!
//! The rebate ledger only reflects settled buckets, so a user's dashboard
//! total is reconciled against a theoretical value recomputed live from the
//! current trade data: per level, the full trade fees of every invitee at
//! that distance times the level rate, regardless of the settled flag. The
//! configured [`ReconcilePolicy`] decides how the two values combine.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{RebateConfig, RebateRates, ReconcilePolicy};
use crate::models::Uid;
use crate::models::rebate::RebateLevel;
use crate::store::Store;

/// Recorded and recomputed totals for one referral level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTotals {
    /// Sum of ledger record amounts paid to the user at this level.
    pub recorded: Decimal,
    /// Live recomputation from current trades and the referral graph.
    pub theoretical: Decimal,
}

impl LevelTotals {
    /// Applies the reconciliation policy to produce the displayed value.
    #[must_use]
    pub fn display(&self, policy: ReconcilePolicy) -> Decimal {
        match policy {
            ReconcilePolicy::Max => self.recorded.max(self.theoretical),
            ReconcilePolicy::Sum => self.recorded + self.theoretical,
        }
    }
}

/// Aggregate dashboard statistics for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_trade_amount: Decimal,
    pub total_fees: Decimal,
    pub direct_invited_count: usize,
    pub second_level_invited_count: usize,
    pub total_invited_count: usize,
    pub first_level_rebate: Decimal,
    pub second_level_rebate: Decimal,
    pub total_rebate: Decimal,
}

/// Sum of ledger rebate amounts paid to `uid` at `level`.
pub fn recorded_rebate<S: Store + ?Sized>(store: &S, uid: Uid, level: RebateLevel) -> Decimal {
    store
        .records_to(uid)
        .into_iter()
        .filter(|r| r.level == level)
        .map(|r| r.amount)
        .sum()
}

/// Theoretical rebate for `uid` at `level`: the full trade fees of every
/// invitee at that distance times the level rate, settled or not.
pub fn theoretical_rebate<S: Store + ?Sized>(
    store: &S,
    rates: &RebateRates,
    uid: Uid,
    level: RebateLevel,
) -> Decimal {
    let invitees = match level {
        RebateLevel::First => store.invitees_of(uid),
        RebateLevel::Second => store.second_level_invitees_of(uid),
    };
    let fees: Decimal = invitees
        .into_iter()
        .map(|invitee| {
            store
                .trades_of(invitee)
                .into_iter()
                .map(|t| t.fee)
                .sum::<Decimal>()
        })
        .sum();
    fees * rates.rate(level)
}

/// Both totals for `uid` at `level`.
pub fn level_totals<S: Store + ?Sized>(
    store: &S,
    rates: &RebateRates,
    uid: Uid,
    level: RebateLevel,
) -> LevelTotals {
    LevelTotals {
        recorded: recorded_rebate(store, uid, level),
        theoretical: theoretical_rebate(store, rates, uid, level),
    }
}

/// Full dashboard statistics for `uid`.
pub fn user_stats<S: Store + ?Sized>(store: &S, config: &RebateConfig, uid: Uid) -> UserStats {
    let trades = store.trades_of(uid);
    let total_trade_amount = trades.iter().map(|t| t.amount).sum();
    let total_fees = trades.iter().map(|t| t.fee).sum();

    let direct_invited_count = store.invitees_of(uid).len();
    let second_level_invited_count = store.second_level_invitees_of(uid).len();

    let first_level_rebate =
        level_totals(store, &config.rates, uid, RebateLevel::First).display(config.reconcile);
    let second_level_rebate =
        level_totals(store, &config.rates, uid, RebateLevel::Second).display(config.reconcile);

    UserStats {
        total_trade_amount,
        total_fees,
        direct_invited_count,
        second_level_invited_count,
        total_invited_count: direct_invited_count + second_level_invited_count,
        first_level_rebate,
        second_level_rebate,
        total_rebate: first_level_rebate + second_level_rebate,
    }
}

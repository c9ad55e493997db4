//! Repository layer over users, referral edges, trades, and rebate records.
//!
//! [`Store`] is the seam between the bookkeeping logic and whatever holds
//! the data. Methods return owned rows so implementations are free to
//! materialize them from any backend; the calculator and query code never
//! touch storage internals. [`MemoryStore`] is the Vec-backed
//! implementation used by the demo and the tests. Mutation is
//! single-writer; implementations are not required to be thread-safe.

use rust_decimal::Decimal;

use crate::graph::ReferralGraph;
use crate::models::rebate::{RebateDraft, RebateRecord};
use crate::models::trade::Trade;
use crate::models::user::{ReferralEdge, User};
use crate::models::{TradeId, Uid};

/// Storage seam for the bookkeeping engine.
///
/// Every store is also a [`ReferralGraph`] over its edge set.
pub trait Store: ReferralGraph {
    /// Looks up a user by id.
    fn user(&self, uid: Uid) -> Option<User>;

    /// All trades submitted by `uid`, in insertion order.
    fn trades_of(&self, uid: Uid) -> Vec<Trade>;

    /// Trades with a timestamp in `[start_ms, end_ms)` that have not been
    /// rebate-settled yet.
    fn unsettled_trades_in(&self, start_ms: i64, end_ms: i64) -> Vec<Trade>;

    /// Appends a new trade and returns it with its assigned id.
    fn append_trade(
        &mut self,
        uid: Uid,
        amount: Decimal,
        fee: Decimal,
        timestamp_ms: i64,
    ) -> Trade;

    /// Flips the settled flag on the given trade. Already-settled trades
    /// stay settled; unknown ids are ignored.
    fn mark_settled(&mut self, trade_id: TradeId);

    /// Appends a batch of rebate drafts to the ledger, assigning ids, and
    /// returns the stored records.
    fn append_records(&mut self, drafts: Vec<RebateDraft>) -> Vec<RebateRecord>;

    /// Rebate records paid to `uid`.
    fn records_to(&self, uid: Uid) -> Vec<RebateRecord>;

    /// Rebate records generated by `uid`'s trades.
    fn records_from(&self, uid: Uid) -> Vec<RebateRecord>;
}

/// Vec-backed store with monotonic id assignment.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    users: Vec<User>,
    edges: Vec<ReferralEdge>,
    trades: Vec<Trade>,
    records: Vec<RebateRecord>,
    next_trade_id: TradeId,
    next_record_id: u64,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            edges: Vec::new(),
            trades: Vec::new(),
            records: Vec::new(),
            next_trade_id: 1,
            next_record_id: 1,
        }
    }

    /// Creates a store pre-populated with users and referral edges.
    #[must_use]
    pub fn with_users(users: Vec<User>, edges: Vec<ReferralEdge>) -> Self {
        Self {
            users,
            edges,
            ..Self::new()
        }
    }

    /// Creates the demo dataset: eight users in a three-deep referral
    /// forest, with eleven historical trades spread over the last ten days
    /// relative to `now_ms`.
    #[must_use]
    pub fn seeded(now_ms: i64) -> Self {
        const DAY_MS: i64 = 86_400_000;

        let names = [
            "alice", "bruno", "chen", "dora", "emil", "freya", "goran", "hana",
        ];
        let users = names
            .iter()
            .enumerate()
            .map(|(i, name)| User {
                uid: i as Uid + 1,
                name: (*name).to_string(),
                avatar: Some(format!("/avatars/user{}.png", i + 1)),
            })
            .collect();

        // (uid, inviter) — alice is the root of the main tree.
        let relations: [(Uid, Option<Uid>); 8] = [
            (1, None),
            (2, Some(1)),
            (3, Some(2)),
            (4, Some(1)),
            (5, Some(2)),
            (6, Some(3)),
            (7, Some(3)),
            (8, Some(4)),
        ];
        let edges = relations
            .iter()
            .map(|(uid, inviter_uid)| ReferralEdge {
                uid: *uid,
                inviter_uid: *inviter_uid,
            })
            .collect();

        let mut store = Self::with_users(users, edges);

        // (uid, amount, fee, days ago)
        let rows: [(Uid, i64, i64, i64); 11] = [
            (1, 5_000, 50, 5),
            (1, 3_000, 30, 4),
            (2, 7_000, 70, 3),
            (2, 4_000, 40, 2),
            (3, 9_000, 90, 1),
            (3, 6_000, 60, 0),
            (4, 8_000, 80, 6),
            (5, 10_000, 100, 7),
            (6, 12_000, 120, 8),
            (7, 15_000, 150, 9),
            (8, 20_000, 200, 10),
        ];
        for (uid, amount, fee, days_ago) in rows {
            store.append_trade(
                uid,
                Decimal::from(amount),
                Decimal::from(fee),
                now_ms - days_ago * DAY_MS,
            );
        }
        store
    }

    /// Full trade ledger, in insertion order.
    #[must_use]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Full rebate ledger, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[RebateRecord] {
        &self.records
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferralGraph for MemoryStore {
    fn inviter_of(&self, uid: Uid) -> Option<Uid> {
        self.edges
            .iter()
            .find(|edge| edge.uid == uid)
            .and_then(|edge| edge.inviter_uid)
    }

    fn invitees_of(&self, uid: Uid) -> Vec<Uid> {
        self.edges
            .iter()
            .filter(|edge| edge.inviter_uid == Some(uid))
            .map(|edge| edge.uid)
            .collect()
    }
}

impl Store for MemoryStore {
    fn user(&self, uid: Uid) -> Option<User> {
        self.users.iter().find(|u| u.uid == uid).cloned()
    }

    fn trades_of(&self, uid: Uid) -> Vec<Trade> {
        self.trades.iter().filter(|t| t.uid == uid).cloned().collect()
    }

    fn unsettled_trades_in(&self, start_ms: i64, end_ms: i64) -> Vec<Trade> {
        self.trades
            .iter()
            .filter(|t| {
                !t.rebate_settled && t.timestamp_ms >= start_ms && t.timestamp_ms < end_ms
            })
            .cloned()
            .collect()
    }

    fn append_trade(
        &mut self,
        uid: Uid,
        amount: Decimal,
        fee: Decimal,
        timestamp_ms: i64,
    ) -> Trade {
        let trade = Trade {
            id: self.next_trade_id,
            uid,
            amount,
            fee,
            timestamp_ms,
            rebate_settled: false,
        };
        self.next_trade_id += 1;
        self.trades.push(trade.clone());
        trade
    }

    fn mark_settled(&mut self, trade_id: TradeId) {
        if let Some(trade) = self.trades.iter_mut().find(|t| t.id == trade_id) {
            trade.rebate_settled = true;
        }
    }

    fn append_records(&mut self, drafts: Vec<RebateDraft>) -> Vec<RebateRecord> {
        let mut stored = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let record = RebateRecord {
                id: self.next_record_id,
                trade_id: draft.trade_id,
                from_uid: draft.from_uid,
                to_uid: draft.to_uid,
                amount: draft.amount,
                level: draft.level,
                timestamp_ms: draft.timestamp_ms,
            };
            self.next_record_id += 1;
            stored.push(record);
        }
        self.records.extend(stored.iter().cloned());
        stored
    }

    fn records_to(&self, uid: Uid) -> Vec<RebateRecord> {
        self.records
            .iter()
            .filter(|r| r.to_uid == uid)
            .cloned()
            .collect()
    }

    fn records_from(&self, uid: Uid) -> Vec<RebateRecord> {
        self.records
            .iter()
            .filter(|r| r.from_uid == uid)
            .cloned()
            .collect()
    }
}

//! Endpoint-shaped operations over an injected store.
//!
//! One synchronous function per conceptual endpoint of the bookkeeping
//! service: login by id, trade submission, hour-bucket settlement, record
//! listings, and the dashboard overview. Callers supply the current time so
//! every operation stays deterministic under test; the hourly scheduler
//! entry point ([`run_hourly`]) is the only one that derives a bucket from
//! it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculator::settle_bucket;
use crate::config::RebateConfig;
use crate::models::Uid;
use crate::models::rebate::RebateRecord;
use crate::models::trade::Trade;
use crate::models::user::User;
use crate::query::{self, InviteeSummary, RecentRebate, RecordRole, RecordStats};
use crate::stats::{self, UserStats};
use crate::store::Store;
use crate::{LedgerError, Result};

/// How many entries the dashboard's recent-rebates list shows.
const RECENT_REBATE_LIMIT: usize = 5;

/// Login request. Existence check only; no credential verification.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    pub uid: Uid,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
}

/// Logs a user in by id.
///
/// # Errors
///
/// [`LedgerError::UserNotFound`] for unknown ids.
pub fn authenticate<S: Store + ?Sized>(store: &S, req: &AuthRequest) -> Result<AuthResponse> {
    let user = store
        .user(req.uid)
        .ok_or(LedgerError::UserNotFound(req.uid))?;
    Ok(AuthResponse {
        success: true,
        user,
    })
}

/// Trade submission request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTradeRequest {
    pub uid: Uid,
    pub amount: Decimal,
    pub fee: Decimal,
}

/// Successful trade submission response.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTradeResponse {
    pub success: bool,
    pub trade: Trade,
}

/// Appends a trade for an existing user.
///
/// # Errors
///
/// [`LedgerError::BadRequest`] unless both amount and fee are positive;
/// [`LedgerError::UserNotFound`] for unknown ids.
pub fn create_trade<S: Store + ?Sized>(
    store: &mut S,
    req: &CreateTradeRequest,
    now_ms: i64,
) -> Result<CreateTradeResponse> {
    if req.amount <= Decimal::ZERO || req.fee <= Decimal::ZERO {
        return Err(LedgerError::BadRequest(
            "amount and fee must be positive".to_string(),
        ));
    }
    if store.user(req.uid).is_none() {
        return Err(LedgerError::UserNotFound(req.uid));
    }
    let trade = store.append_trade(req.uid, req.amount, req.fee, now_ms);
    info!(uid = req.uid, trade_id = trade.id, "trade recorded");
    Ok(CreateTradeResponse {
        success: true,
        trade,
    })
}

/// Settlement request for one hour bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    /// RFC 3339 timestamp anywhere inside the hour to settle.
    pub hour: String,
}

/// Settlement response.
#[derive(Debug, Clone, Serialize)]
pub struct CalculateResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub records: Vec<RebateRecord>,
}

/// Settles the hour bucket named by the request.
///
/// # Errors
///
/// [`LedgerError::BadRequest`] when the hour parameter is missing or not an
/// RFC 3339 timestamp.
pub fn calculate_rebates<S: Store + ?Sized>(
    store: &mut S,
    config: &RebateConfig,
    req: &CalculateRequest,
    now_ms: i64,
) -> Result<CalculateResponse> {
    if req.hour.is_empty() {
        return Err(LedgerError::BadRequest(
            "missing hour parameter".to_string(),
        ));
    }
    let hour: DateTime<Utc> = req.hour.parse().map_err(|e| {
        warn!(hour = %req.hour, "unparsable settlement hour");
        LedgerError::BadRequest(format!("invalid hour timestamp `{}`: {e}", req.hour))
    })?;

    let settlement = settle_bucket(store, &config.rates, hour.timestamp_millis(), now_ms);
    if settlement.trades_processed == 0 {
        return Ok(CalculateResponse {
            success: true,
            message: "no unsettled trades in this hour".to_string(),
            count: 0,
            records: Vec::new(),
        });
    }
    info!(
        count = settlement.trades_processed,
        records = settlement.records.len(),
        "rebate settlement complete"
    );
    Ok(CalculateResponse {
        success: true,
        message: "rebate settlement complete".to_string(),
        count: settlement.trades_processed,
        records: settlement.records,
    })
}

/// Record listing request.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsRequest {
    pub uid: Uid,
    #[serde(default)]
    pub role: RecordRole,
}

/// Record listing response: records newest first plus received totals.
#[derive(Debug, Clone, Serialize)]
pub struct RecordsResponse {
    pub success: bool,
    pub user: User,
    pub records: Vec<RebateRecord>,
    pub stats: RecordStats,
}

/// Lists rebate records for an existing user, filtered by role.
///
/// # Errors
///
/// [`LedgerError::UserNotFound`] for unknown ids.
pub fn rebate_records<S: Store + ?Sized>(store: &S, req: &RecordsRequest) -> Result<RecordsResponse> {
    let user = store
        .user(req.uid)
        .ok_or(LedgerError::UserNotFound(req.uid))?;
    let (records, stats) = query::records_for(store, req.uid, req.role);
    Ok(RecordsResponse {
        success: true,
        user,
        records,
        stats,
    })
}

/// The user's upstream inviters, both levels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviterInfo {
    pub first_level: Option<User>,
    pub second_level: Option<User>,
}

/// Commission rates rendered as display percentages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebateRatesView {
    pub first_level: String,
    pub second_level: String,
}

/// Full dashboard payload for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOverview {
    pub success: bool,
    pub user: User,
    pub inviter_info: InviterInfo,
    pub stats: UserStats,
    pub rebate_rates: RebateRatesView,
    pub invited_users: Vec<InviteeSummary>,
    pub recent_rebates: Vec<RecentRebate>,
}

/// Assembles the dashboard overview: user, inviters, reconciled stats,
/// rates, invitee breakdown, and the newest received rebates.
///
/// # Errors
///
/// [`LedgerError::UserNotFound`] for unknown ids.
pub fn user_overview<S: Store + ?Sized>(
    store: &S,
    config: &RebateConfig,
    uid: Uid,
) -> Result<UserOverview> {
    let user = store.user(uid).ok_or(LedgerError::UserNotFound(uid))?;

    let inviter_info = InviterInfo {
        first_level: store.inviter_of(uid).and_then(|up| store.user(up)),
        second_level: store.second_level_inviter_of(uid).and_then(|up| store.user(up)),
    };

    Ok(UserOverview {
        success: true,
        user,
        inviter_info,
        stats: stats::user_stats(store, config, uid),
        rebate_rates: RebateRatesView {
            first_level: percent(config.rates.first_level),
            second_level: percent(config.rates.second_level),
        },
        invited_users: query::invitee_summaries(store, &config.rates, uid),
        recent_rebates: query::recent_rebates(store, uid, RECENT_REBATE_LIMIT),
    })
}

/// Entry point for the external hourly scheduler: settles the bucket
/// containing `now_ms`.
///
/// # Errors
///
/// [`LedgerError::BadRequest`] when `now_ms` is outside the representable
/// timestamp range.
pub fn run_hourly<S: Store + ?Sized>(
    store: &mut S,
    config: &RebateConfig,
    now_ms: i64,
) -> Result<CalculateResponse> {
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms)
        .ok_or_else(|| LedgerError::BadRequest(format!("timestamp {now_ms} out of range")))?;
    let req = CalculateRequest {
        hour: now.to_rfc3339(),
    };
    calculate_rebates(store, config, &req, now_ms)
}

/// Formats a rate fraction as a display percentage, e.g. `0.10` → `10%`.
fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

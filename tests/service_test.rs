//! Service-level tests: endpoint semantics and error kinds.

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use rebatebook::LedgerError;
use rebatebook::config::RebateConfig;
use rebatebook::query::RecordRole;
use rebatebook::service::{
    AuthRequest, CalculateRequest, CreateTradeRequest, RecordsRequest, authenticate,
    calculate_rebates, create_trade, rebate_records, run_hourly, user_overview,
};
use rebatebook::store::MemoryStore;

const DAY_MS: i64 = 86_400_000;

fn now_ms() -> i64 {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0)
        .unwrap()
        .timestamp_millis()
}

#[test]
fn authenticate_is_an_existence_check() {
    let store = MemoryStore::seeded(now_ms());

    let ok = authenticate(&store, &AuthRequest { uid: 3 }).unwrap();
    assert!(ok.success);
    assert_eq!(ok.user.name, "chen");

    let err = authenticate(&store, &AuthRequest { uid: 99 }).unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(99)));
}

#[test]
fn create_trade_validates_and_appends() {
    let now = now_ms();
    let mut store = MemoryStore::seeded(now);

    let resp = create_trade(
        &mut store,
        &CreateTradeRequest {
            uid: 5,
            amount: dec!(2500),
            fee: dec!(25),
        },
        now,
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(resp.trade.id, 12);
    assert_eq!(resp.trade.timestamp_ms, now);
    assert!(!resp.trade.rebate_settled);

    let err = create_trade(
        &mut store,
        &CreateTradeRequest {
            uid: 5,
            amount: dec!(0),
            fee: dec!(25),
        },
        now,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::BadRequest(_)));

    let err = create_trade(
        &mut store,
        &CreateTradeRequest {
            uid: 42,
            amount: dec!(100),
            fee: dec!(1),
        },
        now,
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(42)));
}

#[test]
fn calculate_rejects_bad_hour_parameters() {
    let mut store = MemoryStore::seeded(now_ms());
    let config = RebateConfig::default();

    let err = calculate_rebates(
        &mut store,
        &config,
        &CalculateRequest {
            hour: String::new(),
        },
        now_ms(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::BadRequest(_)));

    let err = calculate_rebates(
        &mut store,
        &config,
        &CalculateRequest {
            hour: "last tuesday".to_string(),
        },
        now_ms(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::BadRequest(_)));
}

#[test]
fn calculate_settles_the_named_hour() {
    let now = now_ms();
    let mut store = MemoryStore::seeded(now);
    let config = RebateConfig::default();

    // the fee-90 trade of chen (uid 3) is exactly one day back
    let hour = Utc
        .timestamp_millis_opt(now - DAY_MS)
        .unwrap()
        .to_rfc3339();
    let resp = calculate_rebates(&mut store, &config, &CalculateRequest { hour }, now).unwrap();
    assert!(resp.success);
    assert_eq!(resp.count, 1);
    assert_eq!(resp.records.len(), 2);

    // settling the same hour again finds nothing
    let hour = Utc
        .timestamp_millis_opt(now - DAY_MS)
        .unwrap()
        .to_rfc3339();
    let again = calculate_rebates(&mut store, &config, &CalculateRequest { hour }, now).unwrap();
    assert!(again.success);
    assert_eq!(again.count, 0);
    assert!(again.records.is_empty());
    assert_eq!(again.message, "no unsettled trades in this hour");
}

#[test]
fn run_hourly_settles_the_current_bucket() {
    let now = now_ms();
    let mut store = MemoryStore::seeded(now);
    let config = RebateConfig::default();

    // the seed has exactly one trade in the current hour (chen, fee 60)
    let resp = run_hourly(&mut store, &config, now).unwrap();
    assert_eq!(resp.count, 1);
    assert_eq!(resp.records[0].amount, dec!(6.0));
    assert_eq!(resp.records[0].to_uid, 2);
}

#[test]
fn received_listing_is_filtered_and_newest_first() {
    let now = now_ms();
    let mut store = MemoryStore::seeded(now);
    let config = RebateConfig::default();

    // settle two buckets at different settlement times so the ledger
    // carries distinct record timestamps
    let day_back = Utc
        .timestamp_millis_opt(now - DAY_MS)
        .unwrap()
        .to_rfc3339();
    calculate_rebates(
        &mut store,
        &config,
        &CalculateRequest { hour: day_back },
        now - 1_000,
    )
    .unwrap();
    run_hourly(&mut store, &config, now).unwrap();

    let resp = rebate_records(
        &store,
        &RecordsRequest {
            uid: 1,
            role: RecordRole::Received,
        },
    )
    .unwrap();
    assert!(resp.records.iter().all(|r| r.to_uid == 1));
    assert!(
        resp.records
            .windows(2)
            .all(|pair| pair[0].timestamp_ms >= pair[1].timestamp_ms)
    );
    // both settled trades came from chen, two hops below alice
    assert_eq!(resp.stats.second_level_total, dec!(7.5));

    let err = rebate_records(
        &store,
        &RecordsRequest {
            uid: 99,
            role: RecordRole::Any,
        },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(99)));
}

#[test]
fn overview_reports_theoretical_value_before_settlement() {
    let store = MemoryStore::seeded(now_ms());
    let config = RebateConfig::default();

    let overview = user_overview(&store, &config, 1).unwrap();
    assert!(overview.success);
    assert_eq!(overview.user.name, "alice");

    // ledger is empty, yet the dashboard shows the recomputed totals
    assert_eq!(overview.stats.first_level_rebate, dec!(19.0));
    assert_eq!(overview.stats.second_level_rebate, dec!(22.5));
    assert_eq!(overview.stats.total_rebate, dec!(41.5));
    assert!(overview.recent_rebates.is_empty());

    assert_eq!(overview.rebate_rates.first_level, "10%");
    assert_eq!(overview.rebate_rates.second_level, "5%");
    assert_eq!(overview.invited_users.len(), 2);
}

#[test]
fn overview_embeds_both_inviter_levels() {
    let store = MemoryStore::seeded(now_ms());
    let config = RebateConfig::default();

    let overview = user_overview(&store, &config, 3).unwrap();
    let first = overview.inviter_info.first_level.unwrap();
    let second = overview.inviter_info.second_level.unwrap();
    assert_eq!(first.uid, 2);
    assert_eq!(second.uid, 1);

    let root = user_overview(&store, &config, 1).unwrap();
    assert!(root.inviter_info.first_level.is_none());
    assert!(root.inviter_info.second_level.is_none());
}

#[test]
fn overview_recent_rebates_embed_payer() {
    let now = now_ms();
    let mut store = MemoryStore::seeded(now);
    let config = RebateConfig::default();

    run_hourly(&mut store, &config, now).unwrap();

    let overview = user_overview(&store, &config, 2).unwrap();
    assert_eq!(overview.recent_rebates.len(), 1);
    let rebate = &overview.recent_rebates[0];
    assert_eq!(rebate.from_user.as_ref().unwrap().uid, 3);
    assert_eq!(rebate.amount, dec!(6.0));
}

#[test]
fn overview_serializes_with_camel_case_keys() {
    let store = MemoryStore::seeded(now_ms());
    let config = RebateConfig::default();

    let overview = user_overview(&store, &config, 1).unwrap();
    let json = serde_json::to_value(&overview).unwrap();
    assert!(json["stats"]["totalTradeAmount"].is_string());
    assert!(json["rebateRates"]["firstLevel"].is_string());
    assert!(json["invitedUsers"].is_array());
    assert!(json["recentRebates"].is_array());
}

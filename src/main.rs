use chrono::Utc;
use rust_decimal::Decimal;

use rebatebook::LedgerError;
use rebatebook::config::fetch_config;
use rebatebook::service::{self, CreateTradeRequest};
use rebatebook::store::MemoryStore;

fn main() -> Result<(), LedgerError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let config = fetch_config()?;
    let now_ms = Utc::now().timestamp_millis();
    let mut store = MemoryStore::seeded(now_ms);

    // Submit one fresh trade, then run the settlement the external
    // scheduler would trigger for the current hour.
    service::create_trade(
        &mut store,
        &CreateTradeRequest {
            uid: 3,
            amount: Decimal::from(6_000),
            fee: Decimal::from(60),
        },
        now_ms,
    )?;
    let settled = service::run_hourly(&mut store, &config, now_ms)?;
    println!("{}", serde_json::to_string_pretty(&settled)?);

    let overview = service::user_overview(&store, &config, 2)?;
    println!("{}", serde_json::to_string_pretty(&overview)?);

    Ok(())
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cafeadmin_core` linkage and configuration loading.
//! - Run one simulated cash sale against the configured state store.
//!
//! Set `CAFEADMIN_LOG_DIR` (absolute) to also exercise file logging.

use cafeadmin_core::db::{open_db, open_db_in_memory};
use cafeadmin_core::{
    init_logging, AdminConfig, CashRegisterSimulator, LogLevel, SqliteKvStore, SystemClock,
    TenderType,
};
use log::info;
use std::error::Error;
use std::sync::Arc;

const PROBE_OPENING_FLOAT: i64 = 75_000;
const PROBE_SALE: i64 = 2_500;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cafeadmin_core ping={}", cafeadmin_core::ping());
    println!("cafeadmin_core version={}", cafeadmin_core::core_version());

    if let Ok(log_dir) = std::env::var("CAFEADMIN_LOG_DIR") {
        init_logging(LogLevel::build_default().as_str(), &log_dir)?;
    }

    let config = AdminConfig::from_env()?;
    println!("api_base_url={}", config.api_base_url);

    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let clock = Arc::new(SystemClock);
    let mut register = CashRegisterSimulator::new(
        SqliteKvStore::new(&conn, clock.clone()),
        config.cash_state_key.as_str(),
        clock,
    );

    if register.state()?.map_or(true, |state| !state.is_open) {
        register.initialize(PROBE_OPENING_FLOAT)?;
    }
    let accepted = register.simulate(PROBE_SALE, TenderType::Cash)?;
    info!("event=cli_probe module=cli status=ok sale_accepted={accepted}");

    if let Some(state) = register.state()? {
        println!(
            "cash_on_hand={} total_sales={} movements={}",
            state.cash_on_hand,
            state.total_sales,
            state.movements.len()
        );
    }
    Ok(())
}

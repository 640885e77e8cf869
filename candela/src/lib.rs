//! candela
//!
//! Derivatives market-data collection pipeline. One collection run fetches
//! klines, open-interest history, and funding-rate history for a coin list
//! from Binance and Bybit, merges the three series per symbol, and formats
//! a cache-ready snapshot. A separate aggregation entry point derives
//! coarse UTC-aligned timeframes (8h, 1d) from an already-cached base
//! snapshot without re-fetching.
//!
//! ```no_run
//! use candela::collect_and_store;
//! use candela_core::MemoryStore;
//! use candela_exchange::ExchangeClient;
//! use candela_types::{Coin, CollectorConfig};
//!
//! # async fn run() -> Result<(), candela_types::CandelaError> {
//! let config = CollectorConfig::default();
//! let client = ExchangeClient::new(&config);
//! let store = MemoryStore::new();
//! let coins = vec![Coin::new("BTCUSDT", &["binance"])];
//!
//! collect_and_store(&client, &store, &coins, "4h", None, &config).await?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

/// End-to-end collection and target-aggregation runs.
pub mod pipeline;
/// Fetch-task planning.
pub mod tasks;

pub use pipeline::{collect_and_store, collect_market_data, generate_target_snapshot};
pub use tasks::{prepare_tasks, BINANCE_FR_TIMEFRAMES, FR_LIMIT, OI_LIMIT};

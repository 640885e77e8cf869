//! Fetch-task planning for one collection run.
//!
//! For every coin in the source list, exactly one exchange is elected and
//! up to three tasks (klines, open interest, funding rate) are planned
//! against it. Election and URL construction happen here, up front, so
//! that nothing downstream can fail on an unresolvable exchange.

use candela_exchange::{Exchange, ExchangeEndpoints, Task};
use candela_types::{Coin, CollectorConfig, DataType};
use tracing::{debug, warn};

/// Open-interest history request size.
pub const OI_LIMIT: u32 = 500;
/// Funding-rate history request size.
pub const FR_LIMIT: u32 = 400;
/// Binance funding data is only collected for these run timeframes; at
/// finer granularities the 8h-spaced settlements add nothing per candle.
pub const BINANCE_FR_TIMEFRAMES: &[&str] = &["4h", "8h"];

/// Plan the fetch tasks for a collection run.
///
/// Coins that cannot be routed (no symbol, no recognizable exchange, or
/// the BTCUSDT bybit exclusion) are skipped with a warning rather than
/// failing the run.
#[must_use]
pub fn prepare_tasks(
    coins: &[Coin],
    timeframe: &str,
    config: &CollectorConfig,
    endpoints: &ExchangeEndpoints,
) -> Vec<Task> {
    let mut tasks = Vec::new();

    for coin in coins {
        if coin.symbol.is_empty() {
            warn!("skipping coin without a symbol");
            continue;
        }
        let Some(exchange) = elect_exchange(coin) else {
            continue;
        };

        for data_type in [DataType::Klines, DataType::OpenInterest, DataType::FundingRate] {
            if let Some(task) = plan_task(coin, exchange, data_type, timeframe, config, endpoints) {
                tasks.push(task);
            }
        }
    }

    tasks
}

/// Pick the exchange for a coin: binance when listed, bybit otherwise.
///
/// BTCUSDT is never routed to bybit; its bybit perpetual's numbers diverge
/// enough from the reference market to poison merged series.
fn elect_exchange(coin: &Coin) -> Option<Exchange> {
    let listed: Vec<Exchange> = coin
        .exchanges
        .iter()
        .filter_map(|name| Exchange::from_name(name))
        .collect();

    if listed.is_empty() {
        warn!(symbol = %coin.symbol, "skipping coin with no supported exchange");
        return None;
    }
    if listed.contains(&Exchange::Binance) {
        return Some(Exchange::Binance);
    }
    if coin.symbol == "BTCUSDT" {
        warn!("BTCUSDT is only collected from binance; skipping bybit-only listing");
        return None;
    }
    Some(Exchange::Bybit)
}

fn plan_task(
    coin: &Coin,
    exchange: Exchange,
    data_type: DataType,
    timeframe: &str,
    config: &CollectorConfig,
    endpoints: &ExchangeEndpoints,
) -> Option<Task> {
    let (request_timeframe, limit) = match data_type {
        DataType::Klines => (timeframe.to_string(), config.klines_limit(timeframe)),
        // OI history has a coarse floor: hourly runs get hourly granularity,
        // everything else 4h.
        DataType::OpenInterest => {
            let period = if timeframe == "1h" { "1h" } else { "4h" };
            (period.to_string(), OI_LIMIT)
        }
        DataType::FundingRate => {
            if exchange == Exchange::Binance && !BINANCE_FR_TIMEFRAMES.contains(&timeframe) {
                debug!(
                    symbol = %coin.symbol,
                    timeframe,
                    "funding rate not collected at this timeframe"
                );
                return None;
            }
            (timeframe.to_string(), FR_LIMIT)
        }
    };

    let url = endpoints.url_for(exchange, data_type, &coin.symbol, &request_timeframe, limit);
    Some(Task {
        symbol: coin.symbol.clone(),
        exchange,
        data_type,
        url,
        request_timeframe,
        limit,
        original_timeframe: timeframe.to_string(),
    })
}

//! End-to-end collection and target-aggregation runs.
//!
//! A collection run plans tasks, fetches them with per-exchange
//! concurrency gates, merges each symbol's series, and formats the final
//! snapshot. Individual task failures degrade to absent data; the run
//! itself fails only when nothing at all was collected or the
//! configuration is wrong.

use std::collections::HashMap;
use std::sync::Arc;

use candela_core::{aggregate_to_target, format_snapshot, interval_duration_ms, merge_series};
use candela_core::SnapshotStore;
use candela_exchange::{parse_payload, Exchange, ExchangeClient, Parsed};
use candela_types::{
    CandelaError, Coin, CollectorConfig, MarketSnapshot, SeriesBundle, SymbolSeries,
};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::tasks::prepare_tasks;

/// Run one collection cycle and return the formatted snapshot.
///
/// `symbol_filter`, when given, restricts the run to the named symbols.
///
/// # Errors
/// `UnknownTimeframe` when `timeframe` has no interval entry, `NoData`
/// when no symbol yielded any candles.
pub async fn collect_market_data(
    client: &ExchangeClient,
    coins: &[Coin],
    timeframe: &str,
    symbol_filter: Option<&[String]>,
    config: &CollectorConfig,
) -> Result<MarketSnapshot, CandelaError> {
    if interval_duration_ms(timeframe).is_none() {
        return Err(CandelaError::unknown_timeframe(timeframe));
    }

    let selected: Vec<Coin> = match symbol_filter {
        Some(symbols) => coins
            .iter()
            .filter(|c| symbols.contains(&c.symbol))
            .cloned()
            .collect(),
        None => coins.to_vec(),
    };

    let tasks = prepare_tasks(&selected, timeframe, config, client.endpoints());
    info!(timeframe, tasks = tasks.len(), coins = selected.len(), "collection run planned");

    let gates: HashMap<Exchange, Arc<Semaphore>> = [Exchange::Binance, Exchange::Bybit]
        .into_iter()
        .map(|ex| (ex, Arc::new(Semaphore::new(config.concurrency_limit))))
        .collect();

    let fetches = tasks.iter().map(|task| {
        let gate = Arc::clone(&gates[&task.exchange]);
        async move { client.fetch_task(task, &gate).await }
    });
    let payloads = join_all(fetches).await;

    // Fold every fetched series into its symbol's bundle. Results come back
    // positionally aligned with the task list.
    let mut bundles: HashMap<String, SeriesBundle> = HashMap::new();
    let mut sources: HashMap<String, Exchange> = HashMap::new();
    for (task, payload) in tasks.iter().zip(payloads) {
        let Some(payload) = payload else {
            warn!(symbol = %task.symbol, data_type = %task.data_type, "fetch produced no payload");
            continue;
        };
        let parsed = match parse_payload(
            task.exchange,
            task.data_type,
            &payload,
            &task.request_timeframe,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(symbol = %task.symbol, data_type = %task.data_type, error = %err, "payload discarded");
                continue;
            }
        };

        sources.insert(task.symbol.clone(), task.exchange);
        let bundle = bundles.entry(task.symbol.clone()).or_default();
        match parsed {
            Parsed::Klines(klines) => bundle.klines.extend(klines),
            Parsed::OpenInterest(oi) => bundle.oi.extend(oi),
            Parsed::FundingRate(fr) => bundle.fr.extend(fr),
        }
    }

    let trim_last = config.trims(timeframe);
    let mut results = Vec::with_capacity(bundles.len());
    for (symbol, mut bundle) in bundles {
        bundle.klines.sort_by_key(|c| c.open_time);
        // The newest candle is still forming at these timeframes; drop it so
        // cached series only contain closed candles.
        if trim_last {
            bundle.klines.pop();
        }
        if bundle.klines.is_empty() {
            debug!(symbol = %symbol, "no klines survived; symbol omitted");
            continue;
        }

        let data = merge_series(bundle, timeframe)?;
        let exchanges = sources
            .get(&symbol)
            .map(|ex| vec![ex.name().to_string()])
            .unwrap_or_default();
        results.push(SymbolSeries {
            symbol,
            data,
            exchanges,
        });
    }
    results.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let snapshot = format_snapshot(results, timeframe);
    if snapshot.is_empty() {
        return Err(CandelaError::no_data(format!("{timeframe} collection run")));
    }
    Ok(snapshot)
}

/// Collect and persist one snapshot under its timeframe key.
///
/// # Errors
/// Anything [`collect_market_data`] returns, plus store ping/put failures.
pub async fn collect_and_store(
    client: &ExchangeClient,
    store: &dyn SnapshotStore,
    coins: &[Coin],
    timeframe: &str,
    symbol_filter: Option<&[String]>,
    config: &CollectorConfig,
) -> Result<MarketSnapshot, CandelaError> {
    store.ping().await?;
    let snapshot = collect_market_data(client, coins, timeframe, symbol_filter, config).await?;
    store.put(timeframe, &snapshot).await?;
    info!(timeframe, symbols = snapshot.data.len(), "snapshot stored");
    Ok(snapshot)
}

/// Build a coarse-timeframe snapshot from an already-cached base snapshot,
/// without touching any exchange.
///
/// # Errors
/// `UnknownTimeframe`/`InvalidTarget` for bad timeframe pairs, `NoData`
/// when no base snapshot is cached or no symbol survives aggregation.
pub async fn generate_target_snapshot(
    store: &dyn SnapshotStore,
    target_timeframe: &str,
    base_timeframe: &str,
    config: &CollectorConfig,
) -> Result<MarketSnapshot, CandelaError> {
    let base_ms = interval_duration_ms(base_timeframe)
        .ok_or_else(|| CandelaError::unknown_timeframe(base_timeframe))?;
    let target_ms = interval_duration_ms(target_timeframe)
        .ok_or_else(|| CandelaError::unknown_timeframe(target_timeframe))?;
    if target_ms <= base_ms {
        return Err(CandelaError::InvalidTarget {
            base: base_timeframe.to_string(),
            target: target_timeframe.to_string(),
        });
    }

    let base = store
        .get(base_timeframe)
        .await?
        .ok_or_else(|| CandelaError::no_data(format!("{base_timeframe} snapshot")))?;
    if base.is_empty() {
        return Err(CandelaError::no_data(format!("{base_timeframe} snapshot")));
    }

    let mut results = Vec::with_capacity(base.data.len());
    for series in base.data {
        match aggregate_to_target(
            &series.data,
            target_timeframe,
            base_timeframe,
            &series.symbol,
            &config.aggregate,
        ) {
            Ok(data) => results.push(SymbolSeries {
                symbol: series.symbol,
                data,
                exchanges: series.exchanges,
            }),
            Err(err) if err.is_config() => return Err(err),
            Err(err) => {
                debug!(symbol = %series.symbol, error = %err, "symbol dropped from target snapshot");
            }
        }
    }

    let snapshot = format_snapshot(results, target_timeframe);
    if snapshot.is_empty() {
        return Err(CandelaError::no_data(format!(
            "{target_timeframe} aggregation from {base_timeframe}"
        )));
    }
    store.put(target_timeframe, &snapshot).await?;
    info!(
        base = base_timeframe,
        target = target_timeframe,
        symbols = snapshot.data.len(),
        "target snapshot stored"
    );
    Ok(snapshot)
}

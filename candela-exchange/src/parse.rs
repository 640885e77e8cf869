//! Decoders from raw exchange payloads onto the pipeline's series types.
//!
//! Parsers are pure: `(payload, timeframe) -> series`. Individual malformed
//! rows are skipped with a warning rather than failing the whole payload;
//! a payload whose overall shape is wrong is a parse error.

use candela_core::interval_duration_ms;
use candela_types::{CandelaError, DataType, FrSnapshot, OiSnapshot, RawCandle, RawField};
use serde_json::Value;

use crate::Exchange;

/// A parsed payload, tagged by the series it contains.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Candlesticks.
    Klines(Vec<RawCandle>),
    /// Open-interest snapshots.
    OpenInterest(Vec<OiSnapshot>),
    /// Funding-rate snapshots.
    FundingRate(Vec<FrSnapshot>),
}

/// Dispatch to the parser for one `(exchange, data_type)` combination.
///
/// # Errors
/// Returns `CandelaError::Parse` when the payload shape does not match the
/// exchange's documented response, or `UnknownTimeframe` for kline payloads
/// requested at a timeframe outside the interval table.
pub fn parse_payload(
    exchange: Exchange,
    data_type: DataType,
    payload: &Value,
    timeframe: &str,
) -> Result<Parsed, CandelaError> {
    match data_type {
        DataType::Klines => parse_klines(exchange, payload, timeframe).map(Parsed::Klines),
        DataType::OpenInterest => parse_open_interest(exchange, payload).map(Parsed::OpenInterest),
        DataType::FundingRate => parse_funding_rate(exchange, payload).map(Parsed::FundingRate),
    }
}

/// Parse a klines payload into raw candles.
///
/// Binance rows are 12-element arrays; the quote-asset volume (index 7) is
/// used as the candle volume, and the taker buy quote volume (index 10)
/// feeds the volume-delta derivation. Bybit rows live under `result.list`
/// newest-first and carry no close time or taker split; the close time is
/// derived from the requested interval.
///
/// # Errors
/// See [`parse_payload`].
pub fn parse_klines(
    exchange: Exchange,
    payload: &Value,
    timeframe: &str,
) -> Result<Vec<RawCandle>, CandelaError> {
    match exchange {
        Exchange::Binance => {
            let rows = payload
                .as_array()
                .ok_or_else(|| CandelaError::parse("binance klines: expected a JSON array"))?;
            Ok(collect_rows(rows, "binance klines", binance_kline_row))
        }
        Exchange::Bybit => {
            let interval_ms = interval_duration_ms(timeframe)
                .ok_or_else(|| CandelaError::unknown_timeframe(timeframe))?;
            let rows = result_list(payload, "bybit klines")?;
            Ok(collect_rows(rows, "bybit klines", |row| {
                bybit_kline_row(row, interval_ms)
            }))
        }
    }
}

/// Parse an open-interest history payload into snapshots.
///
/// # Errors
/// See [`parse_payload`].
pub fn parse_open_interest(
    exchange: Exchange,
    payload: &Value,
) -> Result<Vec<OiSnapshot>, CandelaError> {
    match exchange {
        Exchange::Binance => {
            let rows = payload
                .as_array()
                .ok_or_else(|| CandelaError::parse("binance oi: expected a JSON array"))?;
            Ok(collect_rows(rows, "binance oi", |row| {
                snapshot_fields(row, "timestamp", "sumOpenInterest").map(
                    |(open_time, open_interest)| OiSnapshot {
                        open_time,
                        open_interest,
                    },
                )
            }))
        }
        Exchange::Bybit => {
            let rows = result_list(payload, "bybit oi")?;
            Ok(collect_rows(rows, "bybit oi", |row| {
                snapshot_fields(row, "timestamp", "openInterest").map(
                    |(open_time, open_interest)| OiSnapshot {
                        open_time,
                        open_interest,
                    },
                )
            }))
        }
    }
}

/// Parse a funding-rate history payload into snapshots.
///
/// # Errors
/// See [`parse_payload`].
pub fn parse_funding_rate(
    exchange: Exchange,
    payload: &Value,
) -> Result<Vec<FrSnapshot>, CandelaError> {
    match exchange {
        Exchange::Binance => {
            let rows = payload
                .as_array()
                .ok_or_else(|| CandelaError::parse("binance fr: expected a JSON array"))?;
            Ok(collect_rows(rows, "binance fr", |row| {
                snapshot_fields(row, "fundingTime", "fundingRate").map(
                    |(open_time, funding_rate)| FrSnapshot {
                        open_time,
                        funding_rate,
                    },
                )
            }))
        }
        Exchange::Bybit => {
            let rows = result_list(payload, "bybit fr")?;
            Ok(collect_rows(rows, "bybit fr", |row| {
                snapshot_fields(row, "fundingRateTimestamp", "fundingRate").map(
                    |(open_time, funding_rate)| FrSnapshot {
                        open_time,
                        funding_rate,
                    },
                )
            }))
        }
    }
}

/// Collect rows through a row parser, logging how many were dropped.
fn collect_rows<T>(
    rows: &[Value],
    what: &str,
    parse_row: impl Fn(&Value) -> Option<T>,
) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        match parse_row(row) {
            Some(parsed) => out.push(parsed),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(what, skipped, "dropped malformed rows from payload");
    }
    out
}

/// Bybit V5 envelopes every response as `{"result": {"list": [...]}}`.
fn result_list<'a>(payload: &'a Value, what: &str) -> Result<&'a Vec<Value>, CandelaError> {
    payload
        .get("result")
        .and_then(|r| r.get("list"))
        .and_then(Value::as_array)
        .ok_or_else(|| CandelaError::parse(format!("{what}: missing result.list")))
}

/// Exchanges ship numbers either as JSON numbers or as decimal strings.
fn num_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn num_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn raw_num_field(value: Option<&Value>) -> RawField {
    value.map_or(RawField::Absent, |v| {
        num_f64(v).map_or(RawField::Invalid, RawField::Present)
    })
}

fn snapshot_fields(row: &Value, time_key: &str, value_key: &str) -> Option<(i64, f64)> {
    let open_time = row.get(time_key).and_then(num_i64)?;
    let value = row.get(value_key).and_then(num_f64)?;
    Some((open_time, value))
}

fn binance_kline_row(row: &Value) -> Option<RawCandle> {
    let arr = row.as_array()?;
    let open_time = arr.first().and_then(num_i64)?;
    let open_price = arr.get(1).and_then(num_f64)?;
    let high_price = arr.get(2).and_then(num_f64)?;
    let low_price = arr.get(3).and_then(num_f64)?;
    let close_price = arr.get(4).and_then(num_f64)?;
    let close_time = arr.get(6).and_then(num_i64)?;
    let volume = arr.get(7).and_then(num_f64)?;

    // Taker buy quote volume; the sell side is the remainder of the total.
    let buy_volume = raw_num_field(arr.get(10));
    let sell_volume = match buy_volume {
        RawField::Present(buy) => RawField::Present(volume - buy),
        other => other,
    };

    Some(RawCandle {
        open_time,
        close_time,
        open_price,
        high_price,
        low_price,
        close_price,
        volume,
        volume_delta: RawField::Absent,
        buy_volume,
        sell_volume,
    })
}

fn bybit_kline_row(row: &Value, interval_ms: i64) -> Option<RawCandle> {
    let arr = row.as_array()?;
    let open_time = arr.first().and_then(num_i64)?;
    let open_price = arr.get(1).and_then(num_f64)?;
    let high_price = arr.get(2).and_then(num_f64)?;
    let low_price = arr.get(3).and_then(num_f64)?;
    let close_price = arr.get(4).and_then(num_f64)?;
    // Turnover (quote volume) keeps bybit candles comparable with binance's
    // quote-asset volume.
    let volume = arr.get(6).and_then(num_f64)?;

    Some(RawCandle {
        open_time,
        close_time: open_time + interval_ms - 1,
        open_price,
        high_price,
        low_price,
        close_price,
        volume,
        volume_delta: RawField::Absent,
        buy_volume: RawField::Absent,
        sell_volume: RawField::Absent,
    })
}

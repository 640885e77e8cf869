//! Aligns klines, open-interest, and funding-rate series onto the base
//! timeframe grid and merges them into unified candles.

use std::collections::{BTreeMap, btree_map::Entry};

use candela_types::{Candle, CandelaError, FrSnapshot, OiSnapshot, RawCandle, RawField, SeriesBundle};

use super::interval::{interval_duration_ms, normalize_to_open_time};

/// Merge one symbol's series bundle at the given base timeframe.
///
/// - OI and FR observation timestamps are normalized to the bucket start;
///   within a bucket the earliest OI snapshot wins (snapshot-at-open
///   semantics) and the latest FR snapshot wins (point value closest to the
///   candle close).
/// - Klines are keyed by their own `open_time`; buckets with no kline are
///   dropped, so stray OI/FR observations never fabricate candles.
/// - `volume_delta` is derived from taker buy/sell volumes unless the
///   producer already supplied one; malformed numerics degrade that single
///   field to `None` rather than failing the merge.
///
/// Output is strictly ascending by `open_time` with no duplicate keys.
///
/// # Errors
/// Returns `CandelaError::UnknownTimeframe` when `base_timeframe` has no
/// entry in the interval table.
pub fn merge_series(
    bundle: SeriesBundle,
    base_timeframe: &str,
) -> Result<Vec<Candle>, CandelaError> {
    let Some(interval_ms) = interval_duration_ms(base_timeframe) else {
        tracing::error!(timeframe = %base_timeframe, "unknown base timeframe");
        return Err(CandelaError::unknown_timeframe(base_timeframe));
    };

    let best_oi = select_oi_snapshots(&bundle.oi, interval_ms);
    let best_fr = select_fr_snapshots(&bundle.fr, interval_ms);

    let mut merged: BTreeMap<i64, Candle> = BTreeMap::new();
    for kline in bundle.klines {
        let key = kline.open_time;
        let volume_delta = resolve_volume_delta(&kline);
        merged.insert(
            key,
            Candle {
                open_time: kline.open_time,
                close_time: kline.close_time,
                open_price: kline.open_price,
                high_price: kline.high_price,
                low_price: kline.low_price,
                close_price: kline.close_price,
                volume: kline.volume,
                volume_delta,
                open_interest: best_oi.get(&key).map(|s| s.open_interest),
                funding_rate: best_fr.get(&key).map(|s| s.funding_rate),
            },
        );
    }

    Ok(merged.into_values().collect())
}

/// Earliest snapshot per bucket wins: matches the reference exchange's
/// "snapshot at candle open" semantics.
fn select_oi_snapshots(snapshots: &[OiSnapshot], interval_ms: i64) -> BTreeMap<i64, OiSnapshot> {
    let mut best: BTreeMap<i64, OiSnapshot> = BTreeMap::new();
    for snap in snapshots {
        let key = normalize_to_open_time(snap.open_time, interval_ms);
        match best.entry(key) {
            Entry::Vacant(v) => {
                v.insert(*snap);
            }
            Entry::Occupied(mut o) => {
                if snap.open_time < o.get().open_time {
                    o.insert(*snap);
                }
            }
        }
    }
    best
}

/// Latest snapshot per bucket wins: the funding rate most representative
/// right before the candle closes.
fn select_fr_snapshots(snapshots: &[FrSnapshot], interval_ms: i64) -> BTreeMap<i64, FrSnapshot> {
    let mut best: BTreeMap<i64, FrSnapshot> = BTreeMap::new();
    for snap in snapshots {
        let key = normalize_to_open_time(snap.open_time, interval_ms);
        match best.entry(key) {
            Entry::Vacant(v) => {
                v.insert(*snap);
            }
            Entry::Occupied(mut o) => {
                if snap.open_time > o.get().open_time {
                    o.insert(*snap);
                }
            }
        }
    }
    best
}

fn resolve_volume_delta(kline: &RawCandle) -> Option<f64> {
    match kline.volume_delta {
        RawField::Present(delta) => return Some(delta),
        RawField::Invalid => return None,
        RawField::Absent => {}
    }
    match (kline.buy_volume, kline.sell_volume) {
        (RawField::Present(buy), RawField::Present(sell)) => Some(buy - sell),
        (RawField::Invalid, _) | (_, RawField::Invalid) => {
            tracing::warn!(
                open_time = kline.open_time,
                "malformed taker volume fields; volume delta unavailable"
            );
            None
        }
        _ => Some(0.0),
    }
}

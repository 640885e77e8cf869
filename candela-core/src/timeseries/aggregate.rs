//! Re-buckets base-timeframe candles into a coarser, UTC-aligned target
//! timeframe, then reuses the merge engine to reattach OI/FR at the new
//! granularity.

use std::collections::{BTreeMap, btree_map::Entry};

use candela_types::{
    AggregateOptions, Candle, CandelaError, FrSnapshot, OiSnapshot, RawCandle, RawField,
    SeriesBundle,
};

use super::interval::{align_to_utc_boundary, interval_duration_ms};
use super::merge::merge_series;

/// Running OHLC state for one target bucket. Finalized (or discarded as
/// incomplete) exactly once, on bucket change or end of input.
struct BucketAcc {
    open_time: i64,
    open_price: f64,
    high_price: f64,
    low_price: f64,
    volume: f64,
    volume_delta: Option<f64>,
    last_close_time: i64,
    last_close_price: f64,
}

impl BucketAcc {
    fn start(bucket_start: i64, candle: &Candle) -> Self {
        Self {
            open_time: bucket_start,
            open_price: candle.open_price,
            high_price: candle.high_price,
            low_price: candle.low_price,
            volume: candle.volume,
            volume_delta: candle.volume_delta,
            last_close_time: candle.close_time,
            last_close_price: candle.close_price,
        }
    }

    fn absorb(&mut self, candle: &Candle) {
        self.high_price = self.high_price.max(candle.high_price);
        self.low_price = self.low_price.min(candle.low_price);
        self.volume += candle.volume;
        self.volume_delta = match (self.volume_delta, candle.volume_delta) {
            (Some(acc), Some(cur)) => Some(acc + cur),
            // An unknowable constituent makes the whole bucket's delta unknowable.
            _ => None,
        };
        self.last_close_time = candle.close_time;
        self.last_close_price = candle.close_price;
    }

    /// Emit the aggregated candle only when the accumulated base candles
    /// span at least `completeness` of the target interval. Trailing partial
    /// windows are dropped rather than surfaced as misleadingly short
    /// candles.
    fn finalize(
        self,
        target_interval_ms: i64,
        completeness: f64,
        symbol: &str,
    ) -> Option<RawCandle> {
        let actual_span = self.last_close_time - self.open_time + 1;
        #[allow(clippy::cast_precision_loss)]
        let complete = actual_span as f64 >= target_interval_ms as f64 * completeness;
        if !complete {
            tracing::debug!(
                symbol = %symbol,
                open_time = self.open_time,
                actual_span,
                expected_span = target_interval_ms,
                "dropping incomplete target bucket"
            );
            return None;
        }
        Some(RawCandle {
            open_time: self.open_time,
            close_time: self.last_close_time,
            open_price: self.open_price,
            high_price: self.high_price,
            low_price: self.low_price,
            close_price: self.last_close_price,
            volume: self.volume,
            volume_delta: self
                .volume_delta
                .map_or(RawField::Invalid, RawField::Present),
            buy_volume: RawField::Absent,
            sell_volume: RawField::Absent,
        })
    }
}

/// Aggregate base-timeframe candles into the target timeframe for one
/// symbol.
///
/// Target buckets are aligned to UTC boundaries (midnight for daily,
/// 00:00/08:00/16:00 for eight-hour targets). OHLC accumulates over an
/// explicit per-bucket state; OI/FR are re-bucketed separately with the
/// earliest-wins/latest-wins policies and reattached by a second invocation
/// of the merge engine at the target timeframe.
///
/// # Errors
/// - `CandelaError::UnknownTimeframe` when either timeframe name is unknown.
/// - `CandelaError::InvalidTarget` when the target interval is not strictly
///   greater than the base interval — a configuration error, never a silent
///   no-op.
/// - `CandelaError::NoData` when `base_candles` is empty.
pub fn aggregate_to_target(
    base_candles: &[Candle],
    target_timeframe: &str,
    base_timeframe: &str,
    symbol: &str,
    options: &AggregateOptions,
) -> Result<Vec<Candle>, CandelaError> {
    let base_ms = interval_duration_ms(base_timeframe)
        .ok_or_else(|| CandelaError::unknown_timeframe(base_timeframe))?;
    let target_ms = interval_duration_ms(target_timeframe)
        .ok_or_else(|| CandelaError::unknown_timeframe(target_timeframe))?;

    if target_ms <= base_ms {
        tracing::error!(
            base = %base_timeframe,
            target = %target_timeframe,
            "target interval must be coarser than base interval"
        );
        return Err(CandelaError::InvalidTarget {
            base: base_timeframe.to_string(),
            target: target_timeframe.to_string(),
        });
    }

    if base_candles.is_empty() {
        return Err(CandelaError::no_data(format!(
            "{symbol}: no base candles to aggregate"
        )));
    }

    // Defensive: never assume the caller sorted the cached series.
    let mut sorted: Vec<Candle> = base_candles.to_vec();
    sorted.sort_by_key(|c| c.open_time);

    let mut target_klines: Vec<RawCandle> = Vec::new();
    let mut acc: Option<BucketAcc> = None;

    for candle in &sorted {
        let bucket_start = align_to_utc_boundary(candle.open_time, target_ms);
        match acc.as_mut() {
            Some(pending) if pending.open_time == bucket_start => pending.absorb(candle),
            _ => {
                if let Some(pending) = acc.take() {
                    target_klines.extend(pending.finalize(target_ms, options.completeness, symbol));
                }
                acc = Some(BucketAcc::start(bucket_start, candle));
            }
        }
    }
    if let Some(pending) = acc.take() {
        target_klines.extend(pending.finalize(target_ms, options.completeness, symbol));
    }

    let (oi, fr) = rebucket_snapshots(&sorted, target_ms);

    merge_series(
        SeriesBundle {
            klines: target_klines,
            oi,
            fr,
        },
        target_timeframe,
    )
}

/// Re-bucket the OI/FR values carried on base candles onto the target grid.
/// OI keeps the value from the earliest base candle per bucket, FR from the
/// latest; buckets with no value are omitted entirely.
fn rebucket_snapshots(
    sorted_base: &[Candle],
    target_interval_ms: i64,
) -> (Vec<OiSnapshot>, Vec<FrSnapshot>) {
    // bucket start -> (source open_time, value)
    let mut best_oi: BTreeMap<i64, (i64, f64)> = BTreeMap::new();
    let mut best_fr: BTreeMap<i64, (i64, f64)> = BTreeMap::new();

    for candle in sorted_base {
        let bucket_start = align_to_utc_boundary(candle.open_time, target_interval_ms);
        if let Some(oi) = candle.open_interest {
            match best_oi.entry(bucket_start) {
                Entry::Vacant(v) => {
                    v.insert((candle.open_time, oi));
                }
                Entry::Occupied(mut o) => {
                    if candle.open_time < o.get().0 {
                        o.insert((candle.open_time, oi));
                    }
                }
            }
        }
        if let Some(fr) = candle.funding_rate {
            match best_fr.entry(bucket_start) {
                Entry::Vacant(v) => {
                    v.insert((candle.open_time, fr));
                }
                Entry::Occupied(mut o) => {
                    if candle.open_time > o.get().0 {
                        o.insert((candle.open_time, fr));
                    }
                }
            }
        }
    }

    let oi = best_oi
        .into_iter()
        .map(|(bucket_start, (_, open_interest))| OiSnapshot {
            open_time: bucket_start,
            open_interest,
        })
        .collect();
    let fr = best_fr
        .into_iter()
        .map(|(bucket_start, (_, funding_rate))| FrSnapshot {
            open_time: bucket_start,
            funding_rate,
        })
        .collect();
    (oi, fr)
}

//! Target aggregation invariants: UTC boundary alignment, the
//! completeness filter, and configuration-error behavior.

use candela_core::{aggregate_to_target, merge_series};
use candela_types::{
    AggregateOptions, Candle, CandelaError, RawCandle, RawField, SeriesBundle,
};
use proptest::prelude::*;

const H1: i64 = 3_600_000;
const H4: i64 = 14_400_000;
const H8: i64 = 28_800_000;
const DAY: i64 = 86_400_000;

fn base_candle(open_time: i64, interval_ms: i64) -> Candle {
    Candle {
        open_time,
        close_time: open_time + interval_ms - 1,
        open_price: 100.0,
        high_price: 110.0,
        low_price: 90.0,
        close_price: 105.0,
        volume: 10.0,
        volume_delta: Some(1.0),
        open_interest: Some(50.0),
        funding_rate: Some(0.0001),
    }
}

fn opts() -> AggregateOptions {
    AggregateOptions::default()
}

proptest! {
    /// Every daily candle opens exactly at UTC midnight, wherever the base
    /// series starts.
    #[test]
    fn daily_candles_open_at_utc_midnight(start_bucket in 0i64..10_000) {
        let start = start_bucket * H4;
        let candles: Vec<Candle> = (0..12).map(|i| base_candle(start + i * H4, H4)).collect();

        let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
        for candle in &daily {
            prop_assert_eq!(candle.open_time % DAY, 0);
        }
    }

    /// Every 8h candle opens on a UTC day third (00:00, 08:00, 16:00).
    #[test]
    fn eight_hour_candles_open_on_day_thirds(start_bucket in 0i64..10_000) {
        let start = start_bucket * H4;
        let candles: Vec<Candle> = (0..8).map(|i| base_candle(start + i * H4, H4)).collect();

        let eight = aggregate_to_target(&candles, "8h", "4h", "TESTUSDT", &opts()).unwrap();
        for candle in &eight {
            prop_assert_eq!(candle.open_time % H8, 0);
        }
    }

    /// Complete buckets conserve volume: whatever survives the completeness
    /// filter sums the volume of exactly target/base base candles.
    #[test]
    fn surviving_buckets_conserve_volume(day_count in 1i64..5) {
        let candles: Vec<Candle> = (0..day_count * 6)
            .map(|i| base_candle(i * H4, H4))
            .collect();

        let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
        prop_assert_eq!(daily.len(), day_count as usize);
        for candle in &daily {
            prop_assert_eq!(candle.volume, 60.0);
            prop_assert_eq!(candle.volume_delta, Some(6.0));
        }
    }
}

#[test]
fn trailing_partial_bucket_is_dropped() {
    // One full UTC day plus a single 4h candle of the next day.
    let mut candles: Vec<Candle> = (0..6).map(|i| base_candle(i * H4, H4)).collect();
    candles.push(base_candle(DAY, H4));

    let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].open_time, 0);
}

#[test]
fn completeness_threshold_is_tunable() {
    // Three of six 4h candles: span covers half the day.
    let candles: Vec<Candle> = (0..3).map(|i| base_candle(i * H4, H4)).collect();

    let strict = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    assert!(strict.is_empty());

    let lax = AggregateOptions { completeness: 0.5 };
    let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &lax).unwrap();
    assert_eq!(daily.len(), 1);
}

#[test]
fn side_fields_rebucket_with_open_and_close_policies() {
    let mut candles: Vec<Candle> = (0..6).map(|i| base_candle(i * H4, H4)).collect();
    for (i, candle) in candles.iter_mut().enumerate() {
        candle.open_interest = Some(100.0 + i as f64);
        candle.funding_rate = Some(0.001 * (i + 1) as f64);
    }

    let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    assert_eq!(daily.len(), 1);
    // OI from the earliest base candle of the day, FR from the latest.
    assert_eq!(daily[0].open_interest, Some(100.0));
    assert_eq!(daily[0].funding_rate, Some(0.006));
}

#[test]
fn unknowable_constituent_delta_poisons_the_bucket() {
    let mut candles: Vec<Candle> = (0..6).map(|i| base_candle(i * H4, H4)).collect();
    candles[3].volume_delta = None;

    let daily = aggregate_to_target(&candles, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].volume_delta, None);
}

#[test]
fn unsorted_input_aggregates_identically() {
    let sorted: Vec<Candle> = (0..6).map(|i| base_candle(i * H4, H4)).collect();
    let mut shuffled = sorted.clone();
    shuffled.reverse();

    let a = aggregate_to_target(&sorted, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    let b = aggregate_to_target(&shuffled, "1d", "4h", "TESTUSDT", &opts()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn target_must_be_strictly_coarser() {
    let candles = vec![base_candle(0, H4)];
    let err = aggregate_to_target(&candles, "4h", "4h", "TESTUSDT", &opts()).unwrap_err();
    assert!(matches!(err, CandelaError::InvalidTarget { .. }));

    let err = aggregate_to_target(&candles, "1h", "4h", "TESTUSDT", &opts()).unwrap_err();
    assert!(matches!(err, CandelaError::InvalidTarget { .. }));
}

#[test]
fn empty_input_is_a_no_data_error() {
    let err = aggregate_to_target(&[], "1d", "4h", "TESTUSDT", &opts()).unwrap_err();
    assert!(matches!(err, CandelaError::NoData { .. }));
}

#[test]
fn staged_aggregation_equals_direct_aggregation_on_complete_series() {
    // 1h -> 4h -> 8h must land on the same candles as 1h -> 8h when every
    // intermediate bucket is complete.
    let hourly: Vec<Candle> = (0..16)
        .map(|i| {
            let mut c = base_candle(i * H1, H1);
            c.open_interest = Some(100.0 + i as f64);
            c.funding_rate = Some(0.001 * (i + 1) as f64);
            c
        })
        .collect();

    let direct = aggregate_to_target(&hourly, "8h", "1h", "TESTUSDT", &opts()).unwrap();

    let four_hour = aggregate_to_target(&hourly, "4h", "1h", "TESTUSDT", &opts()).unwrap();
    let staged = aggregate_to_target(&four_hour, "8h", "4h", "TESTUSDT", &opts()).unwrap();

    assert_eq!(direct, staged);
    assert_eq!(direct.len(), 2);
}

#[test]
fn aggregation_composes_with_the_merge_engine() {
    // A merged 1h series aggregated to 8h carries taker-derived deltas
    // through both engines.
    let klines: Vec<RawCandle> = (0..8)
        .map(|i| RawCandle {
            open_time: i * H1,
            close_time: i * H1 + H1 - 1,
            open_price: 100.0,
            high_price: 110.0,
            low_price: 90.0,
            close_price: 105.0,
            volume: 5000.0,
            volume_delta: RawField::Absent,
            buy_volume: RawField::Present(3000.0),
            sell_volume: RawField::Present(2000.0),
        })
        .collect();
    let hourly = merge_series(SeriesBundle::klines_only(klines), "1h").unwrap();

    let eight = aggregate_to_target(&hourly, "8h", "1h", "TESTUSDT", &opts()).unwrap();
    assert_eq!(eight.len(), 1);
    assert_eq!(eight[0].open_time, 0);
    assert_eq!(eight[0].volume, 40_000.0);
    assert_eq!(eight[0].volume_delta, Some(8000.0));
}

//! Merge engine invariants: ordering, bucket selection policies, and
//! degradation when side series are missing.

use candela_core::merge_series;
use candela_types::{
    CandelaError, FrSnapshot, OiSnapshot, RawCandle, RawField, SeriesBundle,
};
use proptest::prelude::*;

const H1: i64 = 3_600_000;

fn kline(open_time: i64) -> RawCandle {
    RawCandle {
        open_time,
        close_time: open_time + H1 - 1,
        open_price: 100.0,
        high_price: 110.0,
        low_price: 90.0,
        close_price: 105.0,
        volume: 5000.0,
        volume_delta: RawField::Absent,
        buy_volume: RawField::Present(3000.0),
        sell_volume: RawField::Present(2000.0),
    }
}

proptest! {
    /// Whatever order klines arrive in, and with duplicates, output is
    /// strictly ascending with unique open times.
    #[test]
    fn output_is_strictly_ascending_and_deduplicated(
        offsets in proptest::collection::vec(0i64..500, 1..60)
    ) {
        let klines: Vec<RawCandle> = offsets.iter().map(|o| kline(o * H1)).collect();
        let bundle = SeriesBundle { klines, oi: vec![], fr: vec![] };

        let merged = merge_series(bundle, "1h").unwrap();
        prop_assert!(!merged.is_empty());
        for pair in merged.windows(2) {
            prop_assert!(pair[0].open_time < pair[1].open_time);
        }
    }

    /// OI and FR observations never fabricate candles for buckets with no
    /// kline.
    #[test]
    fn side_series_never_fabricate_candles(
        oi_offsets in proptest::collection::vec(0i64..100, 0..20),
        fr_offsets in proptest::collection::vec(0i64..100, 0..20),
    ) {
        let klines = vec![kline(0), kline(H1)];
        let bundle = SeriesBundle {
            klines,
            oi: oi_offsets.iter().map(|o| OiSnapshot { open_time: o * H1, open_interest: 1.0 }).collect(),
            fr: fr_offsets.iter().map(|o| FrSnapshot { open_time: o * H1, funding_rate: 0.0001 }).collect(),
        };

        let merged = merge_series(bundle, "1h").unwrap();
        prop_assert_eq!(merged.len(), 2);
        prop_assert!(merged.iter().all(|c| c.open_time == 0 || c.open_time == H1));
    }
}

#[test]
fn earliest_open_interest_snapshot_in_bucket_wins() {
    let bundle = SeriesBundle {
        klines: vec![kline(0)],
        oi: vec![
            OiSnapshot { open_time: 200, open_interest: 9.0 },
            OiSnapshot { open_time: 100, open_interest: 5.0 },
        ],
        fr: vec![],
    };
    let merged = merge_series(bundle, "1h").unwrap();
    assert_eq!(merged[0].open_interest, Some(5.0));
}

#[test]
fn latest_funding_rate_snapshot_in_bucket_wins() {
    let bundle = SeriesBundle {
        klines: vec![kline(0)],
        oi: vec![],
        fr: vec![
            FrSnapshot { open_time: 100, funding_rate: 0.01 },
            FrSnapshot { open_time: 200, funding_rate: 0.02 },
        ],
    };
    let merged = merge_series(bundle, "1h").unwrap();
    assert_eq!(merged[0].funding_rate, Some(0.02));
}

#[test]
fn klines_only_bundle_yields_candles_without_side_fields() {
    let bundle = SeriesBundle::klines_only(vec![kline(0), kline(H1)]);
    let merged = merge_series(bundle, "1h").unwrap();
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().all(|c| c.open_interest.is_none()));
    assert!(merged.iter().all(|c| c.funding_rate.is_none()));
    assert_eq!(merged[0].volume_delta, Some(1000.0));
}

#[test]
fn volume_delta_rules() {
    // Producer-supplied delta is used as-is.
    let mut supplied = kline(0);
    supplied.volume_delta = RawField::Present(-42.0);
    let merged = merge_series(SeriesBundle::klines_only(vec![supplied]), "1h").unwrap();
    assert_eq!(merged[0].volume_delta, Some(-42.0));

    // Absent taker fields default the delta to zero.
    let mut bare = kline(0);
    bare.buy_volume = RawField::Absent;
    bare.sell_volume = RawField::Absent;
    let merged = merge_series(SeriesBundle::klines_only(vec![bare]), "1h").unwrap();
    assert_eq!(merged[0].volume_delta, Some(0.0));

    // A present-but-unparsable taker field makes the delta unknowable, not
    // zero.
    let mut broken = kline(0);
    broken.buy_volume = RawField::Invalid;
    let merged = merge_series(SeriesBundle::klines_only(vec![broken]), "1h").unwrap();
    assert_eq!(merged[0].volume_delta, None);
}

#[test]
fn unknown_timeframe_is_rejected() {
    let err = merge_series(SeriesBundle::default(), "7h").unwrap_err();
    assert!(matches!(err, CandelaError::UnknownTimeframe { .. }));
}

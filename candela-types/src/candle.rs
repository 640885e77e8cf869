use serde::{Deserialize, Serialize};

/// The three series kinds collected per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// OHLCV candlesticks.
    Klines,
    /// Open-interest point snapshots.
    OpenInterest,
    /// Funding-rate point snapshots.
    FundingRate,
}

impl DataType {
    /// Short wire/log label (`klines`, `oi`, `fr`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Klines => "klines",
            Self::OpenInterest => "oi",
            Self::FundingRate => "fr",
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit tri-state for best-effort numeric fields on raw payloads.
///
/// Exchanges occasionally ship malformed numerics. "Present but unparseable"
/// is kept distinct from "absent" so the merge engine can degrade each case
/// differently (and tests can tell them apart).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RawField {
    /// The field was not part of the payload.
    #[default]
    Absent,
    /// The field was present but did not parse as a number.
    Invalid,
    /// The field parsed cleanly.
    Present(f64),
}

impl RawField {
    /// Parse a decimal string the way exchange payloads carry numbers.
    #[must_use]
    pub fn from_str_field(raw: &str) -> Self {
        raw.parse::<f64>().map_or(Self::Invalid, Self::Present)
    }
}

/// A merged output candle at some timeframe.
///
/// `open_time` is the unique sort key within a series. `open_interest` and
/// `funding_rate` are attached by the merge engine when a snapshot landed in
/// the candle's bucket and are omitted from the wire format otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Bucket start, ms since the UNIX epoch.
    pub open_time: i64,
    /// Bucket end, ms since the UNIX epoch.
    pub close_time: i64,
    /// First trade price of the bucket.
    pub open_price: f64,
    /// Highest trade price of the bucket.
    pub high_price: f64,
    /// Lowest trade price of the bucket.
    pub low_price: f64,
    /// Last trade price of the bucket.
    pub close_price: f64,
    /// Quote volume over the bucket.
    pub volume: f64,
    /// Buy volume minus sell volume; `None` when the source numerics were
    /// malformed (serialized as `null`).
    pub volume_delta: Option<f64>,
    /// Open interest snapshot for the bucket, when one was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<f64>,
    /// Funding rate snapshot for the bucket, when one was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<f64>,
}

/// A candle as parsed from an exchange payload, before merging.
///
/// Carries the taker buy/sell volumes needed to derive a volume delta.
/// Upstream producers that already computed one (the target aggregator) set
/// `volume_delta` directly and leave the taker fields `Absent`; `Invalid`
/// marks a delta that was attempted but is unknowable.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandle {
    /// Bucket start, ms since the UNIX epoch.
    pub open_time: i64,
    /// Bucket end, ms since the UNIX epoch.
    pub close_time: i64,
    /// First trade price of the bucket.
    pub open_price: f64,
    /// Highest trade price of the bucket.
    pub high_price: f64,
    /// Lowest trade price of the bucket.
    pub low_price: f64,
    /// Last trade price of the bucket.
    pub close_price: f64,
    /// Quote volume over the bucket.
    pub volume: f64,
    /// Pre-computed delta: `Absent` defers to the taker fields, `Present` is
    /// used as-is, `Invalid` yields a missing delta downstream.
    pub volume_delta: RawField,
    /// Taker buy volume, as reported by the exchange.
    pub buy_volume: RawField,
    /// Taker sell volume, as reported or derived from totals.
    pub sell_volume: RawField,
}

/// A point-in-time open-interest reading. Not a candle: several snapshots
/// may fall within one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OiSnapshot {
    /// Observation timestamp, ms since the UNIX epoch.
    pub open_time: i64,
    /// Total outstanding contracts at the observation time.
    pub open_interest: f64,
}

/// A point-in-time funding-rate reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrSnapshot {
    /// Observation timestamp, ms since the UNIX epoch.
    pub open_time: i64,
    /// Funding rate at the observation time.
    pub funding_rate: f64,
}

/// Per-symbol merge-engine input: the three independently sampled series.
///
/// `oi` and `fr` are empty when the corresponding task failed or was never
/// scheduled; the merge proceeds with whatever is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesBundle {
    /// Parsed candlesticks at the base timeframe.
    pub klines: Vec<RawCandle>,
    /// Open-interest snapshots.
    pub oi: Vec<OiSnapshot>,
    /// Funding-rate snapshots.
    pub fr: Vec<FrSnapshot>,
}

impl SeriesBundle {
    /// A bundle holding only candlesticks.
    #[must_use]
    pub fn klines_only(klines: Vec<RawCandle>) -> Self {
        Self {
            klines,
            ..Self::default()
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::Candle;

/// One symbol's merged candle series, produced once per run and immutable
/// afterwards. Replaces any previously cached version wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    /// Trading pair symbol.
    pub symbol: String,
    /// Candles in strictly ascending `open_time` order.
    pub data: Vec<Candle>,
    /// Exchanges the coin is listed on, carried through from the coin source.
    #[serde(default)]
    pub exchanges: Vec<String>,
}

impl SymbolSeries {
    /// The last (freshest) candle of the series, if any.
    #[must_use]
    pub fn last_candle(&self) -> Option<&Candle> {
        self.data.last()
    }
}

/// Provenance block attached to every snapshot, consumed by downstream
/// freshness checks. Field names are part of the cache wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Collection wall-clock timestamp, ms since the UNIX epoch.
    pub timestamp: i64,
    /// Producing component label.
    pub source: String,
    /// Number of symbols present in `data`.
    pub symbols_in_final_list: usize,
}

/// The final cache-ready document for one timeframe.
///
/// Root `open_time`/`close_time` are the maxima over all symbols' last
/// candles — "the freshest data point across the whole universe".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Timeframe key this snapshot was built for.
    pub timeframe: String,
    /// Max `open_time` over all symbols' last candles.
    pub open_time: i64,
    /// Max `close_time` over all symbols' last candles.
    pub close_time: i64,
    /// Per-symbol merged series; symbols with no candles are never emitted.
    pub data: Vec<SymbolSeries>,
    /// Mandatory provenance block.
    pub audit: Audit,
}

impl MarketSnapshot {
    /// Whether the snapshot carries no symbol data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

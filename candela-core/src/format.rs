//! Assembles per-symbol merged series into the final cache-ready document.

use candela_types::{Audit, MarketSnapshot, SymbolSeries};

/// Label stamped into every snapshot's audit block.
const AUDIT_SOURCE: &str = "candela-collector";

/// Build the final cache document for one timeframe.
///
/// Root `open_time`/`close_time` are the maxima over all symbols' last
/// candles, which downstream freshness checks compare against wall clock.
/// Symbols with no merged candles are excluded entirely; the audit block is
/// always attached.
#[must_use]
pub fn format_snapshot(results: Vec<SymbolSeries>, timeframe: &str) -> MarketSnapshot {
    let data: Vec<SymbolSeries> = results.into_iter().filter(|s| !s.data.is_empty()).collect();

    let mut max_open_time = 0;
    let mut max_close_time = 0;
    for series in &data {
        if let Some(last) = series.last_candle() {
            max_open_time = max_open_time.max(last.open_time);
            max_close_time = max_close_time.max(last.close_time);
        }
    }

    let audit = Audit {
        timestamp: chrono::Utc::now().timestamp_millis(),
        source: AUDIT_SOURCE.to_string(),
        symbols_in_final_list: data.len(),
    };

    MarketSnapshot {
        timeframe: timeframe.to_string(),
        open_time: max_open_time,
        close_time: max_close_time,
        data,
        audit,
    }
}

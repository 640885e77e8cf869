use candela_types::DataType;

use crate::Exchange;

/// One unit of fetch work: a single `(symbol, exchange, data_type)` request.
///
/// Tasks are created fresh for every collection run and carry no identity
/// beyond one fetch-and-parse cycle. The parser is implied by
/// `(exchange, data_type)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Trading pair symbol.
    pub symbol: String,
    /// Exchange this request is routed to.
    pub exchange: Exchange,
    /// Which series this task retrieves.
    pub data_type: DataType,
    /// Fully built request URL (bybit kline URLs receive their page size
    /// from the fetch strategy).
    pub url: String,
    /// The interval actually requested from the exchange; may differ from
    /// the collection timeframe (e.g. 4h OI granularity for coarse bases).
    pub request_timeframe: String,
    /// Total rows requested across all pages.
    pub limit: u32,
    /// The timeframe the collection run was started for.
    pub original_timeframe: String,
}

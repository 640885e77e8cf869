use serde::{Deserialize, Serialize};

/// A listed instrument as supplied by the external coin source.
///
/// Read-only input to the pipeline; the exchange names are free-form strings
/// owned by the source and are resolved against the closed exchange set at
/// task-build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Trading pair symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Exchanges the coin is listed on, e.g. `["binance", "bybit"]`.
    #[serde(default)]
    pub exchanges: Vec<String>,
    /// Optional listing category from the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Coin {
    /// Convenience constructor used heavily in tests.
    #[must_use]
    pub fn new(symbol: impl Into<String>, exchanges: &[&str]) -> Self {
        Self {
            symbol: symbol.into(),
            exchanges: exchanges.iter().map(ToString::to_string).collect(),
            category: None,
        }
    }

    /// Whether the coin lists the given exchange name.
    #[must_use]
    pub fn lists(&self, exchange: &str) -> bool {
        self.exchanges.iter().any(|e| e == exchange)
    }
}

use std::time::Duration;

/// Tunables for the target aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOptions {
    /// Minimum fraction of the target interval a bucket must span to be
    /// emitted. Kept tunable: exchanges with irregular candle emission can
    /// deflate the observed span below any fixed threshold.
    pub completeness: f64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { completeness: 0.99 }
    }
}

/// Configuration for one collection run.
///
/// Defaults mirror the production collector: 800 base-timeframe candles
/// (1440 for `1h`), 20 concurrent requests per exchange group, a 30s
/// per-request timeout, and a short pacing delay between outbound requests.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    /// Max concurrent outbound requests per exchange group.
    pub concurrency_limit: usize,
    /// Per-request network timeout.
    pub request_timeout: Duration,
    /// Pacing delay applied before every outbound request.
    pub request_delay: Duration,
    /// Klines request size for the `1h` timeframe.
    pub klines_limit_1h: u32,
    /// Klines request size for every other base timeframe.
    pub klines_limit_base: u32,
    /// Timeframes whose last (still-open) candle is trimmed after parsing.
    pub trim_timeframes: Vec<String>,
    /// Target aggregation tunables.
    pub aggregate: AggregateOptions,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 20,
            request_timeout: Duration::from_secs(30),
            request_delay: Duration::from_millis(50),
            klines_limit_1h: 1440,
            klines_limit_base: 800,
            trim_timeframes: ["1h", "4h", "8h", "12h", "1d"]
                .map(String::from)
                .to_vec(),
            aggregate: AggregateOptions::default(),
        }
    }
}

impl CollectorConfig {
    /// Klines request size for the given timeframe name.
    #[must_use]
    pub fn klines_limit(&self, timeframe: &str) -> u32 {
        if timeframe == "1h" {
            self.klines_limit_1h
        } else {
            self.klines_limit_base
        }
    }

    /// Whether the last unclosed candle should be trimmed for a timeframe.
    #[must_use]
    pub fn trims(&self, timeframe: &str) -> bool {
        self.trim_timeframes.iter().any(|t| t == timeframe)
    }
}

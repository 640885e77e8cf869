use candela_types::DataType;

/// The closed set of exchanges the pipeline collects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// Binance USDⓈ-M futures.
    Binance,
    /// Bybit V5 linear perpetuals.
    Bybit,
}

impl Exchange {
    /// Canonical lowercase name, matching the coin source's exchange labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binance => "binance",
            Self::Bybit => "bybit",
        }
    }

    /// Resolve a coin-source exchange label against the closed set.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "binance" => Some(Self::Binance),
            "bybit" => Some(Self::Bybit),
            _ => None,
        }
    }

    /// Whether fetches against this exchange page backward when the
    /// requested row count exceeds one page.
    #[must_use]
    pub const fn paginates(self) -> bool {
        matches!(self, Self::Bybit)
    }

    /// Origin/Referer host sent with requests; both exchanges reject
    /// non-browser user agents on some endpoints.
    #[must_use]
    pub const fn web_origin(self) -> &'static str {
        match self {
            Self::Binance => "https://www.binance.com",
            Self::Bybit => "https://www.bybit.com",
        }
    }

    /// The interval token this exchange expects for a kline request.
    ///
    /// Binance accepts the timeframe names verbatim. Bybit uses minute
    /// codes; it has no native 8h kline, so 8h series are always derived by
    /// the target aggregation engine from a 4h base rather than fetched.
    #[must_use]
    pub fn kline_interval(self, timeframe: &str) -> String {
        match self {
            Self::Binance => timeframe.to_string(),
            Self::Bybit => match timeframe {
                "1m" => "1",
                "3m" => "3",
                "5m" => "5",
                "15m" => "15",
                "30m" => "30",
                "1h" => "60",
                "2h" => "120",
                "4h" | "8h" => "240",
                "6h" => "360",
                "12h" => "720",
                "1d" => "D",
                "1w" => "W",
                other => other,
            }
            .to_string(),
        }
    }
}

impl core::fmt::Display for Exchange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Base URLs for outbound requests. Overridable so tests can point the
/// client at a local mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeEndpoints {
    /// Binance futures REST base URL.
    pub binance: String,
    /// Bybit V5 REST base URL.
    pub bybit: String,
}

impl Default for ExchangeEndpoints {
    fn default() -> Self {
        Self {
            binance: "https://fapi.binance.com".to_string(),
            bybit: "https://api.bybit.com".to_string(),
        }
    }
}

impl ExchangeEndpoints {
    fn base(&self, exchange: Exchange) -> &str {
        match exchange {
            Exchange::Binance => &self.binance,
            Exchange::Bybit => &self.bybit,
        }
    }

    /// Klines request URL.
    ///
    /// The bybit URL carries no `limit`: page size is appended by the fetch
    /// strategy, which may split the request into backward pages.
    #[must_use]
    pub fn klines_url(&self, exchange: Exchange, symbol: &str, timeframe: &str, limit: u32) -> String {
        let base = self.base(exchange);
        let interval = exchange.kline_interval(timeframe);
        match exchange {
            Exchange::Binance => format!(
                "{base}/fapi/v1/klines?symbol={symbol}&interval={interval}&limit={limit}"
            ),
            Exchange::Bybit => format!(
                "{base}/v5/market/kline?category=linear&symbol={symbol}&interval={interval}"
            ),
        }
    }

    /// Open-interest request URL. Limits are clamped to each exchange's
    /// documented maximum (binance 500, bybit 200).
    #[must_use]
    pub fn open_interest_url(
        &self,
        exchange: Exchange,
        symbol: &str,
        period: &str,
        limit: u32,
    ) -> String {
        let base = self.base(exchange);
        match exchange {
            Exchange::Binance => {
                let limit = limit.min(500);
                format!(
                    "{base}/futures/data/openInterestHist?symbol={symbol}&period={period}&limit={limit}"
                )
            }
            Exchange::Bybit => {
                let limit = limit.min(200);
                format!(
                    "{base}/v5/market/open-interest?category=linear&symbol={symbol}&intervalTime={period}&limit={limit}"
                )
            }
        }
    }

    /// Funding-rate request URL. Limits are clamped to each exchange's
    /// documented maximum (binance 500, bybit 100).
    #[must_use]
    pub fn funding_rate_url(&self, exchange: Exchange, symbol: &str, limit: u32) -> String {
        let base = self.base(exchange);
        match exchange {
            Exchange::Binance => {
                let limit = limit.min(500);
                format!("{base}/fapi/v1/fundingRate?symbol={symbol}&limit={limit}")
            }
            Exchange::Bybit => {
                let limit = limit.min(100);
                format!(
                    "{base}/v5/market/funding/history?category=linear&symbol={symbol}&limit={limit}"
                )
            }
        }
    }

    /// Build the request URL for one `(exchange, data_type)` combination.
    #[must_use]
    pub fn url_for(
        &self,
        exchange: Exchange,
        data_type: DataType,
        symbol: &str,
        request_timeframe: &str,
        limit: u32,
    ) -> String {
        match data_type {
            DataType::Klines => self.klines_url(exchange, symbol, request_timeframe, limit),
            DataType::OpenInterest => {
                self.open_interest_url(exchange, symbol, request_timeframe, limit)
            }
            DataType::FundingRate => self.funding_rate_url(exchange, symbol, limit),
        }
    }
}

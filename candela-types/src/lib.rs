//! Candela-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod candle;
mod coin;
mod config;
mod error;
mod snapshot;

pub use candle::{Candle, DataType, FrSnapshot, OiSnapshot, RawCandle, RawField, SeriesBundle};
pub use coin::Coin;
pub use config::{AggregateOptions, CollectorConfig};
pub use error::CandelaError;
pub use snapshot::{Audit, MarketSnapshot, SymbolSeries};

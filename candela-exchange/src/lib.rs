//! candela-exchange
//!
//! The closed exchange set the pipeline collects from, with the per-exchange
//! URL construction rules, payload parsers, and fetch strategies. Resolving
//! an exchange happens once, at task-build time, against the [`Exchange`]
//! enum — there are no stringly-typed lookups that can fail at fetch time.
#![warn(missing_docs)]

mod client;
mod exchange;
mod parse;
mod task;

pub use client::{ExchangeClient, BYBIT_MAX_PAGE_SIZE};
pub use exchange::{Exchange, ExchangeEndpoints};
pub use parse::{parse_funding_rate, parse_klines, parse_open_interest, parse_payload, Parsed};
pub use task::Task;

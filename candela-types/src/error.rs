use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the candela workspace.
///
/// Configuration errors (`UnknownTimeframe`, `InvalidTarget`) are fatal for
/// the invocation that produced them. Task-level errors (`Exchange`, `Parse`)
/// never propagate past the task boundary; the pipeline converts them into
/// absent data. `NoData` is the whole-run failure signal.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CandelaError {
    /// A timeframe name with no entry in the interval table.
    #[error("unknown timeframe: {name}")]
    UnknownTimeframe {
        /// The unrecognized timeframe name as supplied by the caller.
        name: String,
    },

    /// Target aggregation requested with a target interval not strictly
    /// greater than the base interval.
    #[error("invalid target aggregation: target {target} must be coarser than base {base}")]
    InvalidTarget {
        /// Base timeframe name.
        base: String,
        /// Target timeframe name.
        target: String,
    },

    /// An exchange request failed (HTTP status, transport, or timeout).
    #[error("{exchange} request failed: {msg}")]
    Exchange {
        /// Exchange name that failed.
        exchange: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A payload could not be decoded into the expected series shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// The snapshot store collaborator failed.
    #[error("store error: {0}")]
    Store(String),

    /// Nothing was produced where data was required.
    #[error("no data: {what}")]
    NoData {
        /// Description of the missing data, e.g. "4h snapshot".
        what: String,
    },
}

impl CandelaError {
    /// Helper: build an `Exchange` error with the exchange name and message.
    pub fn exchange(exchange: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Exchange {
            exchange: exchange.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Parse` error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Helper: build a `Store` error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Helper: build a `NoData` error for a description of what was empty.
    pub fn no_data(what: impl Into<String>) -> Self {
        Self::NoData { what: what.into() }
    }

    /// Helper: build an `UnknownTimeframe` error.
    pub fn unknown_timeframe(name: impl Into<String>) -> Self {
        Self::UnknownTimeframe { name: name.into() }
    }

    /// Returns true when the error is a configuration problem that cannot be
    /// fixed by retrying the same invocation.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownTimeframe { .. } | Self::InvalidTarget { .. }
        )
    }
}

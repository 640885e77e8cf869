//! Time-series utilities: the interval table, UTC bucket alignment, the
//! per-symbol merge engine, and base→target aggregation.

pub mod aggregate;
pub mod interval;
pub mod merge;

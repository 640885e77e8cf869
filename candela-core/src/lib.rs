//! candela-core
//!
//! Time-series engines shared across the candela ecosystem.
//!
//! - `timeseries`: interval table, UTC bucket math, the kline/OI/FR merge
//!   engine, and the base→target aggregation engine.
//! - `format`: assembly of per-symbol series into the final cache document.
//! - `store`: the injectable snapshot store seam plus an in-process
//!   implementation for tests and demos.
//!
//! All series math operates on millisecond UNIX timestamps; the engines are
//! synchronous, non-yielding work over already-fetched in-memory data.
#![warn(missing_docs)]

/// Final cache document assembly.
pub mod format;
/// Snapshot store trait and the in-memory implementation.
pub mod store;
/// Interval math, merging, and target aggregation.
pub mod timeseries;

pub use format::format_snapshot;
pub use store::{MemoryStore, SnapshotStore};
pub use timeseries::aggregate::aggregate_to_target;
pub use timeseries::interval::{align_to_utc_boundary, interval_duration_ms, normalize_to_open_time};
pub use timeseries::merge::merge_series;

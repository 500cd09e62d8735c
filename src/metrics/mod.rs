//! Operation counters for cache observability, behind the `metrics` feature.
//!
//! Counters live inside the cache and are exported through
//! [`LruMetricsSnapshot`] so callers never observe a half-updated set.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;

pub use cell::MetricsCell;
pub use metrics_impl::LruMetrics;
pub use snapshot::LruMetricsSnapshot;

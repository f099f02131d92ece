//! # HTTP Middleware
//!
//! - `metrics` — Prometheus request counters, latency histogram, and the
//!   domain gauges updated on each `/metrics` scrape.

pub mod metrics;

//! Prometheus metrics for the MySQL Cluster Operator
//!
//! This module exposes metrics for monitoring operator health and performance.

pub mod prometheus;

pub use prometheus::*;

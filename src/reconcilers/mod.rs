//! Reconciliation logic for managed resources

pub mod cluster;

//! DBOps MySQL Cluster Kubernetes Operator
//!
//! This operator manages MySQL cluster instances in Kubernetes using
//! Custom Resource Definitions (CRDs), including their generated
//! credential and configuration secrets.

pub mod adapters;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};

//! Controller implementations for watching and reconciling resources

pub mod cluster_controller;

use kube::Client;
use std::sync::Arc;

use crate::adapters::credentials::{OsRandomSource, RandomSource};

/// Shared context for controllers
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Source of generated credential strings
    pub passwords: Arc<dyn RandomSource>,
}

impl Context {
    /// Create a new context with the production randomness source
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Self {
            client,
            passwords: Arc::new(OsRandomSource),
        })
    }
}

//! Adapters for credential modeling and Kubernetes resource building

pub mod credentials;
pub mod secret_builder;
pub mod secrets;

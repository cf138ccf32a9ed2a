//! Kubernetes secret fetching utilities

use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};

use crate::{Error, Result};

/// Fetch a secret by name from the given namespace, distinguishing
/// "not found" from genuine API failures.
///
/// A 404 answer means the secret does not exist yet and returns
/// `Ok(None)`; any other API error aborts the reconciliation pass.
pub async fn get_secret_opt(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<Secret>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    not_found_as_none(secrets.get(name).await, name)
}

/// Map a lookup result so that only a 404 answer reads as "absent"
pub fn not_found_as_none(
    result: std::result::Result<Secret, kube::Error>,
    name: &str,
) -> Result<Option<Secret>> {
    match result {
        Ok(secret) => Ok(Some(secret)),
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
        Err(e) => Err(Error::KubeError(format!(
            "Failed to get secret {}: {}",
            name, e
        ))),
    }
}

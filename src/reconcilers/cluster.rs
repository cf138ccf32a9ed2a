//! Reconciliation logic for MysqlCluster resources

use chrono::Utc;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::info;

use crate::adapters::credentials::{CredentialBundle, RandomSource};
use crate::adapters::{secret_builder, secrets};
use crate::crd::{Condition, MysqlCluster, MysqlClusterStatus};
use crate::{Error, Result};

/// Field manager for server-side apply
const FIELD_MANAGER: &str = "mysql-cluster-operator";

/// Validate a MysqlCluster spec
pub fn validate(cluster: &MysqlCluster) -> Result<()> {
    let spec = &cluster.spec;

    if spec.replicas < 0 {
        return Err(Error::ValidationError("replicas must be >= 0".to_string()));
    }

    if spec.mysql_version.is_empty() {
        return Err(Error::ValidationError(
            "mysqlVersion cannot be empty".to_string(),
        ));
    }

    if let Some(ref name) = spec.secret_name {
        if !is_dns1123_subdomain(name) {
            return Err(Error::ValidationError(format!(
                "secretName '{}' is not a valid DNS-1123 subdomain",
                name
            )));
        }
    }

    for (field, uri) in [
        ("initBucketUri", &spec.init_bucket_uri),
        ("backupBucketUri", &spec.backup_bucket_uri),
    ] {
        if !uri.is_empty() && !uri.contains("://") {
            return Err(Error::ValidationError(format!(
                "{} must carry a scheme (e.g. s3://, gs://)",
                field
            )));
        }
    }

    Ok(())
}

fn is_dns1123_subdomain(name: &str) -> bool {
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
            && label.ends_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}

/// Reconcile the credentials Secret for a cluster.
///
/// Adopts the existing secret when present: its labels become the merge
/// basis and its data seeds the credential bundle, so fields set by an
/// administrator are preserved and only missing fields are generated.
/// A lookup failure other than 404 aborts the pass; it is never taken
/// as "secret does not exist".
///
/// Returns the secret name and the checksum of its payload.
pub async fn reconcile_credentials_secret(
    cluster: &MysqlCluster,
    client: &Client,
    namespace: &str,
    source: &dyn RandomSource,
) -> Result<(String, String)> {
    let secret_name = cluster.credentials_secret_name();

    let existing = secrets::get_secret_opt(client, namespace, &secret_name).await?;

    let mut bundle = existing
        .as_ref()
        .and_then(|s| s.data.as_ref())
        .map(CredentialBundle::from_data)
        .unwrap_or_default();

    bundle.apply_defaults(&cluster.primary_host(namespace), source);

    let data = bundle.to_data();
    let checksum = credentials_checksum(&data);

    let secret = secret_builder::build_credentials_secret(
        cluster,
        namespace,
        &secret_name,
        existing.as_ref(),
        data,
    );

    apply_secret(client, namespace, &secret_name, &secret).await?;

    info!(
        "Reconciled credentials Secret {}/{} (adopted: {})",
        namespace,
        secret_name,
        existing.is_some()
    );

    Ok((secret_name, checksum))
}

/// Reconcile the environment/config Secret for a cluster
pub async fn reconcile_env_secret(
    cluster: &MysqlCluster,
    client: &Client,
    namespace: &str,
) -> Result<String> {
    let secret_name = cluster.env_secret_name();
    let secret = secret_builder::build_env_config_secret(cluster, namespace);

    apply_secret(client, namespace, &secret_name, &secret).await?;

    info!("Reconciled env-config Secret {}/{}", namespace, secret_name);

    Ok(secret_name)
}

async fn apply_secret(
    client: &Client,
    namespace: &str,
    name: &str,
    secret: &Secret,
) -> Result<()> {
    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let patch_params = PatchParams::apply(FIELD_MANAGER);

    api.patch(name, &patch_params, &Patch::Apply(secret))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to create/update Secret {}: {}", name, e)))?;

    Ok(())
}

/// Update the status of a MysqlCluster
pub async fn update_status(
    cluster: &MysqlCluster,
    client: &Client,
    namespace: &str,
    secret_name: &str,
    env_secret_name: &str,
    credentials_checksum: &str,
) -> Result<()> {
    let name = cluster.name_any();
    let now = Utc::now();

    let conditions = vec![
        Condition {
            type_: "CredentialsReady".to_string(),
            status: "True".to_string(),
            last_transition_time: now,
            reason: Some("SecretReconciled".to_string()),
            message: Some(format!("Credentials secret {} is up to date", secret_name)),
        },
        Condition {
            type_: "EnvConfigReady".to_string(),
            status: "True".to_string(),
            last_transition_time: now,
            reason: Some("SecretReconciled".to_string()),
            message: Some(format!("Env-config secret {} is up to date", env_secret_name)),
        },
        Condition {
            type_: "Ready".to_string(),
            status: "True".to_string(),
            last_transition_time: now,
            reason: Some("Reconciled".to_string()),
            message: Some("Cluster secrets are reconciled".to_string()),
        },
    ];

    let status = MysqlClusterStatus {
        phase: Some("Ready".to_string()),
        message: Some(format!(
            "Secrets {} and {} reconciled",
            secret_name, env_secret_name
        )),
        secret_name: Some(secret_name.to_string()),
        env_secret_name: Some(env_secret_name.to_string()),
        credentials_checksum: Some(credentials_checksum.to_string()),
        observed_generation: cluster.metadata.generation,
        last_update_time: Some(now),
        conditions,
    };

    let clusters: Api<MysqlCluster> = Api::namespaced(client.clone(), namespace);
    let patch = serde_json::json!({ "status": status });

    clusters
        .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|e| Error::KubeError(format!("Failed to update status: {}", e)))?;

    info!(
        "Updated status for {}/{}: checksum={}",
        namespace, name, credentials_checksum
    );

    Ok(())
}

/// Truncated SHA-256 over the key-sorted credential payload. Goes into
/// status so drift is observable without exposing the payload.
pub fn credentials_checksum(data: &BTreeMap<String, ByteString>) -> String {
    let mut hasher = Sha256::new();
    for (key, value) in data {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(&value.0);
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())[..16].to_string()
}

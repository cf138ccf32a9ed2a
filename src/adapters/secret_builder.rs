//! Kubernetes Secret builders for cluster credentials and configuration

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::ByteString;
use std::collections::BTreeMap;

use crate::crd::MysqlCluster;

/// Build the credentials Secret for a cluster.
///
/// When an existing secret is adopted its labels are the merge basis, so
/// administrator-set labels survive; operator labels win on key conflict.
pub fn build_credentials_secret(
    cluster: &MysqlCluster,
    namespace: &str,
    name: &str,
    existing: Option<&Secret>,
    data: BTreeMap<String, ByteString>,
) -> Secret {
    let basis = existing
        .and_then(|s| s.metadata.labels.clone())
        .unwrap_or_default();
    let labels = merge_labels(basis, cluster);

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            owner_references: Some(vec![build_owner_reference(cluster)]),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

/// Build the environment/config Secret holding plain cluster settings
/// consumed by the MySQL pods at startup.
pub fn build_env_config_secret(cluster: &MysqlCluster, namespace: &str) -> Secret {
    let name = cluster.metadata.name.clone().unwrap_or_default();

    let configs = [
        ("MYSQL_CLUSTER_NAME", name.clone()),
        ("MYSQL_GOVERNING_SERVICE", cluster.headless_service_name()),
        ("MYSQL_INIT_BUCKET_URI", cluster.spec.init_bucket_uri.clone()),
        (
            "MYSQL_BACKUP_BUCKET_URI",
            cluster.spec.backup_bucket_uri.clone(),
        ),
    ];

    let data: BTreeMap<String, ByteString> = configs
        .into_iter()
        .map(|(k, v)| (k.to_string(), ByteString(v.into_bytes())))
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(cluster.env_secret_name()),
            namespace: Some(namespace.to_string()),
            labels: Some(merge_labels(BTreeMap::new(), cluster)),
            owner_references: Some(vec![build_owner_reference(cluster)]),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

/// Layer operator labels onto an existing label set. Operator labels
/// override on conflict.
pub fn merge_labels(
    mut basis: BTreeMap<String, String>,
    cluster: &MysqlCluster,
) -> BTreeMap<String, String> {
    for (k, v) in operator_labels(cluster) {
        basis.insert(k, v);
    }
    basis
}

/// The operator-managed label set for a cluster's generated objects
pub fn operator_labels(cluster: &MysqlCluster) -> BTreeMap<String, String> {
    let name = cluster.metadata.name.clone().unwrap_or_default();

    let mut labels = BTreeMap::new();
    labels.insert("app.kubernetes.io/name".to_string(), "mysql".to_string());
    labels.insert("app.kubernetes.io/instance".to_string(), name.clone());
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "mysql-cluster-operator".to_string(),
    );
    labels.insert("mysql.dbops.io/cluster".to_string(), name);
    labels
}

/// Owner reference pointing generated objects at their cluster
pub fn build_owner_reference(cluster: &MysqlCluster) -> OwnerReference {
    OwnerReference {
        api_version: "mysql.dbops.io/v1alpha1".to_string(),
        kind: "MysqlCluster".to_string(),
        name: cluster.metadata.name.clone().unwrap_or_default(),
        uid: cluster.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

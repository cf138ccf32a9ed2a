//! Integration tests for reconciler validation and secret assembly
//!
//! These tests verify that MysqlCluster specs are accepted or rejected
//! correctly and that the generated Secret objects carry the expected
//! identity, labels and owner references.

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use mysql_cluster_operator::adapters::{secret_builder, secrets};
use mysql_cluster_operator::crd::{MysqlCluster, MysqlClusterSpec};
use mysql_cluster_operator::reconcilers::cluster;
use std::collections::BTreeMap;

// ============================================================================
// Test Helpers
// ============================================================================

fn valid_cluster_spec() -> MysqlClusterSpec {
    MysqlClusterSpec {
        replicas: 2,
        mysql_version: "5.7".to_string(),
        secret_name: None,
        init_bucket_uri: String::new(),
        backup_bucket_uri: String::new(),
    }
}

fn default_metadata(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some("default".to_string()),
        uid: Some("11111111-2222-3333-4444-555555555555".to_string()),
        ..Default::default()
    }
}

fn create_cluster(spec: MysqlClusterSpec) -> MysqlCluster {
    MysqlCluster {
        metadata: default_metadata("test-cluster"),
        spec,
        status: None,
    }
}

// ============================================================================
// Basic Validation Tests
// ============================================================================

#[test]
fn cluster_valid_spec_passes_validation() {
    let mysql = create_cluster(valid_cluster_spec());
    let result = cluster::validate(&mysql);
    if let Err(e) = &result {
        panic!("Validation failed unexpectedly: {:?}", e);
    }
    assert!(result.is_ok());
}

#[test]
fn cluster_negative_replicas_fails_validation() {
    let mut spec = valid_cluster_spec();
    spec.replicas = -1;

    let result = cluster::validate(&create_cluster(spec));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("replicas"));
}

#[test]
fn cluster_empty_mysql_version_fails_validation() {
    let mut spec = valid_cluster_spec();
    spec.mysql_version = String::new();

    let result = cluster::validate(&create_cluster(spec));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("mysqlVersion"));
}

#[test]
fn cluster_invalid_secret_name_fails_validation() {
    for bad in ["", "Uppercase", "-leading-dash", "trailing-dash-", "a b"] {
        let mut spec = valid_cluster_spec();
        spec.secret_name = Some(bad.to_string());

        let result = cluster::validate(&create_cluster(spec));
        assert!(result.is_err(), "accepted invalid name {:?}", bad);
    }
}

#[test]
fn cluster_valid_secret_name_passes_validation() {
    let mut spec = valid_cluster_spec();
    spec.secret_name = Some("my-app.credentials".to_string());

    assert!(cluster::validate(&create_cluster(spec)).is_ok());
}

#[test]
fn cluster_bucket_uri_without_scheme_fails_validation() {
    let mut spec = valid_cluster_spec();
    spec.backup_bucket_uri = "bucket/path".to_string();

    let result = cluster::validate(&create_cluster(spec));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("backupBucketUri"));
}

#[test]
fn cluster_bucket_uri_with_scheme_passes_validation() {
    let mut spec = valid_cluster_spec();
    spec.init_bucket_uri = "s3://backups/seed".to_string();
    spec.backup_bucket_uri = "gs://backups/daily".to_string();

    assert!(cluster::validate(&create_cluster(spec)).is_ok());
}

// ============================================================================
// Naming Convention Tests
// ============================================================================

#[test]
fn credentials_secret_name_defaults_from_cluster_name() {
    let mysql = create_cluster(valid_cluster_spec());
    assert_eq!(mysql.credentials_secret_name(), "test-cluster-db-credentials");
}

#[test]
fn credentials_secret_name_honors_override() {
    let mut spec = valid_cluster_spec();
    spec.secret_name = Some("custom-creds".to_string());

    let mysql = create_cluster(spec);
    assert_eq!(mysql.credentials_secret_name(), "custom-creds");
}

#[test]
fn primary_host_points_at_pod_zero_of_governing_service() {
    let mysql = create_cluster(valid_cluster_spec());
    assert_eq!(
        mysql.primary_host("default"),
        "test-cluster-mysql-0.test-cluster-mysql-nodes.default"
    );
}

// ============================================================================
// Secret Assembly Tests
// ============================================================================

#[test]
fn credentials_secret_carries_identity_and_owner_reference() {
    let mysql = create_cluster(valid_cluster_spec());
    let secret = secret_builder::build_credentials_secret(
        &mysql,
        "default",
        "test-cluster-db-credentials",
        None,
        BTreeMap::new(),
    );

    assert_eq!(
        secret.metadata.name.as_deref(),
        Some("test-cluster-db-credentials")
    );
    assert_eq!(secret.metadata.namespace.as_deref(), Some("default"));

    let owners = secret.metadata.owner_references.expect("owner references");
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].kind, "MysqlCluster");
    assert_eq!(owners[0].api_version, "mysql.dbops.io/v1alpha1");
    assert_eq!(owners[0].name, "test-cluster");
    assert_eq!(owners[0].controller, Some(true));
}

#[test]
fn adopted_secret_labels_survive_the_merge() {
    let mysql = create_cluster(valid_cluster_spec());

    let mut existing_labels = BTreeMap::new();
    existing_labels.insert("team".to_string(), "payments".to_string());
    let existing = Secret {
        metadata: ObjectMeta {
            labels: Some(existing_labels),
            ..Default::default()
        },
        ..Default::default()
    };

    let secret = secret_builder::build_credentials_secret(
        &mysql,
        "default",
        "test-cluster-db-credentials",
        Some(&existing),
        BTreeMap::new(),
    );

    let labels = secret.metadata.labels.expect("labels");
    assert_eq!(labels.get("team").map(String::as_str), Some("payments"));
    assert_eq!(
        labels.get("app.kubernetes.io/managed-by").map(String::as_str),
        Some("mysql-cluster-operator")
    );
}

#[test]
fn operator_labels_win_on_key_collision() {
    let mysql = create_cluster(valid_cluster_spec());

    let mut basis = BTreeMap::new();
    basis.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "somebody-else".to_string(),
    );

    let merged = secret_builder::merge_labels(basis, &mysql);

    assert_eq!(
        merged.get("app.kubernetes.io/managed-by").map(String::as_str),
        Some("mysql-cluster-operator")
    );
    assert_eq!(
        merged.get("mysql.dbops.io/cluster").map(String::as_str),
        Some("test-cluster")
    );
}

#[test]
fn env_config_secret_carries_expected_keys() {
    let mut spec = valid_cluster_spec();
    spec.init_bucket_uri = "s3://seed".to_string();
    spec.backup_bucket_uri = "s3://backups".to_string();
    let mysql = create_cluster(spec);

    let secret = secret_builder::build_env_config_secret(&mysql, "default");

    assert_eq!(secret.metadata.name.as_deref(), Some("test-cluster-env-config"));
    let data = secret.data.expect("data");
    assert_eq!(
        String::from_utf8(data.get("MYSQL_CLUSTER_NAME").unwrap().0.clone()).unwrap(),
        "test-cluster"
    );
    assert_eq!(
        String::from_utf8(data.get("MYSQL_GOVERNING_SERVICE").unwrap().0.clone()).unwrap(),
        "test-cluster-mysql-nodes"
    );
    assert_eq!(
        String::from_utf8(data.get("MYSQL_INIT_BUCKET_URI").unwrap().0.clone()).unwrap(),
        "s3://seed"
    );
    assert_eq!(
        String::from_utf8(data.get("MYSQL_BACKUP_BUCKET_URI").unwrap().0.clone()).unwrap(),
        "s3://backups"
    );
}

// ============================================================================
// Store Lookup Classification Tests
// ============================================================================

fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("{} error", reason),
        reason: reason.to_string(),
        code,
    })
}

#[test]
fn missing_secret_reads_as_absent() {
    let result = secrets::not_found_as_none(Err(api_error(404, "NotFound")), "creds");
    assert!(matches!(result, Ok(None)));
}

#[test]
fn store_failure_is_never_taken_as_absent() {
    // A flaky API server must abort the pass, not trigger the
    // fresh-credential path.
    for code in [401, 403, 500, 503] {
        let result = secrets::not_found_as_none(Err(api_error(code, "ServerError")), "creds");
        assert!(result.is_err(), "code {} was swallowed", code);
    }
}

#[test]
fn found_secret_passes_through() {
    let secret = Secret {
        metadata: ObjectMeta {
            name: Some("creds".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let result = secrets::not_found_as_none(Ok(secret), "creds");
    assert!(matches!(result, Ok(Some(_))));
}

// ============================================================================
// Checksum Tests
// ============================================================================

#[test]
fn checksum_is_stable_for_identical_payloads() {
    let mut data = BTreeMap::new();
    data.insert("USER".to_string(), ByteString(b"alice".to_vec()));
    data.insert("PASSWORD".to_string(), ByteString(b"pw".to_vec()));

    assert_eq!(
        cluster::credentials_checksum(&data),
        cluster::credentials_checksum(&data.clone())
    );
    assert_eq!(cluster::credentials_checksum(&data).len(), 16);
}

#[test]
fn checksum_changes_when_a_value_changes() {
    let mut data = BTreeMap::new();
    data.insert("USER".to_string(), ByteString(b"alice".to_vec()));
    let before = cluster::credentials_checksum(&data);

    data.insert("USER".to_string(), ByteString(b"bob".to_vec()));

    assert_ne!(cluster::credentials_checksum(&data), before);
}

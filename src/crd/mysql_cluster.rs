//! MysqlCluster Custom Resource Definition

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// MysqlCluster resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "mysql.dbops.io",
    version = "v1alpha1",
    kind = "MysqlCluster",
    plural = "mysqlclusters",
    singular = "mysqlcluster",
    shortname = "mc",
    namespaced,
    status = "MysqlClusterStatus",
    printcolumn = r#"{"name": "Phase", "type": "string", "jsonPath": ".status.phase"}"#,
    printcolumn = r#"{"name": "Replicas", "type": "integer", "jsonPath": ".spec.replicas"}"#,
    printcolumn = r#"{"name": "Secret", "type": "string", "jsonPath": ".status.secretName"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MysqlClusterSpec {
    /// Number of MySQL server replicas
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// MySQL server version
    #[serde(default = "default_mysql_version")]
    pub mysql_version: String,

    /// Name of the credentials secret to adopt or create.
    /// Defaults to `<cluster>-db-credentials` when not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Bucket URI to seed the database from on first start
    #[serde(default)]
    pub init_bucket_uri: String,

    /// Bucket URI where backups are uploaded
    #[serde(default)]
    pub backup_bucket_uri: String,
}

fn default_replicas() -> i32 {
    1
}

fn default_mysql_version() -> String {
    "5.7".to_string()
}

impl MysqlCluster {
    /// Name of the credentials secret for this cluster
    pub fn credentials_secret_name(&self) -> String {
        match &self.spec.secret_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("{}-db-credentials", self.name_or_default()),
        }
    }

    /// Name of the environment/config secret for this cluster
    pub fn env_secret_name(&self) -> String {
        format!("{}-env-config", self.name_or_default())
    }

    /// Name of the governing (headless) service for the MySQL pods
    pub fn headless_service_name(&self) -> String {
        format!("{}-mysql-nodes", self.name_or_default())
    }

    /// DNS name of the writer (pod 0) under the governing service.
    /// This is the host written into the derived connection URL.
    pub fn primary_host(&self, namespace: &str) -> String {
        format!(
            "{}-mysql-0.{}.{}",
            self.name_or_default(),
            self.headless_service_name(),
            namespace
        )
    }

    fn name_or_default(&self) -> String {
        self.metadata.name.clone().unwrap_or_default()
    }
}

/// Status of a MysqlCluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MysqlClusterStatus {
    /// Current phase (Pending, Ready, Failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Name of the reconciled credentials secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Name of the reconciled environment/config secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_secret_name: Option<String>,

    /// Truncated SHA-256 of the credential payload. Lets drift be
    /// observed without placing secret material in status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_checksum: Option<String>,

    /// Generation observed by the last reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last status update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<DateTime<Utc>>,

    /// Conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Status condition
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type (Ready, CredentialsReady, EnvConfigReady)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status (True, False, Unknown)
    pub status: String,

    /// Last transition time
    pub last_transition_time: DateTime<Utc>,

    /// Reason for the condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

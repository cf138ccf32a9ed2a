//! Custom Resource Definitions for the MySQL Cluster Operator

mod mysql_cluster;

pub use mysql_cluster::*;

use kube::CustomResourceExt;

/// Generate CRD YAML manifests for all custom resources
pub fn generate_crds() -> Vec<String> {
    vec![serde_yaml::to_string(&MysqlCluster::crd()).unwrap()]
}

//! Controller for MysqlCluster resources

use futures::StreamExt;
use kube::{
    runtime::{
        controller::{Action, Controller},
        finalizer::{finalizer, Event},
        watcher::Config,
    },
    Api, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::controllers::Context;
use crate::crd::MysqlCluster;
use crate::metrics::prometheus::{RECONCILE_DURATION, RECONCILIATIONS, RECONCILIATION_ERRORS};
use crate::reconcilers::cluster;
use crate::Error;

/// Finalizer name for cleanup
pub const FINALIZER: &str = "mysql.dbops.io/cluster-finalizer";

/// Run the cluster controller
pub async fn run(ctx: Arc<Context>) {
    let client = ctx.client.clone();
    let clusters: Api<MysqlCluster> = Api::all(client.clone());

    info!("Starting MysqlCluster controller");

    Controller::new(clusters, Config::default().any_semantic())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok(o) => info!("Reconciled {:?}", o),
                Err(e) => error!("Reconcile failed: {:?}", e),
            }
        })
        .await;

    info!("MysqlCluster controller stopped");
}

/// Reconcile a MysqlCluster resource
#[instrument(skip(cluster, ctx), fields(name = %cluster.name_any(), namespace = cluster.namespace().unwrap_or_default()))]
async fn reconcile(cluster: Arc<MysqlCluster>, ctx: Arc<Context>) -> Result<Action, Error> {
    let start = std::time::Instant::now();
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    RECONCILIATIONS.with_label_values(&["MysqlCluster"]).inc();

    let clusters: Api<MysqlCluster> = Api::namespaced(ctx.client.clone(), &ns);

    let result = finalizer(&clusters, FINALIZER, cluster, |event| async {
        match event {
            Event::Apply(cluster) => apply(&cluster, &ctx).await,
            Event::Cleanup(cluster) => cleanup(&cluster, &ctx).await,
        }
    })
    .await;

    let duration = start.elapsed().as_secs_f64();
    RECONCILE_DURATION
        .with_label_values(&["MysqlCluster"])
        .observe(duration);

    match &result {
        Ok(_) => info!(
            "Successfully reconciled {}/{} in {:.2}s",
            ns, name, duration
        ),
        Err(e) => {
            RECONCILIATION_ERRORS
                .with_label_values(&["MysqlCluster"])
                .inc();
            error!("Failed to reconcile {}/{}: {:?}", ns, name, e);
        }
    }

    Ok(result?)
}

/// Apply changes for a MysqlCluster
async fn apply(cluster: &MysqlCluster, ctx: &Context) -> Result<Action, Error> {
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    info!("Applying MysqlCluster {}/{}", ns, name);

    // Validate the spec
    cluster::validate(cluster)?;

    // Reconcile the credentials secret
    let (secret_name, checksum) =
        cluster::reconcile_credentials_secret(cluster, &ctx.client, &ns, ctx.passwords.as_ref())
            .await?;

    // Reconcile the env-config secret
    let env_secret_name = cluster::reconcile_env_secret(cluster, &ctx.client, &ns).await?;

    // Update status
    cluster::update_status(
        cluster,
        &ctx.client,
        &ns,
        &secret_name,
        &env_secret_name,
        &checksum,
    )
    .await?;

    // Requeue after 5 minutes to re-check the secrets
    Ok(Action::requeue(Duration::from_secs(300)))
}

/// Cleanup resources when a MysqlCluster is deleted
async fn cleanup(cluster: &MysqlCluster, _ctx: &Context) -> Result<Action, Error> {
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    info!("Cleaning up MysqlCluster {}/{}", ns, name);

    // Generated secrets are cleaned up automatically via owner references
    // Just log and return

    Ok(Action::await_change())
}

/// Error policy for the controller
fn error_policy(cluster: Arc<MysqlCluster>, err: &Error, _ctx: Arc<Context>) -> Action {
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    error!("Reconciliation error for {}/{}: {:?}", ns, name, err);

    // Requeue with backoff based on error type
    match err {
        Error::KubeError(_) => Action::requeue(Duration::from_secs(30)),
        Error::ValidationError(_) => Action::requeue(Duration::from_secs(300)),
        _ => Action::requeue(Duration::from_secs(60)),
    }
}

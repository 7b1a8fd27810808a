//! Inventory generation run

use std::future::Future;
use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use tokio::fs;
use tracing::{info, warn};

use crate::app::options::{AppOptions, OutputFormat};
use crate::errors::InventoryError;
use crate::http::client::{HttpClient, TransportOptions};
use crate::inventory::builder::InventoryBuilder;
use crate::inventory::Inventory;
use crate::storage::config::DirectorConfig;

/// Load the director config, build the inventory and render it
pub async fn run(options: &AppOptions) -> Result<String, InventoryError> {
    let config = DirectorConfig::load(&options.config_path).await?;
    let client = connect(config, options).await?;

    let inventory = build_inventory(&client, options, tokio::time::sleep).await?;
    render(&inventory, &options.format)
}

/// Create the director client from the loaded config
pub async fn connect(
    config: DirectorConfig,
    options: &AppOptions,
) -> Result<HttpClient, InventoryError> {
    let mut transport = TransportOptions::new(config.username, config.password);

    if let Some(ca_cert) = &config.ca_cert {
        transport.ca_cert_pem = Some(ca_cert.pem().await?);
    }

    if let Some(path) = &options.client_cert_path {
        let pem = fs::read(path).await.map_err(|e| {
            InventoryError::ConfigError(format!(
                "Unable to read client certificate {}: {}",
                path.display(),
                e
            ))
        })?;
        transport.client_identity_pem = Some(pem);
    }

    HttpClient::new(&config.target, transport)
}

/// Resolve every wanted deployment and project its instances.
///
/// Up to `options.concurrency` deployments are resolved at once; results are
/// merged in the order the director listed the deployments.
pub async fn build_inventory<S, F>(
    client: &HttpClient,
    options: &AppOptions,
    sleep_fn: S,
) -> Result<Inventory, InventoryError>
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let deployments: Vec<_> = client
        .list_deployments()
        .await?
        .into_iter()
        .filter(|d| options.wants_deployment(&d.name))
        .collect();
    info!(
        "Resolving {} deployments through {}",
        deployments.len(),
        options.enumeration
    );

    let sleep_fn = &sleep_fn;
    let resolved: Vec<_> = stream::iter(deployments)
        .map(|deployment| async move {
            let outcome = client
                .resolve_instances(&deployment, options.enumeration, &options.poll, sleep_fn)
                .await?;
            Ok::<_, InventoryError>((deployment, outcome))
        })
        .buffered(options.concurrency.max(1))
        .try_collect()
        .await?;

    let mut builder = InventoryBuilder::new(&options.hosts);
    for (deployment, outcome) in resolved {
        if outcome.is_completed() {
            info!("Deployment {}: {}", deployment.name, outcome);
        } else {
            warn!("Deployment {}: {}, listing no instances", deployment.name, outcome);
        }
        builder.add_deployment(&deployment.name, &outcome.into_instances());
    }

    Ok(builder.build())
}

/// Render the inventory in the requested format
pub fn render(inventory: &Inventory, format: &OutputFormat) -> Result<String, InventoryError> {
    match format {
        OutputFormat::Ini => Ok(inventory.render_ini()),
        OutputFormat::Json => inventory.render_json(),
        OutputFormat::Host(host) => inventory.render_host(host),
    }
}

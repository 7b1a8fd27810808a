//! Deployment API client

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::errors::InventoryError;
use crate::http::client::HttpClient;
use crate::models::deployment::Deployment;

impl HttpClient {
    /// List the deployments known to the director.
    ///
    /// A non-200 answer yields an empty list; transport failures and an
    /// undecodable body are errors.
    pub async fn list_deployments(&self) -> Result<Vec<Deployment>, InventoryError> {
        let url = self.url("/deployments");
        let response = self.get(&url, &[]).await?;

        if response.status() != StatusCode::OK {
            warn!("Listing deployments failed with status {}", response.status());
            return Ok(Vec::new());
        }

        let deployments: Vec<Deployment> = response.json().await?;
        debug!("Director has {} deployments", deployments.len());
        Ok(deployments)
    }
}

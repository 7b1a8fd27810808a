//! BOSH CLI configuration file

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::errors::InventoryError;

/// Raw layout of the BOSH CLI config file, keyed by director URL
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    target: Option<String>,

    #[serde(default)]
    ca_cert: HashMap<String, Option<String>>,

    #[serde(default)]
    auth: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    username: String,
    password: String,
}

/// CA certificate for the targeted director
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaCert {
    /// Path to a PEM file
    Path(PathBuf),

    /// PEM text embedded in the config file
    Pem(String),
}

impl CaCert {
    fn parse(value: &str) -> Self {
        if value.trim_start().starts_with("-----BEGIN") {
            CaCert::Pem(value.to_string())
        } else {
            CaCert::Path(PathBuf::from(value))
        }
    }

    /// PEM bytes of the certificate
    pub async fn pem(&self) -> Result<Vec<u8>, InventoryError> {
        match self {
            CaCert::Pem(pem) => Ok(pem.as_bytes().to_vec()),
            CaCert::Path(path) => fs::read(path).await.map_err(|e| {
                InventoryError::ConfigError(format!(
                    "Unable to read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            }),
        }
    }
}

/// Director connection settings resolved for the current target
#[derive(Debug)]
pub struct DirectorConfig {
    /// Director base URL
    pub target: String,

    pub ca_cert: Option<CaCert>,

    pub username: String,

    pub password: SecretString,
}

impl DirectorConfig {
    /// Read and resolve the config file at `path`
    pub async fn load(path: &Path) -> Result<Self, InventoryError> {
        debug!("Reading BOSH config from {}", path.display());
        let contents = fs::read_to_string(path).await.map_err(|e| {
            InventoryError::ConfigError(format!("Unable to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }

    /// Resolve the targeted director from the YAML document
    pub fn from_yaml(contents: &str) -> Result<Self, InventoryError> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;

        let target = file
            .target
            .filter(|t| !t.is_empty())
            .ok_or_else(|| InventoryError::ConfigError("No target defined".to_string()))?;

        let ca_cert = file
            .ca_cert
            .get(&target)
            .and_then(|c| c.as_deref())
            .filter(|c| !c.trim().is_empty())
            .map(CaCert::parse);

        let auth = file.auth.get(&target).ok_or_else(|| {
            InventoryError::ConfigError(format!("No credentials for target {}", target))
        })?;

        Ok(Self {
            target: target.clone(),
            ca_cert,
            username: auth.username.clone(),
            password: SecretString::from(auth.password.clone()),
        })
    }
}

//! Application configuration options

use std::path::PathBuf;

use crate::http::tasks::PollOptions;
use crate::inventory::builder::HostOptions;
use crate::models::task::Enumeration;

/// What to print once the inventory is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// INI inventory
    #[default]
    Ini,

    /// Dynamic inventory JSON (`--list`)
    Json,

    /// Variables of a single host (`--host`)
    Host(String),
}

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// BOSH CLI config file holding the target and its credentials
    pub config_path: PathBuf,

    /// PEM file with a client certificate and key
    pub client_cert_path: Option<PathBuf>,

    /// Only inventory the deployment with this name
    pub target_deployment: Option<String>,

    /// Director listing used to resolve instances
    pub enumeration: Enumeration,

    /// Task polling options
    pub poll: PollOptions,

    /// Instance to host projection
    pub hosts: HostOptions,

    /// Deployments resolved at the same time
    pub concurrency: usize,

    pub format: OutputFormat,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(".bosh_config"),
            client_cert_path: None,
            target_deployment: None,
            enumeration: Enumeration::default(),
            poll: PollOptions::default(),
            hosts: HostOptions::default(),
            concurrency: 4,
            format: OutputFormat::default(),
        }
    }
}

impl AppOptions {
    /// Whether a deployment passes the deployment filter
    pub fn wants_deployment(&self, name: &str) -> bool {
        match self.target_deployment.as_deref() {
            Some(target) if !target.is_empty() => target == name,
            _ => true,
        }
    }
}

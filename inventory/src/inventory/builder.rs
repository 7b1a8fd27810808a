//! Projection of director instances into inventory hosts

use serde_json::Value;
use tracing::debug;

use crate::inventory::{HostVars, Inventory, RESERVED_GROUPS};
use crate::models::instance::Instance;

/// Variable holding the address Ansible connects to
pub const ANSIBLE_HOST: &str = "ansible_host";

/// How instances become hosts
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Instance field naming the host, `dns` or `vm_cid` for example
    pub host_attribute: String,

    /// 1-based position in `ips` exported as `ansible_host`, 0 disables
    pub ip_index: usize,

    /// Instance fields copied into the host variables
    pub pass_through: Vec<String>,

    /// Fixed variables added to every host
    pub literals: Vec<(String, String)>,

    /// Keep instances whose VM is not provisioned yet
    pub include_unprovisioned: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            host_attribute: "dns".to_string(),
            ip_index: 0,
            pass_through: Vec::new(),
            literals: Vec::new(),
            include_unprovisioned: false,
        }
    }
}

/// Builds an [`Inventory`] one deployment at a time
pub struct InventoryBuilder<'a> {
    options: &'a HostOptions,
    inventory: Inventory,
}

impl<'a> InventoryBuilder<'a> {
    pub fn new(options: &'a HostOptions) -> Self {
        Self {
            options,
            inventory: Inventory::default(),
        }
    }

    /// Add a deployment group and a host per usable instance
    pub fn add_deployment(&mut self, deployment: &str, instances: &[Instance]) {
        if is_reserved(deployment) {
            self.inventory
                .warn(format!("Skipping deployment with reserved name '{}'", deployment));
            return;
        }
        self.inventory.add_deployment_group(deployment);

        for instance in instances {
            self.add_instance(deployment, instance);
        }
    }

    pub fn build(self) -> Inventory {
        self.inventory
    }

    fn add_instance(&mut self, deployment: &str, instance: &Instance) {
        let Some(job) = instance.job_name() else {
            debug!("Skipping instance without job name in {}", deployment);
            return;
        };
        if is_reserved(job) {
            self.inventory.warn(format!(
                "Skipping job with reserved name '{}' in deployment {}",
                job, deployment
            ));
            return;
        }
        if !self.options.include_unprovisioned && !instance.is_provisioned() {
            debug!("Skipping unprovisioned instance {}/{:?}", job, instance.index());
            return;
        }

        let (host, is_fallback) = match instance.host_id(&self.options.host_attribute) {
            Some(id) => (id, false),
            None => match instance.fallback_id() {
                Some(id) => (id, true),
                None => {
                    self.inventory.warn(format!(
                        "Skipping instance of job {} without '{}' nor index",
                        job, self.options.host_attribute
                    ));
                    return;
                }
            },
        };
        if self.inventory.has_host(&host) {
            self.inventory
                .warn(format!("Skipping duplicate host {} in job {}", host, job));
            return;
        }

        let mut vars = HostVars::new();
        if let Some(address) = self.select_address(&host, instance, is_fallback) {
            vars.insert(ANSIBLE_HOST.to_string(), Value::String(address));
        }
        for field in &self.options.pass_through {
            if let Some(value) = instance.field(field) {
                vars.insert(field.clone(), value.clone());
            }
        }
        for (key, value) in &self.options.literals {
            vars.insert(key.clone(), Value::String(value.clone()));
        }

        self.inventory.add_job_group(deployment, job);
        self.inventory.add_host(job, host, vars);
    }

    /// Address exported as `ansible_host`.
    ///
    /// With an IP index configured the selected IP wins, falling back to the
    /// first one when the index is out of range. Without one, only hosts
    /// named by their fallback id get an address, so they stay reachable.
    fn select_address(
        &mut self,
        host: &str,
        instance: &Instance,
        is_fallback: bool,
    ) -> Option<String> {
        let ips = instance.ips();
        let index = self.options.ip_index;

        if index == 0 {
            return if is_fallback {
                ips.first().map(|ip| ip.to_string())
            } else {
                None
            };
        }

        if let Some(ip) = ips.get(index - 1) {
            return Some(ip.to_string());
        }

        match ips.first() {
            Some(first) => {
                self.inventory.warn(format!(
                    "Host {} has {} IPs, no IP at index {}: using {}",
                    host,
                    ips.len(),
                    index,
                    first
                ));
                Some(first.to_string())
            }
            None => {
                self.inventory
                    .warn(format!("Host {} has no IPs, no ansible_host set", host));
                None
            }
        }
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_GROUPS.contains(&name)
}

//! Ansible inventory model
//!
//! Deployments and jobs share one group namespace, as they do in Ansible.
//! Groups keep insertion order so that the rendered document only depends on
//! the order the director lists things in.

use std::collections::HashMap;

use serde_json::{Map, Value};

pub mod builder;
pub mod ini;
pub mod json;

/// Group names Ansible reserves for itself
pub const RESERVED_GROUPS: [&str; 2] = ["_meta", "all"];

/// Variables attached to a single host
pub type HostVars = Map<String, Value>;

/// An inventory group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub name: String,

    /// Set when a deployment carries this name
    pub is_deployment: bool,

    /// Set when a job carries this name
    pub is_job: bool,

    pub children: Vec<String>,

    pub hosts: Vec<String>,
}

/// Grouped host listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
    hostvars: Map<String, Value>,
    warnings: Vec<String>,
}

impl Inventory {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    /// Deployment groups, in listing order
    pub fn deployments(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|g| g.is_deployment)
    }

    /// Variables of one host, `None` for unknown hosts
    pub fn hostvars(&self, host: &str) -> Option<&HostVars> {
        self.hostvars.get(host).and_then(Value::as_object)
    }

    pub fn has_host(&self, host: &str) -> bool {
        self.hostvars.contains_key(host)
    }

    /// Non-fatal problems met while projecting instances
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Every `(group, host)` membership
    pub fn memberships(&self) -> Vec<(String, String)> {
        self.groups
            .iter()
            .flat_map(|g| g.hosts.iter().map(move |h| (g.name.clone(), h.clone())))
            .collect()
    }

    fn group_mut(&mut self, name: &str) -> &mut Group {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.groups.push(Group {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.index.insert(name.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[i]
    }

    pub(crate) fn add_deployment_group(&mut self, name: &str) {
        self.group_mut(name).is_deployment = true;
    }

    pub(crate) fn add_job_group(&mut self, deployment: &str, job: &str) {
        self.group_mut(job).is_job = true;
        if job != deployment {
            let parent = self.group_mut(deployment);
            if !parent.children.iter().any(|c| c == job) {
                parent.children.push(job.to_string());
            }
        }
    }

    pub(crate) fn add_host(&mut self, job: &str, host: String, vars: HostVars) {
        self.group_mut(job).hosts.push(host.clone());
        self.hostvars.insert(host, Value::Object(vars));
    }

    pub(crate) fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

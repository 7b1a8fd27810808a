//! Director task models

use serde::{Deserialize, Serialize};

/// The only task state this client treats as finished
pub const TASK_STATE_DONE: &str = "done";

/// Task status document returned by `GET /tasks/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(default)]
    pub id: Option<u64>,

    /// Director task state: queued, processing, done, error, cancelled, ...
    pub state: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl TaskStatus {
    /// Whether the task finished successfully.
    ///
    /// Every other state, including `error` and `cancelled`, keeps the poller
    /// waiting until its budget runs out.
    pub fn is_done(&self) -> bool {
        self.state == TASK_STATE_DONE
    }
}

/// Which director listing a deployment is resolved through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Enumeration {
    /// Desired state: includes errands, does not contact agents
    #[default]
    Instances,

    /// Live state: asks each VM agent, excludes errands
    Vms,
}

impl Enumeration {
    /// Endpoint segment under `/deployments/{name}/`
    pub fn endpoint(&self) -> &'static str {
        match self {
            Enumeration::Instances => "instances",
            Enumeration::Vms => "vms",
        }
    }
}

impl std::fmt::Display for Enumeration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

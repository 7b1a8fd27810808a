//! Deployment models

use serde::{Deserialize, Serialize};

/// A deployment known to the director.
///
/// The director returns releases, stemcells and cloud config alongside the
/// name; none of them matter for the inventory and serde drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Deployment name, unique per director
    pub name: String,
}

impl Deployment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

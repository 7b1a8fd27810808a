//! Instance records decoded from a task result stream

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One job instance as reported by the director.
///
/// The director sends an open JSON object whose shape differs between the
/// `instances` and `vms` listings, so the record keeps every field and offers
/// typed accessors for the ones the inventory relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instance(Map<String, Value>);

impl Instance {
    /// Look up any field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn job_name(&self) -> Option<&str> {
        self.field("job_name").and_then(Value::as_str)
    }

    /// Job-local index. Older directors send it as a string.
    pub fn index(&self) -> Option<i64> {
        match self.field("index")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// VM identifier, `None` while the VM is not provisioned
    pub fn vm_cid(&self) -> Option<&str> {
        self.field("vm_cid")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_provisioned(&self) -> bool {
        self.vm_cid().is_some()
    }

    pub fn ips(&self) -> Vec<&str> {
        string_list(self.field("ips"))
    }

    pub fn dns(&self) -> Vec<&str> {
        string_list(self.field("dns"))
    }

    /// Host identifier read from `attribute`.
    ///
    /// Lists yield their first element, scalars are used as they are. Empty
    /// values count as missing.
    pub fn host_id(&self, attribute: &str) -> Option<String> {
        let id = match self.field(attribute)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items.first()?.as_str()?.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// `{job_name}-{index}`, used when the host identifier is missing
    pub fn fallback_id(&self) -> Option<String> {
        Some(format!("{}-{}", self.job_name()?, self.index()?))
    }
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    }
}

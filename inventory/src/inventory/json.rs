//! JSON rendering for `--list` and `--host`

use serde_json::{json, Map, Value};

use crate::errors::InventoryError;
use crate::inventory::Inventory;

impl Inventory {
    /// Dynamic inventory document.
    ///
    /// `_meta.hostvars` comes first, then every group in insertion order with
    /// both its `children` and `hosts`.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("_meta".to_string(), json!({ "hostvars": self.hostvars }));

        for group in &self.groups {
            root.insert(
                group.name.clone(),
                json!({
                    "children": group.children,
                    "hosts": group.hosts,
                }),
            );
        }

        Value::Object(root)
    }

    pub fn render_json(&self) -> Result<String, InventoryError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    /// Variables of one host for `--host`, `{}` for unknown hosts
    pub fn render_host(&self, host: &str) -> Result<String, InventoryError> {
        let vars = self.hostvars(host).cloned().unwrap_or_default();
        Ok(serde_json::to_string_pretty(&vars)?)
    }
}

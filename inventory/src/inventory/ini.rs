//! INI rendering for static inventories

use std::fmt::Write;

use serde_json::Value;

use crate::inventory::Inventory;

impl Inventory {
    /// INI inventory.
    ///
    /// `[all:children]` lists the deployments, `[deployment:children]` its
    /// jobs and `[job]` one line per host with its variables inlined. Every
    /// section ends with a blank line.
    pub fn render_ini(&self) -> String {
        let mut out = String::new();

        out.push_str("[all:children]\n");
        for deployment in self.deployments() {
            let _ = writeln!(out, "{}", deployment.name);
        }
        out.push('\n');

        for group in &self.groups {
            if group.is_deployment {
                let _ = writeln!(out, "[{}:children]", group.name);
                for child in &group.children {
                    let _ = writeln!(out, "{}", child);
                }
                out.push('\n');
            }
            if group.is_job {
                let _ = writeln!(out, "[{}]", group.name);
                for host in &group.hosts {
                    let _ = writeln!(out, "{}", self.host_line(host));
                }
                out.push('\n');
            }
        }

        out
    }

    fn host_line(&self, host: &str) -> String {
        let mut line = host.to_string();
        if let Some(vars) = self.hostvars(host) {
            for (key, value) in vars {
                let _ = write!(line, " {}={}", key, ini_value(value));
            }
        }
        line
    }
}

/// Render a variable value as an INI token
fn ini_value(value: &Value) -> String {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        if raw.contains('"') {
            format!("'{}'", raw)
        } else {
            format!("\"{}\"", raw)
        }
    } else {
        raw
    }
}

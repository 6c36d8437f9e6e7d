//! TOML device descriptions.
//!
//! A device file is a flat table of the same keys a script's `device:`
//! lines accept. A `[device]` table is accepted as well.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Read a device file into `key = value` overrides.
pub fn load(path: &Path) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read device file: {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid device file: {}", path.display()))
}

/// Flatten a device table into string settings, in key order.
pub fn parse(text: &str) -> Result<Vec<(String, String)>> {
    let mut table: toml::Table = toml::from_str(text)?;
    if let Some(toml::Value::Table(inner)) = table.remove("device") {
        if !table.is_empty() {
            bail!("keys outside [device] are not allowed alongside it");
        }
        table = inner;
    }

    let mut settings = Vec::with_capacity(table.len());
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            other => bail!("device setting '{key}' has unsupported type {}", other.type_str()),
        };
        settings.push((key, value));
    }
    Ok(settings)
}

//! Reading configuration files and reading/writing state files.

use anyhow::{Context as AnyhowContext, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;

use crate::context::Context;
use crate::lifecycle::ResourceState;
use crate::schema::Diagnostic;
use crate::traits::FileSystem;

/// Load a YAML or JSON mapping of attribute values
pub fn read_config(fs: &dyn FileSystem, path: &Path) -> Result<Map<String, Value>> {
    let content = fs.read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let value: Value = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!(
            "Config file {} must contain a mapping of attribute values",
            path.display()
        ),
    }
}

/// Load a state file, `None` when it does not exist yet
pub fn read_state(fs: &dyn FileSystem, path: &Path) -> Result<Option<ResourceState>> {
    if !fs.is_file(path) {
        return Ok(None);
    }

    let content = fs.read_to_string(path)?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

    Ok(Some(state))
}

/// Load a state file that must exist
pub fn require_state(fs: &dyn FileSystem, path: &Path) -> Result<ResourceState> {
    read_state(fs, path)?
        .with_context(|| format!("State file not found: {}", path.display()))
}

pub fn write_state(fs: &dyn FileSystem, path: &Path, state: &ResourceState) -> Result<()> {
    let content = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
    fs.write(path, &content)
}

/// Delete the state file if present
pub fn remove_state(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    if fs.is_file(path) {
        fs.remove_file(path)?;
    }
    Ok(())
}

pub fn report_warnings(ctx: &Context, warnings: &[Diagnostic]) {
    for warning in warnings {
        ctx.output.warning(&warning.to_string());
    }
}

/// Print the identifying fields of a stored resource
pub fn print_state(ctx: &Context, state: &ResourceState) {
    ctx.output.key_value("Type", &state.resource_type);
    ctx.output.key_value("ID", &state.id);

    if let Some(name) = state.attributes.get("name").and_then(Value::as_str) {
        ctx.output.key_value("Name", name);
    }
}

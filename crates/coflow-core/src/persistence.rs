use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};

use crate::model::Flow;

/// Writes `bytes` to a temp file beside `path` and renames it into place, so
/// readers never observe a half-written document.
#[instrument(skip(bytes), fields(path = %path.display(), len = bytes.len()))]
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory: {}", parent.display()))?;

    let mut temp_file =
        tempfile::NamedTempFile::new_in(parent).context("failed to create temp file")?;
    temp_file
        .write_all(bytes)
        .context("failed to write temp file")?;
    temp_file
        .persist(path)
        .map_err(|error| anyhow::anyhow!(error.error))
        .with_context(|| format!("failed to persist file: {}", path.display()))?;

    debug!("atomic write complete");
    Ok(())
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("failed to serialize json")?;
    write_atomic(path, &json)
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("invalid json in {}", path.display()))
}

#[instrument(fields(path = %path.display()))]
pub fn load_flow(path: &Path) -> Result<Flow> {
    let flow: Flow = load_json(path)?;
    info!(flow_id = %flow.id, steps = flow.steps.len(), "flow loaded");
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_flow;

    #[test]
    fn flow_survives_save_and_load() {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join("nested/flow.json");
        save_json(&path, &test_flow()).expect("flow should save");

        let loaded = load_flow(&path).expect("flow should load");
        assert_eq!(loaded, test_flow());
    }

    #[test]
    fn atomic_write_replaces_existing_content() {
        let temp = tempfile::tempdir().expect("tempdir should be creatable");
        let path = temp.path().join("slot.json");
        write_atomic(&path, b"first").expect("first write should succeed");
        write_atomic(&path, b"second").expect("second write should succeed");

        assert_eq!(fs::read(&path).expect("file should exist"), b"second");
    }
}

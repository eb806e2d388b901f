//! Local state file
//!
//! Holds the last known state of one `nutanix_category_key` instance. Files
//! ending in `.msgpack` use the Terraform msgpack encoding, everything else
//! is JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use nutanix_provider::state::{decode_dynamic_value, encode_dynamic_value, DynamicValue};

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JsonStateFile {
    version: u32,
    resource_type: String,
    #[serde(default)]
    state: DynamicValue,
}

pub struct StateFile {
    path: PathBuf,
    resource_type: String,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>, resource_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resource_type: resource_type.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_msgpack(&self) -> bool {
        self.path.extension().is_some_and(|ext| ext == "msgpack")
    }

    /// Stored state, or null when the file does not exist yet
    pub fn load(&self) -> Result<DynamicValue> {
        if !self.path.exists() {
            debug!("No state file at {}", self.path.display());
            return Ok(DynamicValue::Null);
        }

        let data = fs::read(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;

        if self.is_msgpack() {
            return Ok(decode_dynamic_value(&data)?);
        }

        let file: JsonStateFile = serde_json::from_slice(&data)
            .with_context(|| format!("parsing state file {}", self.path.display()))?;

        if file.version != STATE_VERSION {
            anyhow::bail!(
                "state file {} has version {}, expected {}",
                self.path.display(),
                file.version,
                STATE_VERSION
            );
        }
        if file.resource_type != self.resource_type {
            anyhow::bail!(
                "state file {} tracks {}, not {}",
                self.path.display(),
                file.resource_type,
                self.resource_type
            );
        }

        Ok(file.state)
    }

    /// Write the state; a null state removes the file
    pub fn save(&self, state: &DynamicValue) -> Result<()> {
        if state.is_null() {
            if self.path.exists() {
                fs::remove_file(&self.path)
                    .with_context(|| format!("removing state file {}", self.path.display()))?;
            }
            return Ok(());
        }

        let data = if self.is_msgpack() {
            encode_dynamic_value(state)?
        } else {
            serde_json::to_vec_pretty(&JsonStateFile {
                version: STATE_VERSION,
                resource_type: self.resource_type.clone(),
                state: state.clone(),
            })?
        };

        fs::write(&self.path, data)
            .with_context(|| format!("writing state file {}", self.path.display()))?;
        debug!("Wrote state to {}", self.path.display());
        Ok(())
    }
}

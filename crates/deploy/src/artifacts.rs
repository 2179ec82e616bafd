//! Compiled contract artifacts.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A compiled contract artifact, as produced by the contract build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Name of the contract.
    pub contract_name: String,
    /// Contract ABI; opaque to the pipeline.
    #[serde(default)]
    pub abi: serde_json::Value,
    /// Hex-encoded creation bytecode.
    pub bytecode: String,
}

/// Resolves contract names to compiled artifacts on disk.
///
/// Artifacts live as `<dir>/<ContractName>.json`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the artifact for `contract`.
    pub fn load(&self, contract: &str) -> Result<Artifact> {
        let path = self.dir.join(format!("{contract}.json"));
        let content = fs::read_to_string(&path).context(format!(
            "Failed to read artifact from {}",
            path.display()
        ))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse artifact for `{contract}`"))
    }

    /// Creation bytecode for `contract`, decoded from its artifact.
    pub fn creation_code(&self, contract: &str) -> Result<Vec<u8>> {
        let artifact = self.load(contract)?;
        let code = hex::decode(artifact.bytecode.trim_start_matches("0x")).context(
            format!("Artifact for `{contract}` has invalid bytecode hex"),
        )?;
        if code.is_empty() {
            anyhow::bail!("Artifact for `{contract}` has no creation bytecode");
        }
        Ok(code)
    }
}

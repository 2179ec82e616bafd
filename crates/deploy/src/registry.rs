//! Deployment record persistence.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

/// File name of the per-network registry.
pub const REGISTRY_FILENAME: &str = "deployments.json";
/// Lock file guarding a registry directory against concurrent runs.
const LOCK_FILENAME: &str = ".evlr.lock";

/// Raised when a stage references a deployment record that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    /// Name of the contract whose record was looked up.
    pub contract: String,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no deployment record for `{}`; deploy it first",
            self.contract
        )
    }
}

impl std::error::Error for MissingDependency {}

/// Persisted output of a single contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Contract name the record is keyed by.
    pub contract: String,
    /// Deployed contract address.
    pub address: Address,
    /// Hash of the deployment transaction.
    pub transaction_hash: String,
    /// Block the deployment transaction was mined in.
    pub block_number: u64,
    /// Constructor arguments, in order, in display form.
    pub args: Vec<String>,
    /// When the record was created.
    pub deployed_at: DateTime<Utc>,
}

/// On-disk registry of deployment records for one network.
///
/// Stored as pretty JSON keyed by contract name. The registry directory is
/// held under an exclusive file lock for the lifetime of this handle, so two
/// runs cannot interleave writes.
pub struct DeploymentRegistry {
    path: PathBuf,
    records: BTreeMap<String, DeploymentRecord>,
    // Held until drop; dropping releases the directory for other runs.
    _lock: File,
}

impl DeploymentRegistry {
    /// Open the registry stored in `dir`, creating the directory and an
    /// empty registry if none exists yet.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context(format!(
            "Failed to create registry directory {}",
            dir.display()
        ))?;

        let lock = File::create(dir.join(LOCK_FILENAME)).context(format!(
            "Failed to create lock file in {}",
            dir.display()
        ))?;
        lock.try_lock_exclusive().context(format!(
            "Another deployment is already running against {}",
            dir.display()
        ))?;

        let path = dir.join(REGISTRY_FILENAME);
        let records = if path.exists() {
            let content = fs::read_to_string(&path).context(format!(
                "Failed to read deployment records from {}",
                path.display()
            ))?;
            serde_json::from_str(&content).context(format!(
                "Failed to parse deployment records from {}",
                path.display()
            ))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            records,
            _lock: lock,
        })
    }

    /// Look up a record, failing with [`MissingDependency`] if absent.
    pub fn get(&self, contract: &str) -> Result<&DeploymentRecord> {
        self.records.get(contract).ok_or_else(|| {
            anyhow::Error::new(MissingDependency {
                contract: contract.to_string(),
            })
        })
    }

    /// Look up a record without treating absence as an error.
    pub fn find(&self, contract: &str) -> Option<&DeploymentRecord> {
        self.records.get(contract)
    }

    /// Insert (or replace) a record and persist the registry.
    pub fn insert(&mut self, record: DeploymentRecord) -> Result<()> {
        self.records.insert(record.contract.clone(), record);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.records)
            .context("Failed to serialize deployment records")?;
        fs::write(&self.path, content).context(format!(
            "Failed to write deployment records to {}",
            self.path.display()
        ))
    }

    /// All records, ordered by contract name.
    pub fn records(&self) -> impl Iterator<Item = &DeploymentRecord> {
        self.records.values()
    }

    /// Path of the backing registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! Explicit context threaded through the deployment stages.

use anyhow::{Context as _, Result};
use chrono::Utc;

use crate::accounts::NamedAccounts;
use crate::engine::{DeployEngine, DeployOptions};
use crate::registry::{DeploymentRecord, DeploymentRegistry};

/// Everything a stage needs to run: resolved accounts, the record registry
/// and the deployment engine. Passed explicitly into each stage; there is no
/// process-wide state.
pub struct DeployContext<E> {
    /// Network name the run targets.
    pub network: String,
    /// Resolved named accounts.
    pub accounts: NamedAccounts,
    /// Record registry for this network.
    pub registry: DeploymentRegistry,
    /// Deployment execution backend.
    pub engine: E,
    /// Deploy again even where a record already exists.
    pub redeploy: bool,
}

impl<E: DeployEngine> DeployContext<E> {
    /// Deploy `contract` and persist the resulting record.
    ///
    /// If a record already exists for the name, it is returned untouched
    /// unless redeploy was requested, in which case the contract is deployed
    /// again and the record overwritten.
    pub async fn deploy(
        &mut self,
        contract: &str,
        options: DeployOptions,
    ) -> Result<DeploymentRecord> {
        if let Some(existing) = self.registry.find(contract) {
            if !self.redeploy {
                tracing::info!(
                    contract,
                    address = %existing.address,
                    network = %self.network,
                    "Reusing existing deployment record"
                );
                return Ok(existing.clone());
            }
            tracing::info!(contract, "Redeploying over existing record");
        }

        let deployed = self
            .engine
            .deploy(contract, &options)
            .await
            .with_context(|| format!("Failed to deploy `{contract}`"))?;

        let record = DeploymentRecord {
            contract: contract.to_string(),
            address: deployed.address,
            transaction_hash: deployed.transaction_hash,
            block_number: deployed.block_number,
            args: options.args.iter().map(ToString::to_string).collect(),
            deployed_at: Utc::now(),
        };
        self.registry.insert(record.clone())?;

        if options.log {
            tracing::info!(
                contract,
                address = %record.address,
                block_number = record.block_number,
                network = %self.network,
                "Contract deployed"
            );
        }

        Ok(record)
    }

    /// Look up a previously deployed contract's record.
    ///
    /// Fails with [`MissingDependency`](crate::MissingDependency) if the
    /// record does not exist.
    pub fn get_deployment(&self, contract: &str) -> Result<&DeploymentRecord> {
        self.registry.get(contract)
    }
}

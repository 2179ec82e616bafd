//! Pipeline orchestrator and its on-disk configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::accounts::AccountsConfig;
use crate::artifacts::ArtifactStore;
use crate::context::DeployContext;
use crate::engine::{DeployEngine, RpcEngine};
use crate::registry::DeploymentRegistry;
use crate::stages::{StageTag, StakerStage, TokenStage};

/// The default name for the pipeline configuration file.
pub const EVLRCONF_FILENAME: &str = "Evlr.toml";

/// Default network name.
pub const DEFAULT_NETWORK: &str = "localhost";
/// Default RPC endpoint (local dev node).
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";
/// Default root directory for per-network registries.
pub const DEFAULT_OUTDATA: &str = "deployments";
/// Default directory of compiled contract artifacts.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Pipeline configuration and orchestrator.
///
/// This struct contains everything one deployment run needs and can be
/// serialized to/from TOML format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployer {
    /// Network name; selects the registry directory under `outdata`.
    pub network: String,
    /// Ethereum JSON-RPC endpoint to deploy through.
    pub rpc_url: String,
    /// Root directory holding per-network registries.
    pub outdata: PathBuf,
    /// Directory of compiled contract artifacts.
    pub artifacts_dir: PathBuf,

    /// How the named accounts are resolved.
    pub accounts: AccountsConfig,
    /// Token stage configuration.
    pub token: TokenStage,
    /// Staker stage configuration.
    pub staker: StakerStage,
}

impl Default for Deployer {
    fn default() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            outdata: PathBuf::from(DEFAULT_OUTDATA),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            accounts: AccountsConfig::default(),
            token: TokenStage::default(),
            staker: StakerStage::default(),
        }
    }
}

impl Deployer {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize pipeline config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(EVLRCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Directory holding this network's deployment records.
    pub fn registry_dir(&self) -> PathBuf {
        self.outdata.join(&self.network)
    }

    /// Run the deployment pipeline.
    ///
    /// `tags` filters which stages run (empty selects every stage); stages
    /// always run in declared order. `redeploy` forces fresh deployments
    /// over existing records.
    pub async fn deploy(self, tags: &[StageTag], redeploy: bool) -> Result<()> {
        tracing::info!(
            network = %self.network,
            rpc_url = %self.rpc_url,
            "Starting deployment pipeline..."
        );

        let accounts = self
            .accounts
            .resolve()
            .context("Failed to resolve named accounts")?;

        tracing::info!(
            deployer = %accounts.deployer,
            token_owner = %accounts.token_owner,
            charity_bag = %accounts.charity_bag,
            "Named accounts resolved"
        );

        let registry = DeploymentRegistry::open(&self.registry_dir())?;
        let artifacts = ArtifactStore::new(self.artifacts_dir.clone());
        let engine = RpcEngine::new(&self.rpc_url, artifacts)?;

        let chain_id = engine
            .chain_id()
            .await
            .context("Failed to reach the RPC endpoint")?;
        tracing::info!(chain_id, "Connected to network");

        let mut ctx = DeployContext {
            network: self.network.clone(),
            accounts,
            registry,
            engine,
            redeploy,
        };

        self.run_stages(&mut ctx, tags).await
    }

    /// Run the stages in declared order, filtered by `tags`.
    pub async fn run_stages<E: DeployEngine>(
        &self,
        ctx: &mut DeployContext<E>,
        tags: &[StageTag],
    ) -> Result<()> {
        let selected = |tag: StageTag| tags.is_empty() || tags.contains(&tag);

        if selected(TokenStage::TAG) {
            self.token.deploy(ctx).await?;
        } else {
            tracing::debug!(tag = %TokenStage::TAG, "Stage not selected, skipping");
        }

        if selected(StakerStage::TAG) {
            self.staker.deploy(ctx).await?;
        } else {
            tracing::debug!(tag = %StakerStage::TAG, "Stage not selected, skipping");
        }

        tracing::info!("Deployment pipeline complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_default_config() {
        let deployer = Deployer::default();
        assert_eq!(deployer.network, "localhost");
        assert_eq!(deployer.rpc_url, "http://localhost:8545");
        assert_eq!(deployer.token.contract, "MockEVLR1");
        assert_eq!(deployer.token.initial_supply, 1_000_000_000);
        assert_eq!(deployer.staker.contract, "EvlrStaker");
        assert_eq!(deployer.staker.token_contract, "MockEVLR1");
        assert_eq!(deployer.staker.rewards.rate, 270);
        assert_eq!(deployer.staker.rewards.period, 21);
        assert_eq!(deployer.staker.rewards.fee, 9);
    }

    #[test]
    fn test_registry_dir_is_per_network() {
        let mut deployer = Deployer::default();
        deployer.network = "goerli".to_string();
        assert_eq!(deployer.registry_dir(), PathBuf::from("deployments/goerli"));
    }

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new("evlr-conf").unwrap();
        let path = dir.path().join(EVLRCONF_FILENAME);

        let deployer = Deployer::default();
        deployer.save_to_file(&path).unwrap();

        let loaded = Deployer::load_from_file(&path).unwrap();
        assert_eq!(loaded, deployer);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = TempDir::new("evlr-conf").unwrap();
        let path = dir.path().join(EVLRCONF_FILENAME);
        Deployer::default().save_to_file(&path).unwrap();

        let loaded = Deployer::load_from_file(&dir.path().to_path_buf()).unwrap();
        assert_eq!(loaded, Deployer::default());
    }

    #[test]
    fn test_missing_config_errors() {
        let missing = PathBuf::from("/nonexistent/Evlr.toml");
        assert!(Deployer::load_from_file(&missing).is_err());
    }
}

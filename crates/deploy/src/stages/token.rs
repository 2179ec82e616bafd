//! Token deployment stage.

use alloy_core::primitives::U256;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::abi::ConstructorArg;
use crate::context::DeployContext;
use crate::engine::{DeployEngine, DeployOptions};
use crate::registry::DeploymentRecord;

use super::StageTag;

/// Contract name the token is deployed and registered under.
pub const DEFAULT_TOKEN_CONTRACT: &str = "MockEVLR1";
/// Fixed initial token supply minted to the deployer.
pub const DEFAULT_INITIAL_SUPPLY: u64 = 1_000_000_000;

/// Configuration for the token deployment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStage {
    /// Contract name to deploy and register.
    pub contract: String,
    /// Initial supply passed to the token constructor.
    pub initial_supply: u64,
}

impl Default for TokenStage {
    fn default() -> Self {
        Self {
            contract: DEFAULT_TOKEN_CONTRACT.to_string(),
            initial_supply: DEFAULT_INITIAL_SUPPLY,
        }
    }
}

impl TokenStage {
    /// Tag under which this stage is selectable.
    pub const TAG: StageTag = StageTag::Evlr;

    /// Deploy the token from the deployer account.
    pub async fn deploy<E: DeployEngine>(
        &self,
        ctx: &mut DeployContext<E>,
    ) -> Result<DeploymentRecord> {
        let from = ctx.accounts.deployer;

        tracing::info!(
            contract = %self.contract,
            deployer = %from,
            initial_supply = self.initial_supply,
            "Deploying token"
        );

        ctx.deploy(
            &self.contract,
            DeployOptions {
                from,
                args: vec![ConstructorArg::Uint(U256::from(self.initial_supply))],
                log: true,
            },
        )
        .await
    }
}

//! Staker deployment stage.

use alloy_core::primitives::U256;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::abi::ConstructorArg;
use crate::context::DeployContext;
use crate::engine::{DeployEngine, DeployOptions};
use crate::registry::DeploymentRecord;

use super::StageTag;
use super::token::DEFAULT_TOKEN_CONTRACT;

/// Contract name the staker is deployed and registered under.
pub const DEFAULT_STAKER_CONTRACT: &str = "EvlrStaker";
/// Display name of the staked token position.
pub const DEFAULT_DISPLAY_NAME: &str = "Staked EVLR1 Token";
/// Symbol of the staked token position.
pub const DEFAULT_SYMBOL: &str = "SEVLR";
/// Default reward rate.
pub const DEFAULT_REWARD_RATE: u64 = 270;
/// Default reward period.
pub const DEFAULT_REWARD_PERIOD: u64 = 21;
/// Default charity fee.
pub const DEFAULT_CHARITY_FEE: u64 = 9;

/// Reward schedule constants, passed to the staker constructor in field
/// order after the fee recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Reward rate.
    pub rate: u64,
    /// Reward period.
    pub period: u64,
    /// Fee cut forwarded to the charity bag.
    pub fee: u64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            rate: DEFAULT_REWARD_RATE,
            period: DEFAULT_REWARD_PERIOD,
            fee: DEFAULT_CHARITY_FEE,
        }
    }
}

/// Configuration for the staker deployment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerStage {
    /// Contract name to deploy and register.
    pub contract: String,
    /// Registry name of the token contract this staker wraps.
    pub token_contract: String,
    /// Display name passed to the constructor.
    pub display_name: String,
    /// Symbol passed to the constructor.
    pub symbol: String,
    /// Reward schedule constants.
    pub rewards: RewardParams,
}

impl Default for StakerStage {
    fn default() -> Self {
        Self {
            contract: DEFAULT_STAKER_CONTRACT.to_string(),
            token_contract: DEFAULT_TOKEN_CONTRACT.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            rewards: RewardParams::default(),
        }
    }
}

impl StakerStage {
    /// Tag under which this stage is selectable.
    pub const TAG: StageTag = StageTag::Estaker;

    /// Deploy the staker, wiring in the token address and the fee recipient.
    ///
    /// The token record must already exist in the registry; its absence is
    /// the one failure mode owned by this stage.
    pub async fn deploy<E: DeployEngine>(
        &self,
        ctx: &mut DeployContext<E>,
    ) -> Result<DeploymentRecord> {
        let token_address = ctx.get_deployment(&self.token_contract)?.address;
        let from = ctx.accounts.deployer;
        let charity_bag = ctx.accounts.charity_bag;

        tracing::info!(
            contract = %self.contract,
            token = %token_address,
            charity_bag = %charity_bag,
            "Deploying staker"
        );

        let args = vec![
            ConstructorArg::String(self.display_name.clone()),
            ConstructorArg::String(self.symbol.clone()),
            ConstructorArg::Address(token_address),
            ConstructorArg::Address(charity_bag),
            ConstructorArg::Uint(U256::from(self.rewards.rate)),
            ConstructorArg::Uint(U256::from(self.rewards.period)),
            ConstructorArg::Uint(U256::from(self.rewards.fee)),
        ];

        ctx.deploy(&self.contract, DeployOptions { from, args, log: true })
            .await
    }
}

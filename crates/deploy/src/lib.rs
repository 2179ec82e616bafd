//! evlr-deploy - Ordered deployment pipeline for the EVLR contracts.
//!
//! This crate deploys the EVLR mock token and its staking contract against a
//! development network. The token stage publishes its deployed address
//! through a per-network record registry; the staker stage reads it back and
//! wires it into the staker constructor. Bytecode submission, receipt
//! waiting and address extraction live behind the [`DeployEngine`] trait.

mod abi;
mod accounts;
mod artifacts;
mod context;
mod deployer;
mod engine;
mod registry;
pub mod stages;

pub use abi::{ConstructorArg, encode_constructor_args};
pub use accounts::{AccountsConfig, DEFAULT_DEV_MNEMONIC, NamedAccounts};
pub use artifacts::{Artifact, ArtifactStore};
pub use context::DeployContext;
pub use deployer::{DEFAULT_NETWORK, DEFAULT_RPC_URL, Deployer, EVLRCONF_FILENAME};
pub use engine::{DeployEngine, DeployOptions, Deployed, RpcEngine};
pub use registry::{
    DeploymentRecord, DeploymentRegistry, MissingDependency, REGISTRY_FILENAME,
};
pub use stages::{RewardParams, StageTag, StakerStage, TokenStage};

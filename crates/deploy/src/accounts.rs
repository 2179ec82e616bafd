//! Named deployment accounts and their resolution.

use alloy_core::primitives::Address;
use alloy_signer_local::{MnemonicBuilder, coins_bip39::English};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default development mnemonic, matching what local dev nodes are seeded
/// with out of the box.
pub const DEFAULT_DEV_MNEMONIC: &str =
    "test test test test test test test test test test test junk";

/// Derivation index of the deployer role.
const DEPLOYER_INDEX: u32 = 0;
/// Derivation index of the token owner role.
const TOKEN_OWNER_INDEX: u32 = 1;
/// Derivation index of the charity bag role.
const CHARITY_BAG_INDEX: u32 = 2;

/// Resolved named accounts for a deployment run.
///
/// The roles map to fixed derivation indices when resolved from a mnemonic:
/// - Index 0: deployer (funds and sends the deployment transactions)
/// - Index 1: token_owner
/// - Index 2: charity_bag (staking fee recipient)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedAccounts {
    /// The account the deployment transactions are sent from (index 0).
    pub deployer: Address,
    /// The designated owner of the token contract (index 1).
    pub token_owner: Address,
    /// The staking fee recipient (index 2).
    pub charity_bag: Address,
}

/// Where the named accounts come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AccountsConfig {
    /// Derive the role addresses from a BIP-39 phrase at the fixed indices.
    Mnemonic {
        /// The BIP-39 phrase to derive from.
        phrase: String,
    },
    /// Use explicitly configured addresses.
    Explicit {
        deployer: Address,
        token_owner: Address,
        charity_bag: Address,
    },
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self::Mnemonic {
            phrase: DEFAULT_DEV_MNEMONIC.to_string(),
        }
    }
}

impl AccountsConfig {
    /// Resolve the configuration into concrete role addresses.
    pub fn resolve(&self) -> Result<NamedAccounts> {
        match self {
            Self::Mnemonic { phrase } => Ok(NamedAccounts {
                deployer: derive_address(phrase, DEPLOYER_INDEX)?,
                token_owner: derive_address(phrase, TOKEN_OWNER_INDEX)?,
                charity_bag: derive_address(phrase, CHARITY_BAG_INDEX)?,
            }),
            Self::Explicit {
                deployer,
                token_owner,
                charity_bag,
            } => Ok(NamedAccounts {
                deployer: *deployer,
                token_owner: *token_owner,
                charity_bag: *charity_bag,
            }),
        }
    }
}

/// Derive the address at `index` from a BIP-39 phrase.
fn derive_address(phrase: &str, index: u32) -> Result<Address> {
    let signer = MnemonicBuilder::<English>::default()
        .phrase(phrase)
        .index(index)
        .context("Invalid account derivation index")?
        .build()
        .context("Failed to derive account from mnemonic")?;

    // alloy-signer-local pins its own alloy-primitives; convert through the
    // raw address bytes.
    Ok(Address::from_slice(signer.address().as_slice()))
}

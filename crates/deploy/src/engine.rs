//! Deployment engine: contract creation over Ethereum JSON-RPC.

use std::time::Duration;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use backon::{ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use url::Url;

use crate::abi::{ConstructorArg, encode_constructor_args};
use crate::artifacts::ArtifactStore;

/// Timeout applied to individual RPC requests.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);
/// Base delay between receipt polling attempts.
const RECEIPT_POLL_DELAY: Duration = Duration::from_millis(500);
/// Cap on receipt polling attempts.
const RECEIPT_MAX_ATTEMPTS: usize = 30;

/// Options for a single contract deployment, as passed by a stage.
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Account the deployment transaction is sent from.
    pub from: Address,
    /// Constructor arguments, in order.
    pub args: Vec<ConstructorArg>,
    /// Whether to log the deployment result at info level.
    pub log: bool,
}

/// Outcome of a contract deployment, as reported by the engine.
#[derive(Debug, Clone)]
pub struct Deployed {
    /// Address of the deployed contract.
    pub address: Address,
    /// Hash of the deployment transaction.
    pub transaction_hash: String,
    /// Block the deployment transaction was mined in.
    pub block_number: u64,
}

/// A deployment execution backend.
///
/// Stages only describe what to deploy; the engine owns bytecode submission,
/// receipt waiting and address extraction.
#[allow(async_fn_in_trait)]
pub trait DeployEngine {
    /// Deploy `contract` with the given options and wait until it is mined.
    async fn deploy(&self, contract: &str, options: &DeployOptions) -> Result<Deployed>;
}

/// Transaction receipt fields the engine cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    #[serde(deserialize_with = "deserialize_u64_from_hex")]
    block_number: u64,
    contract_address: Option<Address>,
    status: Option<String>,
}

/// Deserialize a u64 from a hex string (with 0x prefix).
fn deserialize_u64_from_hex<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16).map_err(serde::de::Error::custom)
}

/// Engine backed by an Ethereum JSON-RPC endpoint.
///
/// Transactions are signed by the node (`eth_sendTransaction`), so the named
/// accounts must be unlocked there. That is the contract the pipeline has
/// with development networks.
pub struct RpcEngine {
    client: reqwest::Client,
    url: Url,
    artifacts: ArtifactStore,
}

impl RpcEngine {
    /// Create an engine for the given RPC endpoint.
    pub fn new(rpc_url: &str, artifacts: ArtifactStore) -> Result<Self> {
        let url = Url::parse(rpc_url).context(format!("Invalid RPC URL: {rpc_url}"))?;
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url,
            artifacts,
        })
    }

    /// Chain ID reported by the endpoint.
    pub async fn chain_id(&self) -> Result<u64> {
        let id: String = self.call("eth_chainId", vec![]).await?;
        u64::from_str_radix(id.trim_start_matches("0x"), 16).context("Failed to parse chain ID")
    }

    /// Make a JSON-RPC call and deserialize the result.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send {method} request"))?;

        let result: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {method} response"))?;

        if let Some(error) = result.get("error") {
            anyhow::bail!(
                "RPC error from {}: {}",
                method,
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
            );
        }

        let result_value = result.get("result").cloned().unwrap_or(Value::Null);
        serde_json::from_value(result_value)
            .with_context(|| format!("Failed to deserialize {method} result"))
    }

    /// Poll for the receipt of `tx_hash` until the transaction is mined.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt> {
        let fetch = || async {
            let receipt: Option<TransactionReceipt> = self
                .call("eth_getTransactionReceipt", vec![json!(tx_hash)])
                .await?;
            receipt.ok_or_else(|| anyhow::anyhow!("transaction {tx_hash} not mined yet"))
        };

        fetch
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(RECEIPT_POLL_DELAY)
                    .with_max_times(RECEIPT_MAX_ATTEMPTS),
            )
            .await
            .with_context(|| format!("Timed out waiting for receipt of {tx_hash}"))
    }
}

impl DeployEngine for RpcEngine {
    async fn deploy(&self, contract: &str, options: &DeployOptions) -> Result<Deployed> {
        let mut data = self.artifacts.creation_code(contract)?;
        data.extend(encode_constructor_args(&options.args));
        let data_hex = format!("0x{}", hex::encode(&data));

        let tx_hash: String = self
            .call(
                "eth_sendTransaction",
                vec![json!({ "from": options.from, "data": data_hex })],
            )
            .await
            .with_context(|| format!("Failed to submit deployment transaction for `{contract}`"))?;

        tracing::debug!(contract, tx_hash = %tx_hash, "Deployment transaction submitted");

        let receipt = self.wait_for_receipt(&tx_hash).await?;

        if receipt.status.as_deref() == Some("0x0") {
            anyhow::bail!("Deployment transaction for `{contract}` reverted: {tx_hash}");
        }

        let address = receipt.contract_address.with_context(|| {
            format!("Receipt for `{contract}` carries no contract address")
        })?;

        Ok(Deployed {
            address,
            transaction_hash: tx_hash,
            block_number: receipt.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::address;

    #[test]
    fn test_parse_receipt() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xdeadbeef",
            "blockNumber": "0x10",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "status": "0x1",
            "cumulativeGasUsed": "0x5208"
        }))
        .unwrap();

        assert_eq!(receipt.block_number, 16);
        assert_eq!(
            receipt.contract_address,
            Some(address!("5fbdb2315678afecb367f032d93f642f64180aa3"))
        );
        assert_eq!(receipt.status.as_deref(), Some("0x1"));
    }

    #[test]
    fn test_pending_receipt_is_none() {
        let receipt: Option<TransactionReceipt> = serde_json::from_value(Value::Null).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_invalid_rpc_url_is_rejected() {
        let artifacts = ArtifactStore::new("artifacts");
        assert!(RpcEngine::new("not a url", artifacts).is_err());
    }
}

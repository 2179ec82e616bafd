//! Pipeline tests against an in-process mock engine.
//!
//! These cover the ordering contract between the stages: the token stage
//! publishes a record, the staker stage consumes it, and a missing token
//! record aborts the staker stage without writing anything.

use std::sync::Mutex;

use alloy_core::primitives::{Address, keccak256};
use anyhow::Result;
use evlr_deploy::{
    DeployContext, DeployEngine, DeployOptions, Deployed, Deployer, DeploymentRegistry,
    MissingDependency, StageTag,
};
use tempdir::TempDir;

/// Engine double that records every call and fabricates deterministic
/// deployment results from the contract name.
#[derive(Default)]
struct MockEngine {
    calls: Mutex<Vec<String>>,
}

impl MockEngine {
    fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn mock_address(contract: &str) -> Address {
        Address::from_slice(&keccak256(contract.as_bytes())[12..])
    }
}

impl DeployEngine for MockEngine {
    async fn deploy(&self, contract: &str, _options: &DeployOptions) -> Result<Deployed> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(contract.to_string());

        Ok(Deployed {
            address: Self::mock_address(contract),
            transaction_hash: format!("0x{}", hex::encode(keccak256(contract.as_bytes()))),
            block_number: calls.len() as u64,
        })
    }
}

/// Test harness: a temp registry plus a context wired to the mock engine.
struct TestContext {
    _dir: TempDir,
    deployer: Deployer,
    ctx: DeployContext<MockEngine>,
}

impl TestContext {
    fn new() -> Result<Self> {
        let dir = TempDir::new("evlr-pipeline")?;
        let deployer = Deployer::default();
        let accounts = deployer.accounts.resolve()?;
        let registry = DeploymentRegistry::open(&dir.path().join(&deployer.network))?;

        let ctx = DeployContext {
            network: deployer.network.clone(),
            accounts,
            registry,
            engine: MockEngine::default(),
            redeploy: false,
        };

        Ok(Self {
            _dir: dir,
            deployer,
            ctx,
        })
    }
}

#[tokio::test]
async fn test_token_stage_creates_single_record() -> Result<()> {
    let mut t = TestContext::new()?;

    let record = t.deployer.token.deploy(&mut t.ctx).await?;

    assert_eq!(record.contract, "MockEVLR1");
    assert_eq!(record.args, vec!["1000000000"]);
    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1"]);
    assert_eq!(t.ctx.registry.records().count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_staker_stage_wires_token_address() -> Result<()> {
    let mut t = TestContext::new()?;

    let token = t.deployer.token.deploy(&mut t.ctx).await?;
    let staker = t.deployer.staker.deploy(&mut t.ctx).await?;

    assert_eq!(staker.contract, "EvlrStaker");
    assert_eq!(
        staker.args,
        vec![
            "Staked EVLR1 Token".to_string(),
            "SEVLR".to_string(),
            token.address.to_string(),
            t.ctx.accounts.charity_bag.to_string(),
            "270".to_string(),
            "21".to_string(),
            "9".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_staker_stage_without_token_fails() -> Result<()> {
    let mut t = TestContext::new()?;

    let err = t.deployer.staker.deploy(&mut t.ctx).await.unwrap_err();

    let missing = err
        .downcast_ref::<MissingDependency>()
        .expect("expected a MissingDependency error");
    assert_eq!(missing.contract, "MockEVLR1");

    // Nothing was deployed and nothing was recorded.
    assert!(t.ctx.engine.call_log().is_empty());
    assert_eq!(t.ctx.registry.records().count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_rerun_reuses_existing_record() -> Result<()> {
    let mut t = TestContext::new()?;

    let first = t.deployer.token.deploy(&mut t.ctx).await?;
    let second = t.deployer.token.deploy(&mut t.ctx).await?;

    assert_eq!(first, second);
    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1"]);
    Ok(())
}

#[tokio::test]
async fn test_redeploy_overwrites_record() -> Result<()> {
    let mut t = TestContext::new()?;

    t.deployer.token.deploy(&mut t.ctx).await?;
    t.ctx.redeploy = true;
    t.deployer.token.deploy(&mut t.ctx).await?;

    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1", "MockEVLR1"]);
    assert_eq!(t.ctx.registry.records().count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_run_stages_in_declared_order() -> Result<()> {
    let mut t = TestContext::new()?;

    t.deployer.run_stages(&mut t.ctx, &[]).await?;

    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1", "EvlrStaker"]);
    assert_eq!(t.ctx.registry.records().count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_tag_filter_selects_single_stage() -> Result<()> {
    let mut t = TestContext::new()?;

    t.deployer
        .run_stages(&mut t.ctx, &[StageTag::Evlr])
        .await?;

    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1"]);

    // A later staker-only run picks the token address up from the registry.
    t.deployer
        .run_stages(&mut t.ctx, &[StageTag::Estaker])
        .await?;

    assert_eq!(t.ctx.engine.call_log(), vec!["MockEVLR1", "EvlrStaker"]);
    Ok(())
}

#[tokio::test]
async fn test_staker_only_run_without_token_fails() -> Result<()> {
    let mut t = TestContext::new()?;

    let err = t
        .deployer
        .run_stages(&mut t.ctx, &[StageTag::Estaker])
        .await
        .unwrap_err();

    assert!(err.downcast_ref::<MissingDependency>().is_some());
    assert!(t.ctx.engine.call_log().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_records_survive_reopen() -> Result<()> {
    let dir = TempDir::new("evlr-pipeline")?;
    let deployer = Deployer::default();
    let accounts = deployer.accounts.resolve()?;
    let registry_dir = dir.path().join(&deployer.network);

    {
        let mut ctx = DeployContext {
            network: deployer.network.clone(),
            accounts,
            registry: DeploymentRegistry::open(&registry_dir)?,
            engine: MockEngine::default(),
            redeploy: false,
        };
        deployer.token.deploy(&mut ctx).await?;
    }

    // A fresh run against the same registry sees the earlier record.
    let mut ctx = DeployContext {
        network: deployer.network.clone(),
        accounts,
        registry: DeploymentRegistry::open(&registry_dir)?,
        engine: MockEngine::default(),
        redeploy: false,
    };
    let staker = deployer.staker.deploy(&mut ctx).await?;

    assert_eq!(
        staker.args[2],
        MockEngine::mock_address("MockEVLR1").to_string()
    );
    Ok(())
}

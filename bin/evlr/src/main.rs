//! evlr is a CLI tool that deploys the EVLR token and staking contracts as
//! an ordered pipeline against a development network.

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;
use evlr_deploy::{Deployer, DeploymentRegistry, EVLRCONF_FILENAME};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use cli::{Cli, Command, ConfigArgs, DeployArgs, InitArgs, ListArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    match cli.command {
        Command::Deploy(args) => deploy(args).await,
        Command::List(args) => list(args),
        Command::Init(args) => init(args),
    }
}

/// Layer the pipeline configuration: built-in defaults, then the TOML file,
/// then EVLR_* environment variables, then explicit CLI flags.
fn load_deployer(args: &ConfigArgs) -> Result<Deployer> {
    let path = args
        .config
        .as_deref()
        .unwrap_or(Path::new(EVLRCONF_FILENAME));

    // An explicitly named config file must exist; the default path is
    // optional and simply layers nothing when absent.
    if args.config.is_some() && !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    let mut deployer: Deployer = Figment::from(Serialized::defaults(Deployer::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EVLR_").split("__"))
        .extract()
        .context("Failed to load pipeline configuration")?;

    if let Some(network) = &args.network {
        deployer.network = network.clone();
    }
    if let Some(rpc_url) = &args.rpc_url {
        deployer.rpc_url = rpc_url.clone();
    }
    if let Some(outdata) = &args.outdata {
        deployer.outdata = outdata.clone();
    }

    Ok(deployer)
}

async fn deploy(args: DeployArgs) -> Result<()> {
    let deployer = load_deployer(&args.config)?;

    tracing::info!(
        network = %deployer.network,
        tags = ?args.tags,
        redeploy = args.redeploy,
        "Loaded pipeline configuration"
    );

    deployer.deploy(&args.tags, args.redeploy).await
}

fn list(args: ListArgs) -> Result<()> {
    let deployer = load_deployer(&args.config)?;
    let registry = DeploymentRegistry::open(&deployer.registry_dir())?;

    if registry.records().next().is_none() {
        println!("No deployments recorded for network `{}`.", deployer.network);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(["Contract", "Address", "Transaction", "Block", "Deployed at"]);
    for record in registry.records() {
        table.add_row([
            record.contract.clone(),
            record.address.to_string(),
            record.transaction_hash.clone(),
            record.block_number.to_string(),
            record.deployed_at.to_rfc3339(),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn init(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            args.path.display()
        );
    }

    Deployer::default().save_to_file(&args.path)?;
    println!("Wrote default configuration to {}", args.path.display());

    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use evlr_deploy::{EVLRCONF_FILENAME, StageTag};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "evlr")]
#[command(
    author,
    version,
    about = "Deploy the EVLR token and staking contracts as an ordered pipeline"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "EVLR_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the deployment pipeline.
    Deploy(DeployArgs),
    /// List the deployment records of a network.
    List(ListArgs),
    /// Write a default configuration file.
    Init(InitArgs),
}

/// Options shared by the commands that read the pipeline configuration.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to an Evlr.toml configuration file.
    ///
    /// Defaults to Evlr.toml in the working directory; a missing default
    /// file falls back to the built-in configuration.
    #[arg(long, alias = "conf", env = "EVLR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Network name; selects the registry directory under outdata.
    #[arg(short, long, env = "EVLR_NETWORK")]
    pub network: Option<String>,

    /// The URL of the RPC endpoint to deploy through.
    #[arg(long, alias = "rpc", env = "EVLR_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Root directory holding per-network deployment records.
    #[arg(long, alias = "outdata", env = "EVLR_OUTDATA")]
    pub outdata: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeployArgs {
    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Stage tags to run (comma separated). Runs every stage if omitted.
    #[arg(short, long, env = "EVLR_TAGS", value_delimiter = ',')]
    pub tags: Vec<StageTag>,

    /// Deploy again even where a deployment record already exists.
    #[arg(long, env = "EVLR_REDEPLOY", default_value_t = false)]
    pub redeploy: bool,
}

#[derive(Args)]
pub struct ListArgs {
    #[clap(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the configuration file.
    #[arg(long, default_value = EVLRCONF_FILENAME)]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

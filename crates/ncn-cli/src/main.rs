//! Command-line interface for NCN
//!
//! Reward tree construction, offline proof checks and in-process
//! simulations of ballot rounds and claims. Reports go to stdout as JSON,
//! logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ncn_cli::commands::{simulate, tree, verify};
use ncn_cli::scenario::{RewardsFile, Scenario};
use ncn_core::{BeneficiaryId, Hash32, NcnConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ncn")]
#[command(about = "NCN - stake-weighted root consensus and cumulative reward claims", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Deployment config (TOML) used when a scenario has none inline
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a reward tree and print its root and every leaf's proof
    Tree {
        /// Rewards file listing `[[leaves]]`
        rewards: PathBuf,
    },

    /// Check one claim proof against a root
    Verify {
        #[arg(long)]
        root: Hash32,

        #[arg(long)]
        beneficiary: BeneficiaryId,

        /// Cumulative amount committed in the leaf
        #[arg(long)]
        amount: u64,

        /// Leaf index in the tree
        #[arg(long)]
        index: u32,

        /// Sibling hashes from leaf to root, comma separated
        #[arg(long, value_delimiter = ',')]
        proof: Vec<Hash32>,
    },

    /// Run a scenario of rounds and claims in-process
    Simulate {
        /// Scenario file
        scenario: PathBuf,
    },
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Tree { rewards } => {
            let tree = RewardsFile::load(&rewards)?.tree()?;
            print_json(&tree::run(&tree)?)?;
        }

        Commands::Verify {
            root,
            beneficiary,
            amount,
            index,
            proof,
        } => {
            let report = verify::run(&root, &beneficiary, amount, index, &proof);
            print_json(&report)?;
            if !report.valid {
                bail!("proof does not verify against root {root}");
            }
        }

        Commands::Simulate { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let fallback = cli
                .config
                .as_deref()
                .map(NcnConfig::load_from_file)
                .transpose()?;
            let config = scenario.resolve_config(fallback)?;
            print_json(&simulate::run(&scenario, config).await?)?;
        }
    }

    Ok(())
}

//! drop-cli: command-line tools for preparing and checking a merkle drop.
//!
//! Computes the root of an airdrop file, prints proofs and entitlements for
//! single addresses, and verifies proofs against a published root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use drop_core::merkle::validate_proof;
use drop_core::types::{Address, Hash256, Item, parse_value};
use drop_decay::{DecaySchedule, unix_now};
use drop_service::airdrop::sum_of_values;
use drop_service::{AirdropSnapshot, load_airdrop_file};
use tracing::debug;

/// Merkle drop command-line interface.
#[derive(Parser)]
#[command(name = "drop-cli")]
#[command(version, about = "Build and check merkle drop commitments.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the Merkle root of an airdrop file.
    Root(FileArgs),
    /// Print the total of all entitlements in an airdrop file.
    Sum(FileArgs),
    /// Print the proof for one address.
    Proof(ProofArgs),
    /// Verify a proof against a root.
    Verify(VerifyArgs),
    /// Show original and decayed entitlement with proof for one address.
    Entitlement(EntitlementArgs),
}

#[derive(Args)]
struct FileArgs {
    /// CSV (`address,value` per line) or JSON (`{address: value}`) airdrop file.
    airdrop_file: PathBuf,
}

#[derive(Args)]
struct ProofArgs {
    /// Airdrop file the root was computed from.
    airdrop_file: PathBuf,

    /// Address to prove.
    address: String,
}

#[derive(Args)]
struct VerifyArgs {
    /// Claimant address.
    address: String,

    /// Undecayed entitlement, in decimal.
    value: String,

    /// Published Merkle root (0x-prefixed hex).
    root: String,

    /// Sibling hashes, leaf to root.
    proof: Vec<String>,
}

#[derive(Args)]
struct EntitlementArgs {
    /// Airdrop file the root was computed from.
    airdrop_file: PathBuf,

    /// Address to look up.
    address: String,

    /// Unix time at which decay begins.
    #[arg(long)]
    decay_start: u64,

    /// Seconds over which entitlements decay to zero.
    #[arg(long)]
    decay_duration: u64,

    /// Evaluate at this unix time instead of now.
    #[arg(long)]
    now: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Root(args) => root(args),
        Commands::Sum(args) => sum(args),
        Commands::Proof(args) => proof(args),
        Commands::Verify(args) => verify(args),
        Commands::Entitlement(args) => entitlement(args),
    }
}

fn load_snapshot(path: &Path, schedule: DecaySchedule) -> Result<AirdropSnapshot> {
    let data = load_airdrop_file(path)
        .with_context(|| format!("Failed to load airdrop file {}", path.display()))?;
    AirdropSnapshot::build(data, schedule).context("Failed to build merkle tree")
}

fn root(args: FileArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.airdrop_file, DecaySchedule::default())?;
    println!("The merkle root is: {}", snapshot.root());
    Ok(())
}

fn sum(args: FileArgs) -> Result<()> {
    let data = load_airdrop_file(&args.airdrop_file)
        .with_context(|| format!("Failed to load airdrop file {}", args.airdrop_file.display()))?;
    let total = sum_of_values(&data).context("Sum of entitlements overflows 256 bits")?;
    println!("{total}");
    Ok(())
}

fn proof(args: ProofArgs) -> Result<()> {
    let address: Address = args.address.parse().context("Invalid address")?;
    let snapshot = load_snapshot(&args.airdrop_file, DecaySchedule::default())?;
    let Some(proof) = snapshot.proof_for(&address)? else {
        bail!("{address} is not eligible for this airdrop");
    };
    for hash in proof {
        println!("{hash}");
    }
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<()> {
    let address: Address = args.address.parse().context("Invalid address")?;
    let value = parse_value(&args.value).context("Invalid value")?;
    let root: Hash256 = args.root.parse().map_err(anyhow::Error::msg)?;
    let proof = args
        .proof
        .iter()
        .map(|h| h.parse::<Hash256>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;

    let item = Item::new(address, value);
    debug!(%item, %root, steps = proof.len(), "Verifying proof");
    if validate_proof(&item, &proof, &root) {
        println!("valid");
        Ok(())
    } else {
        bail!("proof does not match root {root}")
    }
}

fn entitlement(args: EntitlementArgs) -> Result<()> {
    let address: Address = args.address.parse().context("Invalid address")?;
    let schedule = DecaySchedule::new(args.decay_start, args.decay_duration);
    let snapshot = load_snapshot(&args.airdrop_file, schedule)?;
    let now = args.now.unwrap_or_else(unix_now);

    match snapshot.entitlement(&address, now)? {
        Some(entitlement) => {
            println!("address:  {}", entitlement.address);
            println!("original: {}", entitlement.original_entitlement);
            println!("current:  {}", entitlement.current_entitlement);
            for hash in &entitlement.proof {
                println!("proof:    {hash}");
            }
            Ok(())
        }
        None => bail!("{address} is not eligible for this airdrop"),
    }
}

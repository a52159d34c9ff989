//! Tokenomics Command Line Interface
//!
//! Offline operator tool: validates genesis documents and reports the mint
//! provision and claims decay they imply.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use config::{Config, File as ConfigFile};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokenomics::{
    allocate_inflation, init_genesis, truncate_amount, Amount, DecayPhase, GenesisState,
    InflationAllocation, MemoryStore, ModuleAccounts, Period,
};
use tracing::{debug, info, Subscriber};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Parser)]
#[command(name = "tokenomics-cli")]
#[command(about = "Tokenomics genesis validation and inspection", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level filter (overrides configuration; RUST_LOG wins over both)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a genesis document
    Validate(GenesisArgs),
    /// Print the epoch mint provision for a genesis document
    Provision {
        #[command(flatten)]
        genesis: GenesisArgs,
        /// Evaluate at this period instead of the genesis period
        #[arg(long)]
        period: Option<Period>,
    },
    /// Print the claims decay phase and factor at a block time
    Decay {
        #[command(flatten)]
        genesis: GenesisArgs,
        /// Block time (RFC 3339)
        #[arg(long)]
        at: DateTime<Utc>,
        /// Initial allotment to evaluate, in atomic units
        #[arg(long)]
        amount: Option<Amount>,
    },
}

#[derive(Args)]
struct GenesisArgs {
    /// Genesis JSON file (falls back to `genesis_path` from configuration)
    genesis: Option<PathBuf>,
}

/// Layered settings: defaults, then config file, then `TOKENOMICS_*` env.
#[derive(Debug, Clone, Deserialize)]
struct Settings {
    log_level: String,
    log_format: String,
    genesis_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct ProvisionReport {
    period: Period,
    epoch_identifier: String,
    epochs_per_period: i64,
    bonded_ratio: Decimal,
    skipped_epochs: u64,
    mint_denom: String,
    epoch_mint_provision: Decimal,
    allocation: InflationAllocation,
}

#[derive(Serialize)]
struct DecayReport {
    at: DateTime<Utc>,
    claims_active: bool,
    phase: DecayPhase,
    decay_factor: Decimal,
    decay_start_time: DateTime<Utc>,
    airdrop_end_time: DateTime<Utc>,
    claims_denom: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    claimable: Option<Amount>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(level) = cli.log_level.clone() {
        settings.log_level = level;
    }
    init_logging(&settings)?;
    debug!(?settings, "loaded settings");

    match cli.command {
        Commands::Validate(args) => {
            let path = resolve_genesis_path(&args, &settings)?;
            let state = load_genesis(&path)?;
            state
                .validate()
                .with_context(|| format!("genesis {} is invalid", path.display()))?;
            info!(path = %path.display(), "genesis is valid");
            println!("genesis OK: {}", path.display());
        }
        Commands::Provision { genesis, period } => {
            let path = resolve_genesis_path(&genesis, &settings)?;
            let mut state = load_genesis(&path)?;
            if let Some(period) = period {
                state.period = period;
            }
            let report = provision_report(&state)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Decay {
            genesis,
            at,
            amount,
        } => {
            let path = resolve_genesis_path(&genesis, &settings)?;
            let state = load_genesis(&path)?;
            let report = decay_report(&state, at, amount)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder()
        .set_default("log_level", "info")?
        .set_default("log_format", "pretty")?;

    if let Some(path) = path {
        if !path.exists() {
            bail!(
                "Configuration file {} not found (specified via --config)",
                path.display()
            );
        }
        builder = builder.add_source(ConfigFile::from(path));
    }

    builder = builder.add_source(config::Environment::with_prefix("TOKENOMICS"));

    builder
        .build()?
        .try_deserialize()
        .context("invalid configuration")
}

fn init_logging(settings: &Settings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(&settings.log_format, std::io::stderr))
        .try_init()?;

    Ok(())
}

/// One JSON object per event for `"json"`, human-readable otherwise.
fn fmt_layer<S, W>(format: &str, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    if format == "json" {
        layer.json().boxed()
    } else {
        layer.pretty().boxed()
    }
}

fn resolve_genesis_path(args: &GenesisArgs, settings: &Settings) -> Result<PathBuf> {
    args.genesis
        .clone()
        .or_else(|| settings.genesis_path.clone())
        .context("no genesis file given (pass a path or set genesis_path)")
}

fn load_genesis(path: &Path) -> Result<GenesisState> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read genesis file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse genesis file {}", path.display()))
}

/// Run the genesis through `init_genesis` against a scratch store so the
/// report reflects exactly what a node would load.
fn provision_report(state: &GenesisState) -> Result<ProvisionReport> {
    let mut store = MemoryStore::new();
    let provision = init_genesis(&mut store, &ModuleAccounts::with_inflation(), state)
        .context("genesis rejected")?;

    let minted = truncate_amount(provision, "epoch mint")?;
    let allocation = allocate_inflation(minted, &state.params.inflation_distribution)?;

    Ok(ProvisionReport {
        period: state.period,
        epoch_identifier: state.epoch_identifier.clone(),
        epochs_per_period: state.epochs_per_period,
        bonded_ratio: state.bonded_ratio,
        skipped_epochs: state.skipped_epochs,
        mint_denom: state.params.mint_denom.clone(),
        epoch_mint_provision: provision,
        allocation,
    })
}

fn decay_report(
    state: &GenesisState,
    at: DateTime<Utc>,
    amount: Option<Amount>,
) -> Result<DecayReport> {
    state.claims.validate().context("claims parameters rejected")?;
    let schedule = state.claims.decay_schedule();

    let claimable = match amount {
        Some(initial) => Some(schedule.claimable_amount(initial, at)?),
        None => None,
    };

    Ok(DecayReport {
        at,
        claims_active: state.claims.is_claims_active(at),
        phase: schedule.phase(at),
        decay_factor: schedule.decay_factor(at)?,
        decay_start_time: schedule.decay_start_time(),
        airdrop_end_time: schedule.airdrop_end_time(),
        claims_denom: state.claims.claims_denom.clone(),
        claimable,
    })
}

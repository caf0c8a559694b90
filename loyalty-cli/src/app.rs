use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use loyalty_config::LoyaltyConfig;
use loyalty_ledger::TransactionKind;

use crate::batch::{parse_operations, run_batch};
use crate::dispatch::{Operation, OperationOutput};
use crate::services::Services;
use crate::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "loyalty", version, about = "Loyalty point wallet ledger")]
pub struct Cli {
    /// Configuration file (defaults to config/default.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a wallet
    Create {
        name: String,
        credential: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        balance: i64,
    },
    /// Record a reward and add points to a wallet
    Award(MovementArgs),
    /// Record a redemption and remove points from a wallet
    Redeem(MovementArgs),
    /// Show a wallet
    Wallet { name: String },
    /// Show a recorded transaction
    Transaction {
        name: String,
        entity: String,
        transaction_id: String,
    },
    /// Invoke an operation by name with positional arguments
    Invoke {
        operation: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Act on behalf of a partner entity
    Partner {
        entity: String,
        #[command(subcommand)]
        action: PartnerAction,
    },
    /// Replay a JSON-lines file of operations
    Batch { file: PathBuf },
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(Args, Debug)]
pub struct MovementArgs {
    pub name: String,
    pub entity: String,
    pub transaction_id: String,
    pub points: u64,
    /// Transaction type recorded on the audit record
    #[arg(long)]
    pub kind: Option<TransactionKind>,
}

#[derive(Subcommand, Debug)]
pub enum PartnerAction {
    Award {
        wallet: String,
        transaction_id: String,
        points: u64,
    },
    Redeem {
        wallet: String,
        transaction_id: String,
        points: u64,
    },
    Transaction {
        wallet: String,
        transaction_id: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = LoyaltyConfig::load(cli.config.as_deref())?;
    let _guard = init_tracing(&config.telemetry)?;
    debug!(command = ?cli.command, "dispatching command");
    execute(cli.command, &config).await
}

async fn execute(command: Command, config: &LoyaltyConfig) -> Result<()> {
    let open = || -> Result<Arc<Services>> { Services::from_config(config).map(Arc::new) };
    match command {
        Command::Create {
            name,
            credential,
            balance,
        } => dispatch(
            &*open()?,
            Operation::CreateWallet {
                name,
                credential,
                initial_balance: balance,
            },
        ),
        Command::Award(args) => {
            let kind = args.kind.unwrap_or(TransactionKind::Reward);
            dispatch(
                &*open()?,
                Operation::Award {
                    name: args.name,
                    entity: args.entity,
                    transaction_id: args.transaction_id,
                    kind,
                    points: args.points,
                },
            )
        }
        Command::Redeem(args) => {
            let kind = args.kind.unwrap_or(TransactionKind::Redeem);
            dispatch(
                &*open()?,
                Operation::Redeem {
                    name: args.name,
                    entity: args.entity,
                    transaction_id: args.transaction_id,
                    kind,
                    points: args.points,
                },
            )
        }
        Command::Wallet { name } => dispatch(&*open()?, Operation::GetWallet { name }),
        Command::Transaction {
            name,
            entity,
            transaction_id,
        } => dispatch(
            &*open()?,
            Operation::GetTransaction {
                name,
                entity,
                transaction_id,
            },
        ),
        Command::Invoke { operation, args } => {
            let operation = Operation::from_invocation(&operation, &args)?;
            dispatch(&*open()?, operation)
        }
        Command::Partner { entity, action } => {
            let partner = open()?.partner(&entity)?;
            let output: OperationOutput = match action {
                PartnerAction::Award {
                    wallet,
                    transaction_id,
                    points,
                } => partner.award(&wallet, &transaction_id, points)?.into(),
                PartnerAction::Redeem {
                    wallet,
                    transaction_id,
                    points,
                } => partner.redeem(&wallet, &transaction_id, points)?.into(),
                PartnerAction::Transaction {
                    wallet,
                    transaction_id,
                } => partner.transaction(&wallet, &transaction_id)?.into(),
            };
            print_json(&output)
        }
        Command::Batch { file } => {
            let handle = File::open(&file)
                .with_context(|| format!("failed to open batch file {}", file.display()))?;
            let entries = parse_operations(BufReader::new(handle))?;
            let report = run_batch(open()?, entries).await?;
            print_json(&report)
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn dispatch(services: &Services, operation: Operation) -> Result<()> {
    let output = operation
        .execute(services)
        .with_context(|| format!("{} failed for wallet {}", operation.name(), operation.wallet()))?;
    print_json(&output)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value).context("failed to write output")?;
    writeln!(stdout)?;
    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rrl_types::{Account, Role};

#[derive(Parser)]
#[command(
    name = "rrl",
    about = "Reward Receipt Ledger: role-gated, append-only proof-of-reward receipts",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./rrl.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ledger state file, overriding the configured path
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new ledger with the given account as admin and writer
    Init(InitArgs),
    /// Store and read receipts
    Receipt(ReceiptArgs),
    /// Inspect and manage roles
    Role(RoleArgs),
    /// Show the event log
    Events(EventsArgs),
    /// Check receipts against the event log
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(long)]
    pub admin: Account,
}

#[derive(Args)]
pub struct ReceiptArgs {
    #[command(subcommand)]
    pub action: ReceiptAction,
}

#[derive(Subcommand)]
pub enum ReceiptAction {
    /// Append a receipt (requires the writer role)
    Add(AddReceiptArgs),
    /// Show the receipt with the given id
    Get { id: u64 },
    /// Number of stored receipts
    Count,
    /// List receipts in an inclusive id range
    List {
        #[arg(long, default_value = "1")]
        start: u64,
        #[arg(long)]
        end: Option<u64>,
    },
}

#[derive(Args)]
pub struct AddReceiptArgs {
    #[arg(long)]
    pub from: Option<Account>,
    #[arg(long)]
    pub recipient: Account,
    #[arg(long)]
    pub transfer_tx: String,
    #[arg(long)]
    pub version: String,
    #[arg(long)]
    pub timestamp: u64,
    #[arg(long)]
    pub metadata_uri: String,
}

#[derive(Args)]
pub struct RoleArgs {
    #[command(subcommand)]
    pub action: RoleAction,
}

#[derive(Subcommand)]
pub enum RoleAction {
    /// Whether an account holds a role
    Has { role: Role, account: Account },
    /// The role administering a role
    Admin { role: Role },
    /// List the members of a role
    Members { role: Role },
    /// Grant a role (requires its admin role)
    Grant(RoleChangeArgs),
    /// Revoke a role (requires its admin role)
    Revoke(RoleChangeArgs),
    /// Give up one of your own roles
    Renounce(RoleChangeArgs),
}

#[derive(Args)]
pub struct RoleChangeArgs {
    pub role: Role,
    pub account: Account,
    #[arg(long)]
    pub from: Option<Account>,
}

#[derive(Args)]
pub struct EventsArgs {
    #[arg(long, default_value = "0")]
    pub start: usize,
}

#[derive(Args)]
pub struct VerifyArgs {}

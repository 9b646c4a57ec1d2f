use anyhow::Context;
use colored::Colorize;
use rrl_ledger::{InMemoryLedger, LedgerReader, LedgerWriter};
use rrl_types::{Account, LedgerEvent, Receipt, ReceiptId, Role};
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;
use crate::store::StateFile;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let store = StateFile::new(cli.state.unwrap_or_else(|| config.state_path.clone()));
    let session = Session {
        format: cli.format,
        config,
        store,
    };

    match cli.command {
        Command::Init(args) => session.cmd_init(args),
        Command::Receipt(args) => match args.action {
            ReceiptAction::Add(args) => session.cmd_add_receipt(args),
            ReceiptAction::Get { id } => session.cmd_get_receipt(id),
            ReceiptAction::Count => session.cmd_count(),
            ReceiptAction::List { start, end } => session.cmd_list(start, end),
        },
        Command::Role(args) => match args.action {
            RoleAction::Has { role, account } => session.cmd_has_role(role, account),
            RoleAction::Admin { role } => session.cmd_role_admin(role),
            RoleAction::Members { role } => session.cmd_members(role),
            RoleAction::Grant(args) => session.cmd_role_change(RoleChange::Grant, args),
            RoleAction::Revoke(args) => session.cmd_role_change(RoleChange::Revoke, args),
            RoleAction::Renounce(args) => session.cmd_role_change(RoleChange::Renounce, args),
        },
        Command::Events(args) => session.cmd_events(args.start),
        Command::Verify(_) => session.cmd_verify(),
    }
}

#[derive(Clone, Copy)]
enum RoleChange {
    Grant,
    Revoke,
    Renounce,
}

struct Session {
    format: OutputFormat,
    config: CliConfig,
    store: StateFile,
}

impl Session {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn caller(&self, explicit: Option<Account>) -> anyhow::Result<Account> {
        explicit
            .or(self.config.default_caller)
            .context("no caller given: pass --from or set default_caller in the config")
    }

    fn cmd_init(&self, args: InitArgs) -> anyhow::Result<()> {
        let ledger = InMemoryLedger::new(args.admin);
        self.store.create(&ledger)?;
        if self.json() {
            println!(
                "{}",
                json!({ "state": self.store.path().display().to_string(), "admin": args.admin })
            );
        } else {
            println!(
                "{} Initialized receipt ledger in {}",
                "✓".green().bold(),
                self.store.path().display().to_string().bold()
            );
            println!("  Admin:  {}", args.admin.to_string().cyan());
            println!("  Writer: {}", args.admin.to_string().cyan());
        }
        Ok(())
    }

    fn cmd_add_receipt(&self, args: AddReceiptArgs) -> anyhow::Result<()> {
        let caller = self.caller(args.from)?;
        let receipt = Receipt::new(
            args.recipient,
            args.transfer_tx,
            args.version,
            args.timestamp,
            args.metadata_uri,
        );
        let id = self
            .store
            .update(|ledger| Ok(ledger.add_receipt(caller, receipt)?))?;

        if self.json() {
            println!("{}", json!({ "id": id }));
        } else {
            println!("{} Receipt stored as {}", "✓".green().bold(), id.to_string().yellow());
        }
        Ok(())
    }

    fn cmd_get_receipt(&self, id: u64) -> anyhow::Result<()> {
        let ledger = self.store.load()?;
        let receipt = ledger.receipt(id)?;
        self.print_receipt(ReceiptId(id), &receipt);
        Ok(())
    }

    fn cmd_count(&self) -> anyhow::Result<()> {
        let count = self.store.load()?.count()?;
        if self.json() {
            println!("{}", json!({ "count": count }));
        } else {
            println!("{count}");
        }
        Ok(())
    }

    fn cmd_list(&self, start: u64, end: Option<u64>) -> anyhow::Result<()> {
        let ledger = self.store.load()?;
        let count = ledger.count()?;
        let end = end.unwrap_or(count);
        let receipts = if count == 0 {
            Vec::new()
        } else {
            ledger.receipts(start, end)?
        };

        if receipts.is_empty() && !self.json() {
            println!("No receipts.");
        }
        for (offset, receipt) in receipts.iter().enumerate() {
            self.print_receipt(ReceiptId(start + offset as u64), receipt);
        }
        Ok(())
    }

    fn cmd_has_role(&self, role: Role, account: Account) -> anyhow::Result<()> {
        let held = self.store.load()?.has_role(&role, &account)?;
        if self.json() {
            println!("{}", json!({ "role": role, "account": account, "has_role": held }));
        } else {
            println!("{held}");
        }
        Ok(())
    }

    fn cmd_role_admin(&self, role: Role) -> anyhow::Result<()> {
        let admin = self.store.load()?.role_admin(&role)?;
        if self.json() {
            println!("{}", json!({ "role": role, "admin_role": admin }));
        } else {
            println!("{} ({})", admin, admin.label().cyan());
        }
        Ok(())
    }

    fn cmd_members(&self, role: Role) -> anyhow::Result<()> {
        let members = self.store.load()?.role_members(&role)?;
        if self.json() {
            println!("{}", json!({ "role": role, "members": members }));
            return Ok(());
        }
        println!("Role {} ({} member(s))", role.label().cyan().bold(), members.len());
        for (index, member) in members.iter().enumerate() {
            println!("  [{index}] {member}");
        }
        Ok(())
    }

    fn cmd_role_change(&self, change: RoleChange, args: RoleChangeArgs) -> anyhow::Result<()> {
        let caller = self.caller(args.from)?;
        let (role, account) = (args.role, args.account);
        let changed = self.store.update(|ledger| {
            Ok(match change {
                RoleChange::Grant => ledger.grant_role(role, account, caller)?,
                RoleChange::Revoke => ledger.revoke_role(role, account, caller)?,
                RoleChange::Renounce => ledger.renounce_role(role, account, caller)?,
            })
        })?;

        let verb = match change {
            RoleChange::Grant => "granted",
            RoleChange::Revoke => "revoked",
            RoleChange::Renounce => "renounced",
        };
        if self.json() {
            println!(
                "{}",
                json!({ "role": args.role, "account": args.account, "action": verb, "changed": changed })
            );
        } else if changed {
            println!(
                "{} Role {} {} for {}",
                "✓".green().bold(),
                args.role.label().cyan(),
                verb,
                args.account
            );
        } else {
            println!("No change: role {} already {} for {}", args.role.label(), verb, args.account);
        }
        Ok(())
    }

    fn cmd_events(&self, start: usize) -> anyhow::Result<()> {
        let events = self.store.load()?.events(start)?;
        for (offset, event) in events.iter().enumerate() {
            let position = start + offset;
            if self.json() {
                println!("{}", json!({ "position": position, "event": event }));
            } else {
                println!("{:>4}  {}", position.to_string().dimmed(), colorize(event));
            }
        }
        Ok(())
    }

    fn cmd_verify(&self) -> anyhow::Result<()> {
        let ledger = self.store.load()?;
        let report = ledger.validate()?;
        let hash = hex::encode(ledger.state_hash()?);

        if self.json() {
            println!(
                "{}",
                json!({
                    "valid": report.is_valid(),
                    "receipts": report.receipt_count,
                    "state_hash": hash,
                    "violations": report.violations.iter().map(|v| &v.description).collect::<Vec<_>>(),
                })
            );
        } else if report.is_valid() {
            println!(
                "{} {} receipts, event log consistent",
                "✓".green().bold(),
                report.receipt_count
            );
            println!("  State hash: {}", hash.dimmed());
        } else {
            for violation in &report.violations {
                println!("{} {}", "✗".red().bold(), violation.description);
            }
        }

        anyhow::ensure!(report.is_valid(), "ledger state failed verification");
        Ok(())
    }

    fn print_receipt(&self, id: ReceiptId, receipt: &Receipt) {
        if self.json() {
            println!("{}", json!({ "id": id, "receipt": receipt }));
            return;
        }
        println!("{}", id.to_string().yellow().bold());
        println!("  Recipient:    {}", receipt.recipient);
        println!("  Transfer tx:  {}", receipt.transfer_tx);
        println!("  Version:      {}", receipt.version);
        println!("  Timestamp:    {}", receipt.timestamp);
        println!("  Metadata URI: {}", receipt.metadata_uri.blue());
    }
}

fn colorize(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::RewardReceiptStored { .. } => event.to_string().green().to_string(),
        LedgerEvent::RoleGranted { .. } => event.to_string().cyan().to_string(),
        LedgerEvent::RoleRevoked { .. } => event.to_string().yellow().to_string(),
    }
}

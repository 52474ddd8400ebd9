//! Cash CLI
//!
//! Command-line interface for counter sessions and cash transfers.

mod config;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cash_client::CashClient;
use cash_service::{CashService, CloseOutcome};
use cash_types::{
    Amount, CloseMode, CounterExternalId, Denominations, Session, SessionId, Transfer,
    TransferDraft, TransferId, UserId,
};
use cash_types::domain::STANDARD_DENOMINATIONS;

use config::Config;

#[derive(Parser)]
#[command(name = "cash")]
#[command(author, version, about = "Cash counter sessions and transfers", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List counters and who holds a session at each
    Counters,
    /// Session operations
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Transfer operations
    Transfer {
        #[command(subcommand)]
        action: TransferCommands,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Show your open session at a counter
    Current {
        #[arg(long)]
        counter: String,
    },
    /// Open a session at a counter
    Open {
        #[arg(long)]
        counter: String,
        /// Cash in the drawer when opening
        #[arg(long, default_value = "0")]
        balance: String,
    },
    /// Close your session at a counter
    Close {
        #[arg(long)]
        counter: String,
        /// Close and stay liable for the remaining balance
        #[arg(long)]
        acknowledge: bool,
        /// Report the balance to transfer away instead of closing
        #[arg(long, conflicts_with = "acknowledge")]
        transfer_first: bool,
    },
    /// Session history for the facility
    History,
}

#[derive(Subcommand)]
enum TransferCommands {
    /// Send cash from your session to another open session
    Create {
        /// Counter your session is at
        #[arg(long)]
        counter: String,
        /// Destination session ID
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: Option<String>,
        /// Standard denomination count as FACE=COUNT, repeatable (required for main cash)
        #[arg(long = "denom", value_parser = parse_denomination)]
        denominations: Vec<(Amount, u32)>,
    },
    /// Accept a transfer into your session
    Accept {
        id: String,
        #[arg(long)]
        counter: String,
    },
    /// Reject a transfer sent to your session
    Reject {
        id: String,
        #[arg(long)]
        counter: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Cancel a transfer you sent
    Cancel {
        id: String,
        #[arg(long)]
        counter: String,
    },
    /// Transfers waiting for you at a counter
    Pending {
        #[arg(long)]
        counter: String,
    },
    /// Transfers sent out of your session
    Sent {
        #[arg(long)]
        counter: String,
    },
    /// Transfers sent into your session
    Received {
        #[arg(long)]
        counter: String,
    },
}

fn parse_denomination(s: &str) -> std::result::Result<(Amount, u32), String> {
    let (face, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FACE=COUNT, got {}", s))?;
    let face: Amount = face
        .parse()
        .map_err(|_| format!("invalid denomination: {}", face))?;
    if !STANDARD_DENOMINATIONS.iter().any(|d| Amount::from(*d) == face) {
        return Err(format!(
            "{} is not a standard denomination ({:?})",
            face, STANDARD_DENOMINATIONS
        ));
    }
    let count: u32 = count
        .trim()
        .parse()
        .map_err(|_| format!("invalid count: {}", count))?;
    Ok((face, count))
}

fn parse_session_id(s: &str) -> Result<SessionId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid session ID: {}", s))
}

fn parse_transfer_id(s: &str) -> Result<TransferId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid transfer ID: {}", s))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// The actor's open session at `counter`, required for every session-scoped action.
async fn require_session(
    service: &CashService<CashClient>,
    counter: &CounterExternalId,
) -> Result<Session> {
    match service.current_session(counter).await? {
        Some(session) => Ok(session),
        None => bail!("No open session at counter {}", counter),
    }
}

async fn require_transfer(
    service: &CashService<CashClient>,
    actor: &UserId,
    session: &Session,
    id: &str,
) -> Result<Transfer> {
    let id = parse_transfer_id(id)?;
    match service.find_transfer(actor, session, id).await? {
        Some(transfer) => Ok(transfer),
        None => bail!("Transfer {} not found among your pending or sent transfers", id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cash_service=debug,cash_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let money = cli.config.money()?;
    let actor: UserId = cli.config.actor();
    let service = CashService::new(cli.config.client(), money);

    match cli.command {
        Commands::Counters => {
            let counters = service.list_counters().await?;
            print_json(&counters)?;
        }

        Commands::Session { action } => match action {
            SessionCommands::Current { counter } => {
                let counter = CounterExternalId::new(counter);
                match service.current_session(&counter).await? {
                    Some(session) => {
                        print_json(&session)?;
                        println!("Expected: {}", money.format_currency(session.expected_amount));
                    }
                    None => println!("No open session at counter {}", counter),
                }
            }
            SessionCommands::Open { counter, balance } => {
                let counter = CounterExternalId::new(counter);
                let session = service.open_session(&actor, &counter, &balance).await?;
                print_json(&session)?;
            }
            SessionCommands::Close {
                counter,
                acknowledge,
                transfer_first,
            } => {
                let counter = CounterExternalId::new(counter);
                let session = require_session(&service, &counter).await?;
                let mode = if transfer_first {
                    CloseMode::TransferFirst
                } else if acknowledge {
                    CloseMode::WithBalance { acknowledged: true }
                } else {
                    CloseMode::Standard
                };
                match service.close_session(&actor, &session, mode).await? {
                    CloseOutcome::Closed {
                        session,
                        difference,
                    } => {
                        print_json(&json!({ "session": session, "difference": difference }))?;
                    }
                    CloseOutcome::TransferFirst {
                        balance,
                        destinations,
                    } => {
                        println!(
                            "Transfer {} to another session, then close again",
                            money.format_currency(balance)
                        );
                        if destinations.is_empty() {
                            println!("No other counter has an open session");
                        }
                        for counter in &destinations {
                            let marker = if counter.is_main_cash { " (main cash)" } else { "" };
                            println!("  {} {}{}", counter.external_id, counter.name, marker);
                            for open in &counter.open_sessions {
                                println!("    session {} held by {}", open.session_id, open.user_name);
                            }
                        }
                    }
                }
            }
            SessionCommands::History => {
                let sessions = service.session_history().await?;
                print_json(&sessions)?;
            }
        },

        Commands::Transfer { action } => match action {
            TransferCommands::Create {
                counter,
                to,
                amount,
                denominations,
            } => {
                let counter = CounterExternalId::new(counter);
                let session = require_session(&service, &counter).await?;
                let denominations = if denominations.is_empty() {
                    None
                } else {
                    Some(Denominations::from_pairs(denominations)?)
                };
                let draft = TransferDraft {
                    to_session: Some(parse_session_id(&to)?),
                    amount,
                    denominations,
                };
                let transfer = service.create_transfer(&actor, &session, &draft).await?;
                print_json(&transfer)?;
            }
            TransferCommands::Accept { id, counter } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfer = require_transfer(&service, &actor, &session, &id).await?;
                if let Err(err) = transfer.check_denominations() {
                    tracing::warn!(transfer = %transfer.id, error = %err, "Breakdown does not match amount");
                }
                let transfer = service.accept_transfer(&actor, &transfer, &session).await?;
                print_json(&transfer)?;
            }
            TransferCommands::Reject { id, counter, reason } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfer = require_transfer(&service, &actor, &session, &id).await?;
                let transfer = service
                    .reject_transfer(&actor, &transfer, &session, reason.as_deref())
                    .await?;
                print_json(&transfer)?;
            }
            TransferCommands::Cancel { id, counter } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfer = require_transfer(&service, &actor, &session, &id).await?;
                let transfer = service.cancel_transfer(&actor, &transfer, &session).await?;
                print_json(&transfer)?;
            }
            TransferCommands::Pending { counter } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfers = service.pending_transfers(&actor, &session).await?;
                print_json(&transfers)?;
            }
            TransferCommands::Sent { counter } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfers = service.sent_transfers(&session).await?;
                print_json(&transfers)?;
            }
            TransferCommands::Received { counter } => {
                let session = require_session(&service, &CounterExternalId::new(counter)).await?;
                let transfers = service.received_transfers(&session).await?;
                print_json(&transfers)?;
            }
        },
    }

    Ok(())
}

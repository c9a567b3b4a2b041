use anyhow::Result;
use clap::{Parser, Subcommand};
use herald_core::recipient::RecipientKind;
use herald_infrastructure::{ConfigService, HeraldPaths, ServiceType};
use std::path::PathBuf;

mod commands;
mod context;
mod logging;
mod login_flow;

use commands::send::SendArgs;
use context::AppContext;

#[derive(Parser)]
#[command(name = "herald")]
#[command(about = "Herald - broadcast one message to selected friends and groups", long_about = None)]
struct Cli {
    /// Use this directory instead of ~/.config/herald
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Use an existing access token instead of the browser dialog
        #[arg(long)]
        token: Option<String>,
    },
    /// Log out and forget the stored session
    Logout,
    /// Show the current session
    Status,
    /// List friends and groups
    Recipients {
        /// Only list one kind (individual or group)
        #[arg(long)]
        kind: Option<RecipientKind>,
    },
    /// Broadcast a message to the selected recipients
    Send {
        #[arg(short, long)]
        message: String,
        /// Recipient id to include (repeatable)
        #[arg(long = "to", value_name = "ID")]
        to: Vec<String>,
        /// Include every friend
        #[arg(long)]
        all_individuals: bool,
        /// Include every group
        #[arg(long)]
        all_groups: bool,
        /// Seconds between sends (clamped to the configured range)
        #[arg(long)]
        delay: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = cli.home.as_deref();

    let config = ConfigService::new(home)?.get_config()?;
    let logs_dir = HeraldPaths::new(home).get_path(ServiceType::Logs).ok();
    let _log_guard = logging::init(&config.logging, logs_dir.as_deref());

    let preset_token = match &cli.command {
        Commands::Login { token } => token.clone(),
        _ => None,
    };
    let ctx = AppContext::build(config, home, preset_token)?;

    match cli.command {
        Commands::Login { .. } => commands::login::run(&ctx).await?,
        Commands::Logout => commands::logout::run(&ctx).await?,
        Commands::Status => commands::status::run(&ctx).await?,
        Commands::Recipients { kind } => commands::recipients::run(&ctx, kind).await?,
        Commands::Send {
            message,
            to,
            all_individuals,
            all_groups,
            delay,
        } => {
            let args = SendArgs {
                message,
                to,
                all_individuals,
                all_groups,
                delay,
            };
            commands::send::run(&ctx, args).await?
        }
    }

    Ok(())
}

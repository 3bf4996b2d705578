//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "support-bot")]
#[command(about = "Telegram support relay", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the relay (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Record a Telegram user id as an operator.
    AddOperator {
        #[arg(long)]
        tg_id: i64,
    },
}

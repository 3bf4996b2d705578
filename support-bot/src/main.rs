//! support-bot: relay customer questions to a review channel and operator
//! answers back. Config from env and optional CLI args.

use anyhow::Result;
use clap::Parser;
use support_bot::{add_operator, run_bot, Cli, Commands, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = RelayConfig::load(token)?;
            run_bot(config).await
        }
        Commands::AddOperator { tg_id } => {
            add_operator(&RelayConfig::database_url_from_env(), tg_id).await
        }
    }
}

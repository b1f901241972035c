use clap::Parser;
use llm_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Session(args) => cli::session::run(args).await,
        Command::Config => cli::config::run().await,
    }
}

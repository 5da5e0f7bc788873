use clap::Parser;
use lightning_lookup::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Suggest(args) => cli::suggest::run(args).await,
    }
}

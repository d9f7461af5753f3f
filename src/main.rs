use clap::Parser;
use team_roster_sync::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Create(args) => cli::team::create(args).await,
        Command::Read(args) => cli::team::read(args).await,
        Command::Update(args) => cli::team::update(args).await,
        Command::Delete(args) => cli::team::delete(args).await,
        Command::Import(args) => cli::team::import(args).await,
    }
}

mod balance;
mod buy;
mod cli;
mod common;
mod config;
mod deposit;
mod find_pdas;
mod initialize;
mod output;
mod reader;
mod session;
mod status;

use {
    crate::{cli::Cli, config::Config},
    clap::{CommandFactory, Parser},
};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type CommandResult = Result<String, Error>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let matches = Cli::command().get_matches();
    let mut wallet_manager = None;

    let config = Config::new(cli.clone(), matches.clone(), &mut wallet_manager)?;

    solana_logger::setup_with_default("solana=info,ico_sale=warn");

    let result = cli.command.execute(&config).await?;
    println!("{}", result);

    Ok(())
}

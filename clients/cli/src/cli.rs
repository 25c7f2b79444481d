use {
    crate::{
        balance::{command_balance, BalanceArgs},
        buy::{command_buy, BuyArgs},
        common::parse_pubkey,
        config::{AdminPolicy, Config},
        deposit::{command_deposit, DepositArgs},
        find_pdas::{command_find_pdas, FindPdasArgs},
        initialize::{command_initialize, InitializeArgs},
        output::parse_output_format,
        status::{command_status, StatusArgs},
        CommandResult,
    },
    clap::{
        builder::{PossibleValuesParser, TypedValueParser},
        Parser, Subcommand,
    },
    solana_clap_v3_utils::input_parsers::{
        parse_url_or_moniker,
        signer::{SignerSource, SignerSourceParserBuilder},
    },
    solana_cli_output::OutputFormat,
    solana_pubkey::Pubkey,
};

#[derive(Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about = "A command line tool for interacting with the ICO token sale program"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Configuration file to use
    #[clap(global(true), short = 'C', long = "config", id = "PATH")]
    pub config_file: Option<String>,

    /// Simulate transaction instead of executing
    #[clap(global(true), long, alias = "dryrun")]
    pub dry_run: bool,

    /// URL for Solana JSON `RPC` or moniker (or their first letter):
    /// [`mainnet-beta`, `testnet`, `devnet`, `localhost`].
    /// Default from the configuration file.
    #[clap(
        global(true),
        short = 'u',
        long = "url",
        id = "URL_OR_MONIKER",
        value_parser = parse_url_or_moniker,
    )]
    pub json_rpc_url: Option<String>,

    /// Specify the wallet paying for and signing sale transactions. This may
    /// be a keypair file, the ASK keyword or a hardware wallet URL.
    /// Defaults to the client keypair.
    #[clap(
        global(true),
        long,
        id = "PAYER_KEYPAIR",
        value_parser = SignerSourceParserBuilder::default().allow_all().build(),
    )]
    pub fee_payer: Option<SignerSource>,

    /// Address of the deployed ICO program
    #[clap(
        global(true),
        long,
        env = "ICO_PROGRAM_ID",
        value_parser = parse_pubkey
    )]
    pub program_id: Option<Pubkey>,

    /// Address of the mint sold by the ICO
    #[clap(global(true), long, env = "ICO_MINT", value_parser = parse_pubkey)]
    pub mint: Option<Pubkey>,

    /// Whether a wallet may create the sale when none exists yet
    #[clap(global(true), long, value_enum, default_value = "first-comer")]
    pub admin_policy: AdminPolicy,

    /// Use the sale created by this admin instead of discovering one
    #[clap(global(true), long, value_parser = parse_pubkey)]
    pub sale_admin: Option<Pubkey>,

    /// Show additional information
    #[clap(global(true), short, long)]
    pub verbose: bool,

    /// Return information in specified output format
    #[clap(
        global(true),
        long = "output",
        id = "FORMAT",
        conflicts_with = "verbose",
        value_parser = PossibleValuesParser::new([
            "display",
            "json",
            "json-compact",
            "quiet",
            "verbose"
        ]).map(|o| parse_output_format(&o)),
    )]
    pub output_format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the connected wallet's role, token balance and the sale state
    Status(StatusArgs),
    /// Show the sale token balance of a wallet
    Balance(BalanceArgs),
    /// Find the PDA addresses used by the sale
    FindPdas(FindPdasArgs),
    /// Create the sale and move the initial tokens into the vault
    Initialize(InitializeArgs),
    /// Move more tokens from the admin into the vault
    Deposit(DepositArgs),
    /// Buy tokens from the sale
    Buy(BuyArgs),
}

impl Command {
    pub async fn execute(self, config: &Config) -> CommandResult {
        match self {
            Command::Status(args) => command_status(config, args).await,
            Command::Balance(args) => command_balance(config, args).await,
            Command::FindPdas(args) => command_find_pdas(config, args).await,
            Command::Initialize(args) => command_initialize(config, args).await,
            Command::Deposit(args) => command_deposit(config, args).await,
            Command::Buy(args) => command_buy(config, args).await,
        }
    }
}

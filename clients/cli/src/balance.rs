use {
    crate::{
        common::parse_pubkey,
        config::Config,
        output::{format_output, format_token_amount},
        reader::fetch_token_balance,
        CommandResult,
    },
    clap::Args,
    ico_sale_interface::get_buyer_token_address,
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, QuietDisplay, VerboseDisplay},
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Debug, Args)]
pub struct BalanceArgs {
    /// The wallet whose balance to show. Defaults to the connected wallet.
    #[clap(long, value_parser = parse_pubkey)]
    pub owner: Option<Pubkey>,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub owner: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub token_account: Pubkey,

    pub amount: u64,

    pub ui_amount: String,
}

impl Display for BalanceOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Owner:", &self.owner.to_string())?;
        writeln_name_value(f, "Token account:", &self.token_account.to_string())?;
        writeln_name_value(f, "Balance:", &format!("{} tokens", self.ui_amount))
    }
}

impl QuietDisplay for BalanceOutput {
    fn write_str(&self, w: &mut dyn std::fmt::Write) -> std::fmt::Result {
        writeln!(w, "{}", self.ui_amount)
    }
}
impl VerboseDisplay for BalanceOutput {}

pub async fn command_balance(config: &Config, args: BalanceArgs) -> CommandResult {
    let owner = match args.owner {
        Some(owner) => owner,
        None => config.fee_payer()?.pubkey(),
    };
    let mint = &config.sale.mint;

    let amount = fetch_token_balance(&config.rpc_client, &owner, mint).await;

    Ok(format_output(
        config,
        BalanceOutput {
            owner,
            token_account: get_buyer_token_address(&owner, mint),
            amount,
            ui_amount: format_token_amount(amount, config.sale.token_decimals),
        },
    ))
}

use {
    crate::{common::parse_pubkey, config::Config, output::format_output, CommandResult},
    clap::Args,
    ico_sale_interface::{
        get_buyer_token_address, get_sale_state_address_with_seed, get_vault_address_with_seed,
    },
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, QuietDisplay, VerboseDisplay},
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Debug, Args)]
pub struct FindPdasArgs {
    /// The admin whose sale state to derive. Defaults to the wallet.
    #[clap(long, value_parser = parse_pubkey)]
    pub admin: Option<Pubkey>,

    /// The owner whose token account to derive. Defaults to the wallet.
    #[clap(long, value_parser = parse_pubkey)]
    pub owner: Option<Pubkey>,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdasOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault_address: Pubkey,
    pub vault_bump: u8,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub sale_state_address: Option<Pubkey>,
    pub sale_state_bump: Option<u8>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub token_account: Option<Pubkey>,
}

impl Display for PdasOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Program:", &self.program_id.to_string())?;
        writeln_name_value(f, "Mint:", &self.mint.to_string())?;
        writeln_name_value(
            f,
            "Vault address:",
            &format!("{} (bump {})", self.vault_address, self.vault_bump),
        )?;
        if let (Some(address), Some(bump)) = (self.sale_state_address, self.sale_state_bump) {
            writeln_name_value(
                f,
                "Sale state address:",
                &format!("{} (bump {})", address, bump),
            )?;
        }
        if let Some(token_account) = self.token_account {
            writeln_name_value(f, "Token account:", &token_account.to_string())?;
        }

        Ok(())
    }
}

impl QuietDisplay for PdasOutput {
    fn write_str(&self, _: &mut dyn std::fmt::Write) -> std::fmt::Result {
        Ok(())
    }
}
impl VerboseDisplay for PdasOutput {}

pub async fn command_find_pdas(config: &Config, args: FindPdasArgs) -> CommandResult {
    let sale = &config.sale;
    let wallet = config.fee_payer.as_ref().map(|signer| signer.pubkey());

    let (vault_address, vault_bump) = get_vault_address_with_seed(&sale.mint, &sale.program_id);
    let sale_state = args
        .admin
        .or(wallet)
        .map(|admin| get_sale_state_address_with_seed(&admin, &sale.program_id));
    let token_account = args
        .owner
        .or(wallet)
        .map(|owner| get_buyer_token_address(&owner, &sale.mint));

    Ok(format_output(
        config,
        PdasOutput {
            program_id: sale.program_id,
            mint: sale.mint,
            vault_address,
            vault_bump,
            sale_state_address: sale_state.map(|(address, _)| address),
            sale_state_bump: sale_state.map(|(_, bump)| bump),
            token_account,
        },
    ))
}

use {
    crate::{
        common::{parse_amount, process_transaction},
        config::Config,
        output::{format_output, println_display, SaleSummary},
        reader::{fetch_sale_state, refresh_active_sale},
        session::Session,
        CommandResult,
    },
    clap::Args,
    ico_sale_interface::{
        get_buyer_token_address, get_sale_state_address, get_vault_address,
        instruction::deposit_ico_in_ata,
    },
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, QuietDisplay, VerboseDisplay},
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_transaction::Transaction,
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Debug, Args)]
pub struct DepositArgs {
    /// The number of whole tokens to add to the sale
    #[clap(value_parser = parse_amount)]
    pub amount: u64,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub sale_state_address: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub vault_address: Pubkey,

    pub amount: u64,

    pub previous_total_tokens: u64,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub signature: Option<Signature>,

    pub sale: Option<SaleSummary>,
}

impl Display for DepositOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Sale state:", &self.sale_state_address.to_string())?;
        writeln_name_value(f, "Vault:", &self.vault_address.to_string())?;
        writeln_name_value(f, "Deposited:", &format!("{} tokens", self.amount))?;
        writeln_name_value(
            f,
            "Previous total supply:",
            &format!("{} tokens", self.previous_total_tokens),
        )?;
        if let Some(signature) = self.signature {
            writeln_name_value(f, "Signature:", &signature.to_string())?;
        }
        if let Some(sale) = &self.sale {
            write!(f, "{}", sale)?;
        }
        Ok(())
    }
}

impl QuietDisplay for DepositOutput {
    fn write_str(&self, _: &mut dyn std::fmt::Write) -> std::fmt::Result {
        Ok(())
    }
}
impl VerboseDisplay for DepositOutput {}

pub async fn command_deposit(config: &Config, args: DepositArgs) -> CommandResult {
    let session = Session::connect(config)?;
    let _guard = session.begin_operation("deposit")?;
    let sale = &session.sale;
    let admin = session.wallet_address();

    let sale_state_address = get_sale_state_address(&admin, &sale.program_id);
    let current = fetch_sale_state(&session.rpc_client, &sale_state_address)
        .await?
        .ok_or_else(|| {
            format!(
                "No sale state found for admin {} at {}, initialize the sale first",
                admin, sale_state_address
            )
        })?;

    let vault_address = get_vault_address(&sale.mint, &sale.program_id);
    let admin_token_account = get_buyer_token_address(&admin, &sale.mint);

    println_display(
        config,
        format!(
            "Depositing {} tokens into vault {}",
            args.amount, vault_address
        ),
    );

    let instruction = deposit_ico_in_ata(
        &sale.program_id,
        &vault_address,
        &sale_state_address,
        &sale.mint,
        &admin_token_account,
        &admin,
        args.amount,
    );

    let blockhash = session.rpc_client.get_latest_blockhash().await?;
    let transaction = Transaction::new_signed_with_payer(
        &[instruction],
        Some(&admin),
        &[&*session.wallet],
        blockhash,
    );
    let signature = process_transaction(config, transaction).await?;

    let refreshed_sale = if signature.is_some() {
        refresh_active_sale(&session.rpc_client, sale).await
    } else {
        None
    };

    Ok(format_output(
        config,
        DepositOutput {
            sale_state_address,
            vault_address,
            amount: args.amount,
            previous_total_tokens: current.total_tokens(),
            signature,
            sale: refreshed_sale.map(SaleSummary::from),
        },
    ))
}

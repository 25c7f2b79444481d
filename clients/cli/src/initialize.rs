use {
    crate::{
        common::{parse_amount, process_transaction},
        config::Config,
        output::{format_output, println_display, SaleSummary},
        reader::{check_admin_status, refresh_active_sale, AdminStatus, Role},
        session::Session,
        CommandResult, Error,
    },
    clap::Args,
    ico_sale_interface::{
        get_buyer_token_address, get_sale_state_address, get_vault_address,
        instruction::create_ico_ata,
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
#[clap(about = "Creates the sale state and vault, funding the vault from the admin")]
pub struct InitializeArgs {
    /// The number of whole tokens to commit to the sale
    #[clap(value_parser = parse_amount)]
    pub amount: u64,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub admin: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub sale_state_address: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub vault_address: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub admin_token_account: Pubkey,

    pub amount: u64,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub signature: Option<Signature>,

    pub sale: Option<SaleSummary>,
}

impl Display for InitializeOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Admin:", &self.admin.to_string())?;
        writeln_name_value(f, "Sale state:", &self.sale_state_address.to_string())?;
        writeln_name_value(f, "Vault:", &self.vault_address.to_string())?;
        writeln_name_value(
            f,
            "Admin token account:",
            &self.admin_token_account.to_string(),
        )?;
        writeln_name_value(f, "Amount:", &format!("{} tokens", self.amount))?;
        if let Some(signature) = self.signature {
            writeln_name_value(f, "Signature:", &signature.to_string())?;
        }
        if let Some(sale) = &self.sale {
            write!(f, "{}", sale)?;
        }
        Ok(())
    }
}

impl QuietDisplay for InitializeOutput {
    fn write_str(&self, _: &mut dyn std::fmt::Write) -> std::fmt::Result {
        Ok(())
    }
}
impl VerboseDisplay for InitializeOutput {}

/// Only a wallet that administers the sale, or may create it, initializes.
/// Re-initializing an existing sale is left for the program to reject.
pub fn check_may_initialize(wallet: &Pubkey, admin_status: &AdminStatus) -> Result<(), Error> {
    match (admin_status.role, admin_status.active_sale) {
        (Role::Admin, _) | (Role::AdminEligible, _) => Ok(()),
        (Role::User, Some(active_sale)) => Err(format!(
            "Wallet {} cannot initialize: sale {} administered by {} already exists",
            wallet, active_sale.address, active_sale.state.admin
        )
        .into()),
        (Role::User, None) => Err(format!(
            "Wallet {} is not allowed to create a sale under the current admin policy",
            wallet
        )
        .into()),
    }
}

pub async fn command_initialize(config: &Config, args: InitializeArgs) -> CommandResult {
    let session = Session::connect(config)?;
    let _guard = session.begin_operation("initialize")?;
    let sale = &session.sale;
    let admin = session.wallet_address();

    let admin_status = check_admin_status(&session.rpc_client, sale, &admin).await;
    check_may_initialize(&admin, &admin_status)?;

    let sale_state_address = get_sale_state_address(&admin, &sale.program_id);
    let vault_address = get_vault_address(&sale.mint, &sale.program_id);
    let admin_token_account = get_buyer_token_address(&admin, &sale.mint);

    println_display(
        config,
        format!(
            "Initializing sale of {} tokens of mint {} from {}",
            args.amount, sale.mint, admin_token_account
        ),
    );

    let instruction = create_ico_ata(
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
        InitializeOutput {
            admin,
            sale_state_address,
            vault_address,
            admin_token_account,
            amount: args.amount,
            signature,
            sale: refreshed_sale.map(SaleSummary::from),
        },
    ))
}

#[cfg(test)]
mod tests {
    use {super::*, crate::reader::ListedSale, ico_sale_interface::state::SaleState};

    #[test]
    fn admin_and_eligible_wallets_may_initialize() {
        let wallet = Pubkey::new_unique();
        for role in [Role::Admin, Role::AdminEligible] {
            let status = AdminStatus {
                role,
                active_sale: None,
            };
            assert!(check_may_initialize(&wallet, &status).is_ok());
        }
    }

    #[test]
    fn user_is_refused_when_another_sale_exists() {
        let wallet = Pubkey::new_unique();
        let other_admin = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let status = AdminStatus {
            role: Role::User,
            active_sale: Some(ListedSale {
                address,
                state: SaleState::new(other_admin, 10, 0),
            }),
        };

        let err = check_may_initialize(&wallet, &status).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "Wallet {} cannot initialize: sale {} administered by {} already exists",
                wallet, address, other_admin
            )
        );
    }

    #[test]
    fn user_is_refused_without_any_sale() {
        let wallet = Pubkey::new_unique();
        let status = AdminStatus {
            role: Role::User,
            active_sale: None,
        };
        assert!(check_may_initialize(&wallet, &status)
            .unwrap_err()
            .to_string()
            .contains("current admin policy"));
    }
}

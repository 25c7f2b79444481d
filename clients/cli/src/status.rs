use {
    crate::{
        buy::PurchaseQuote,
        common::{lamports_to_sol_string, parse_amount},
        config::Config,
        output::{format_output, format_token_amount, SaleSummary},
        reader::{check_admin_status, fetch_active_sale, fetch_token_balance, Role},
        CommandResult,
    },
    clap::Args,
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, QuietDisplay, VerboseDisplay},
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// Show what buying this many tokens would cost
    #[clap(long, value_parser = parse_amount)]
    pub amount: Option<u64>,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub wallet: Option<Pubkey>,

    pub role: Option<Role>,

    pub token_balance: Option<u64>,

    pub ui_token_balance: Option<String>,

    pub token_price_lamports: u64,

    pub sale: Option<SaleSummary>,

    pub quote: Option<PurchaseQuote>,
}

impl Display for StatusOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.wallet, self.role) {
            (Some(wallet), Some(role)) => {
                writeln_name_value(f, "Wallet:", &wallet.to_string())?;
                let role = match role {
                    Role::Admin => "Admin",
                    Role::AdminEligible => "Admin (sale not initialized)",
                    Role::User => "User",
                };
                writeln_name_value(f, "Status:", role)?;
            }
            _ => writeln_name_value(f, "Wallet:", "not connected")?,
        }
        if let Some(balance) = &self.ui_token_balance {
            writeln_name_value(f, "Your token balance:", &format!("{} tokens", balance))?;
        }

        writeln!(f)?;
        match &self.sale {
            Some(sale) => {
                writeln!(f, "ICO status")?;
                write!(f, "{}", sale)?;
                writeln_name_value(
                    f,
                    "Token price:",
                    &format!("{} SOL", lamports_to_sol_string(self.token_price_lamports)),
                )?;
            }
            None if self.role == Some(Role::AdminEligible) => {
                writeln!(f, "ICO needs to be initialized")?;
            }
            None => writeln!(f, "No sale found for program {}", self.program_id)?,
        }

        if let Some(quote) = &self.quote {
            writeln!(f)?;
            write!(f, "{}", quote)?;
        }
        Ok(())
    }
}

impl QuietDisplay for StatusOutput {
    fn write_str(&self, w: &mut dyn std::fmt::Write) -> std::fmt::Result {
        if let Some(sale) = &self.sale {
            writeln!(w, "{}", sale.available_tokens)?;
        }
        Ok(())
    }
}
impl VerboseDisplay for StatusOutput {}

pub async fn command_status(config: &Config, args: StatusArgs) -> CommandResult {
    let sale = &config.sale;
    let rpc_client = &config.rpc_client;
    let wallet = config.fee_payer.as_ref().map(|signer| signer.pubkey());

    let (role, active_sale, token_balance) = match wallet {
        Some(wallet) => {
            let admin_status = check_admin_status(rpc_client, sale, &wallet).await;
            let balance = fetch_token_balance(rpc_client, &wallet, &sale.mint).await;
            (
                Some(admin_status.role),
                admin_status.active_sale,
                Some(balance),
            )
        }
        None => (None, fetch_active_sale(rpc_client, sale).await?, None),
    };

    let quote = args
        .amount
        .map(|amount| PurchaseQuote::new(sale, amount))
        .transpose()?;

    Ok(format_output(
        config,
        StatusOutput {
            program_id: sale.program_id,
            mint: sale.mint,
            wallet,
            role,
            token_balance,
            ui_token_balance: token_balance
                .map(|balance| format_token_amount(balance, sale.token_decimals)),
            token_price_lamports: sale.lamports_per_token,
            sale: active_sale.map(SaleSummary::from),
            quote,
        },
    ))
}

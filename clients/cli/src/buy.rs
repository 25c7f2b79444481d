use {
    crate::{
        common::{check_sufficient_funds, lamports_to_sol_string, parse_amount, process_transaction},
        config::{Config, SaleConfig},
        output::{format_output, format_token_amount, println_display, SaleSummary},
        reader::{
            fetch_active_sale, fetch_token_balance, refresh_active_sale, token_account_exists,
            ListedSale,
        },
        session::Session,
        CommandResult, Error,
    },
    clap::Args,
    ico_sale_interface::{
        get_buyer_token_address, get_sale_state_address, get_vault_address,
        get_vault_address_with_seed, instruction::buy_tokens,
    },
    log::info,
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, QuietDisplay, VerboseDisplay},
    solana_instruction::Instruction,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_transaction::Transaction,
    spl_associated_token_account_client::instruction::create_associated_token_account_idempotent,
    std::fmt::{Display, Formatter},
};

#[derive(Clone, Debug, Args)]
pub struct BuyArgs {
    /// The number of whole tokens to buy
    #[clap(value_parser = parse_amount)]
    pub amount: u64,
}

/// Lamports needed to buy a number of tokens at the configured price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseQuote {
    pub amount: u64,
    pub cost_lamports: u64,
    pub fee_lamports: u64,
    pub total_lamports: u64,
}

impl PurchaseQuote {
    pub fn new(sale: &SaleConfig, amount: u64) -> Result<Self, Error> {
        let overflow = || format!("Cost of {} tokens overflows", amount);
        let cost_lamports = amount
            .checked_mul(sale.lamports_per_token)
            .ok_or_else(overflow)?;
        let total_lamports = sale.required_lamports(amount).ok_or_else(overflow)?;
        Ok(Self {
            amount,
            cost_lamports,
            fee_lamports: sale.fee_allowance,
            total_lamports,
        })
    }
}

impl Display for PurchaseQuote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Token amount:", &format!("{} tokens", self.amount))?;
        writeln_name_value(
            f,
            "Cost:",
            &format!("{} SOL", lamports_to_sol_string(self.cost_lamports)),
        )?;
        writeln_name_value(
            f,
            "Network fee:",
            &format!("~{} SOL", lamports_to_sol_string(self.fee_lamports)),
        )?;
        writeln_name_value(
            f,
            "Total:",
            &format!("{} SOL", lamports_to_sol_string(self.total_lamports)),
        )
    }
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyOutput {
    #[serde_as(as = "DisplayFromStr")]
    pub buyer: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub buyer_token_account: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub sale_state_address: Pubkey,

    #[serde_as(as = "DisplayFromStr")]
    pub vault_address: Pubkey,

    pub quote: PurchaseQuote,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub token_account_signature: Option<Signature>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    pub signature: Option<Signature>,

    pub token_balance: Option<String>,

    pub sale: Option<SaleSummary>,
}

impl Display for BuyOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Buyer:", &self.buyer.to_string())?;
        writeln_name_value(
            f,
            "Buyer token account:",
            &self.buyer_token_account.to_string(),
        )?;
        writeln_name_value(f, "Vault:", &self.vault_address.to_string())?;
        write!(f, "{}", self.quote)?;
        if let Some(signature) = self.token_account_signature {
            writeln_name_value(f, "Token account signature:", &signature.to_string())?;
        }
        if let Some(signature) = self.signature {
            writeln_name_value(f, "Signature:", &signature.to_string())?;
        }
        if let Some(balance) = &self.token_balance {
            writeln_name_value(f, "Your token balance:", &format!("{} tokens", balance))?;
        }
        if let Some(sale) = &self.sale {
            write!(f, "{}", sale)?;
        }
        Ok(())
    }
}

impl QuietDisplay for BuyOutput {
    fn write_str(&self, _: &mut dyn std::fmt::Write) -> std::fmt::Result {
        Ok(())
    }
}
impl VerboseDisplay for BuyOutput {}

/// Idempotent creation of the buyer's associated token account for the mint
pub fn create_token_account_instruction(buyer: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(buyer, buyer, mint, &spl_token::id())
}

/// Instructions of the purchase transaction. The sale state and the payment
/// recipient follow the loaded sale's admin, never the buyer.
pub fn purchase_instructions(
    sale: &SaleConfig,
    active_sale: &ListedSale,
    buyer: &Pubkey,
    amount: u64,
    create_token_account: bool,
) -> Vec<Instruction> {
    let sale_admin = active_sale.state.admin;
    let sale_state_address = get_sale_state_address(&sale_admin, &sale.program_id);
    let (vault_address, vault_bump) = get_vault_address_with_seed(&sale.mint, &sale.program_id);

    let mut instructions = Vec::with_capacity(2);
    if create_token_account {
        instructions.push(create_token_account_instruction(buyer, &sale.mint));
    }
    instructions.push(buy_tokens(
        &sale.program_id,
        &vault_address,
        vault_bump,
        &sale_state_address,
        &sale.mint,
        &get_buyer_token_address(buyer, &sale.mint),
        buyer,
        &sale_admin,
        amount,
    ));
    instructions
}

pub async fn command_buy(config: &Config, args: BuyArgs) -> CommandResult {
    let session = Session::connect(config)?;
    let _guard = session.begin_operation("buy")?;
    let sale = &session.sale;
    let rpc_client = &session.rpc_client;
    let buyer = session.wallet_address();

    let active_sale = fetch_active_sale(rpc_client, sale).await?.ok_or(
        "No active sale found, the sale admin must initialize it before tokens can be bought",
    )?;
    if args.amount > active_sale.state.available_tokens() {
        return Err(format!(
            "Only {} tokens are available, cannot buy {}",
            active_sale.state.available_tokens(),
            args.amount
        )
        .into());
    }

    let quote = PurchaseQuote::new(sale, args.amount)?;
    let balance = rpc_client.get_balance(&buyer).await?;
    check_sufficient_funds(balance, quote.total_lamports)?;

    let sale_state_address = get_sale_state_address(&active_sale.state.admin, &sale.program_id);
    let vault_address = get_vault_address(&sale.mint, &sale.program_id);
    let buyer_token_account = get_buyer_token_address(&buyer, &sale.mint);

    let needs_token_account = !token_account_exists(rpc_client, &buyer, &sale.mint).await;
    let mut token_account_signature = None;
    if needs_token_account && !config.dry_run {
        println_display(
            config,
            format!("Creating token account {}", buyer_token_account),
        );
        let blockhash = rpc_client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[create_token_account_instruction(&buyer, &sale.mint)],
            Some(&buyer),
            &[&*session.wallet],
            blockhash,
        );
        // Confirmed before the purchase is built
        token_account_signature = process_transaction(config, transaction).await?;
        info!("Token account {} created", buyer_token_account);
    }

    println_display(
        config,
        format!(
            "Buying {} tokens for {} SOL from sale {}",
            args.amount,
            lamports_to_sol_string(quote.cost_lamports),
            sale_state_address
        ),
    );

    // Simulation cannot see an unsent account, so a dry run simulates both
    let instructions = purchase_instructions(
        sale,
        &active_sale,
        &buyer,
        args.amount,
        needs_token_account && config.dry_run,
    );

    let blockhash = rpc_client.get_latest_blockhash().await?;
    let transaction = Transaction::new_signed_with_payer(
        &instructions,
        Some(&buyer),
        &[&*session.wallet],
        blockhash,
    );
    let signature = process_transaction(config, transaction).await?;

    let (token_balance, refreshed_sale) = if signature.is_some() {
        let raw_balance = fetch_token_balance(rpc_client, &buyer, &sale.mint).await;
        (
            Some(format_token_amount(raw_balance, sale.token_decimals)),
            refresh_active_sale(rpc_client, sale).await,
        )
    } else {
        (None, None)
    };

    Ok(format_output(
        config,
        BuyOutput {
            buyer,
            buyer_token_account,
            sale_state_address,
            vault_address,
            quote,
            token_account_signature,
            signature,
            token_balance,
            sale: refreshed_sale.map(SaleSummary::from),
        },
    ))
}

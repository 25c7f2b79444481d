#![allow(dead_code)]

use {
    ico_sale_interface::{get_buyer_token_address, get_sale_state_address, state::SaleState},
    solana_account::{Account, AccountSharedData},
    solana_cli_config::Config as SolanaConfig,
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_keypair::{write_keypair_file, Keypair},
    solana_program_pack::Pack,
    solana_pubkey::Pubkey,
    solana_sdk_ids::system_program,
    solana_signer::Signer,
    solana_test_validator::{TestValidator, TestValidatorGenesis},
    solana_transaction::Transaction,
    spl_token::{instruction::initialize_mint, state::Mint},
    std::{
        process::{Command, Output},
        sync::Arc,
    },
    tempfile::NamedTempFile,
};

pub const ICO_SALE_CLI_BIN: &str = "../../target/debug/ico-sale";

pub const WALLET_LAMPORTS: u64 = 10_000_000_000;

pub struct TestEnv {
    pub rpc_client: Arc<RpcClient>,
    /// Validator faucet, used to create the mint
    pub payer: Keypair,
    /// Wallet the CLI signs with
    pub wallet: Keypair,
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub config_file_path: String,
    // Persist these to keep them in scope
    _validator: TestValidator,
    _keypair_file: NamedTempFile,
    _config_file: NamedTempFile,
}

/// A sale state written into genesis, standing in for one created by the
/// program
pub struct SeededSale {
    pub admin: Pubkey,
    pub total_tokens: u64,
    pub tokens_sold: u64,
}

pub fn sale_state_account(program_id: &Pubkey, sale: &SeededSale) -> AccountSharedData {
    let state = SaleState::new(sale.admin, sale.total_tokens, sale.tokens_sold);
    let mut data = vec![0; 9000];
    data[..8].copy_from_slice(&state.discriminator);
    data[8..40].copy_from_slice(state.admin.as_ref());
    data[40..48].copy_from_slice(&sale.total_tokens.to_le_bytes());
    data[48..56].copy_from_slice(&sale.tokens_sold.to_le_bytes());

    AccountSharedData::from(Account {
        lamports: 100_000_000,
        data,
        owner: *program_id,
        executable: false,
        rent_epoch: 0,
    })
}

pub async fn setup_test_env(sales: &[SeededSale]) -> TestEnv {
    setup_test_env_with_wallet(Keypair::new(), WALLET_LAMPORTS, sales).await
}

pub async fn setup_test_env_with_wallet(
    wallet: Keypair,
    wallet_lamports: u64,
    sales: &[SeededSale],
) -> TestEnv {
    solana_logger::setup();
    let program_id = Pubkey::new_unique();

    let mut test_validator_genesis = TestValidatorGenesis::default();
    test_validator_genesis.add_account(
        wallet.pubkey(),
        AccountSharedData::new(wallet_lamports, 0, &system_program::id()),
    );
    for sale in sales {
        test_validator_genesis.add_account(
            get_sale_state_address(&sale.admin, &program_id),
            sale_state_account(&program_id, sale),
        );
    }
    let (validator, payer) = test_validator_genesis.start_async().await;
    let rpc_client = Arc::new(validator.get_async_rpc_client());

    // Write wallet keypair to a temporary file
    let keypair_file = NamedTempFile::new().unwrap();
    write_keypair_file(&wallet, &keypair_file).unwrap();
    let keypair_file_path = keypair_file.path().to_str().unwrap().to_string();

    // Create and save CLI configuration file
    let config_file = NamedTempFile::new().unwrap();
    let config_file_path = config_file.path().to_str().unwrap().to_string();
    let solana_config = SolanaConfig {
        json_rpc_url: validator.rpc_url(),
        websocket_url: validator.rpc_pubsub_url(),
        keypair_path: keypair_file_path,
        ..SolanaConfig::default()
    };
    solana_config.save(&config_file_path).unwrap();

    let mint = create_mint(&rpc_client, &payer).await;

    TestEnv {
        rpc_client,
        payer,
        wallet,
        program_id,
        mint,
        config_file_path,
        _validator: validator,
        _keypair_file: keypair_file,
        _config_file: config_file,
    }
}

async fn create_mint(rpc_client: &RpcClient, payer: &Keypair) -> Pubkey {
    let mint_account = Keypair::new();
    let rent = rpc_client
        .get_minimum_balance_for_rent_exemption(Mint::LEN)
        .await
        .unwrap();

    let blockhash = rpc_client.get_latest_blockhash().await.unwrap();

    let transaction = Transaction::new_signed_with_payer(
        &[
            solana_system_interface::instruction::create_account(
                &payer.pubkey(),
                &mint_account.pubkey(),
                rent,
                Mint::LEN as u64,
                &spl_token::id(),
            ),
            initialize_mint(
                &spl_token::id(),
                &mint_account.pubkey(),
                &payer.pubkey(),
                None,
                9,
            )
            .unwrap(),
        ],
        Some(&payer.pubkey()),
        &[payer, &mint_account],
        blockhash,
    );

    rpc_client
        .send_and_confirm_transaction(&transaction)
        .await
        .unwrap();
    mint_account.pubkey()
}

/// Creates the associated token account of `owner` and mints `amount` raw
/// units into it
pub async fn fund_token_account(env: &TestEnv, owner: &Pubkey, amount: u64) -> Pubkey {
    let token_account = get_buyer_token_address(owner, &env.mint);

    let tx = Transaction::new_signed_with_payer(
        &[
            spl_associated_token_account_client::instruction::create_associated_token_account(
                &env.payer.pubkey(),
                owner,
                &env.mint,
                &spl_token::id(),
            ),
            spl_token::instruction::mint_to(
                &spl_token::id(),
                &env.mint,
                &token_account,
                &env.payer.pubkey(),
                &[],
                amount,
            )
            .unwrap(),
        ],
        Some(&env.payer.pubkey()),
        &[&env.payer],
        env.rpc_client.get_latest_blockhash().await.unwrap(),
    );
    env.rpc_client
        .send_and_confirm_transaction(&tx)
        .await
        .unwrap();

    token_account
}

/// Runs the CLI against the test validator with the sale flags filled in
pub fn run_cli(env: &TestEnv, args: &[&str]) -> Output {
    Command::new(ICO_SALE_CLI_BIN)
        .args([
            "-C",
            &env.config_file_path,
            "--program-id",
            &env.program_id.to_string(),
            "--mint",
            &env.mint.to_string(),
        ])
        .args(args)
        .env_remove("ICO_PROGRAM_ID")
        .env_remove("ICO_MINT")
        .output()
        .unwrap()
}

pub fn run_cli_json(env: &TestEnv, args: &[&str]) -> serde_json::Value {
    let mut json_args = vec!["--output", "json"];
    json_args.extend_from_slice(args);
    let output = run_cli(env, &json_args);
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

use {
    crate::helpers::{fund_token_account, run_cli_json, setup_test_env},
    ico_sale_interface::get_buyer_token_address,
    serial_test::serial,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
};

mod helpers;

#[tokio::test]
#[serial]
async fn test_balance_without_token_account_is_zero() {
    let env = setup_test_env(&[]).await;

    let balance = run_cli_json(&env, &["balance"]);

    assert_eq!(balance["owner"], env.wallet.pubkey().to_string());
    assert_eq!(
        balance["tokenAccount"],
        get_buyer_token_address(&env.wallet.pubkey(), &env.mint).to_string()
    );
    assert_eq!(balance["amount"], 0);
    assert_eq!(balance["uiAmount"], "0");
}

#[tokio::test]
#[serial]
async fn test_balance_reads_token_account() {
    let env = setup_test_env(&[]).await;
    let owner = Pubkey::new_unique();
    fund_token_account(&env, &owner, 2_500_000_000).await;

    let balance = run_cli_json(&env, &["balance", "--owner", &owner.to_string()]);

    assert_eq!(balance["owner"], owner.to_string());
    assert_eq!(balance["amount"], 2_500_000_000u64);
    assert_eq!(balance["uiAmount"], "2.5");
}

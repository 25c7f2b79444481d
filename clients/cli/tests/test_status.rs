use {
    crate::helpers::{run_cli_json, setup_test_env, SeededSale},
    ico_sale_interface::get_sale_state_address,
    serial_test::serial,
    solana_keypair::Keypair,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
};

mod helpers;

#[tokio::test]
#[serial]
async fn test_first_wallet_is_admin_eligible_without_sales() {
    let env = setup_test_env(&[]).await;

    let status = run_cli_json(&env, &["status"]);

    assert_eq!(status["wallet"], env.wallet.pubkey().to_string());
    assert_eq!(status["role"], "adminEligible");
    assert!(status["sale"].is_null());
    assert_eq!(status["tokenBalance"], 0);
}

#[tokio::test]
#[serial]
async fn test_existing_only_policy_keeps_wallet_a_user() {
    let env = setup_test_env(&[]).await;

    let status = run_cli_json(&env, &["status", "--admin-policy", "existing-only"]);

    assert_eq!(status["role"], "user");
    assert!(status["sale"].is_null());
}

#[tokio::test]
#[serial]
async fn test_other_wallet_is_user_and_sees_sale() {
    let admin = Pubkey::new_unique();
    let env = setup_test_env(&[SeededSale {
        admin,
        total_tokens: 1_000,
        tokens_sold: 150,
    }])
    .await;

    let status = run_cli_json(&env, &["status", "--amount", "10"]);

    assert_eq!(status["role"], "user");
    let sale = &status["sale"];
    assert_eq!(sale["admin"], admin.to_string());
    assert_eq!(
        sale["saleStateAddress"],
        get_sale_state_address(&admin, &env.program_id).to_string()
    );
    assert_eq!(sale["totalTokens"], 1_000);
    assert_eq!(sale["tokensSold"], 150);
    assert_eq!(sale["availableTokens"], 850);

    let quote = &status["quote"];
    assert_eq!(quote["costLamports"], 10_000_000);
    assert_eq!(quote["totalLamports"], 10_005_000);
}

#[tokio::test]
#[serial]
async fn test_wallet_with_own_sale_is_admin() {
    let wallet = Keypair::new();
    let env = crate::helpers::setup_test_env_with_wallet(
        wallet.insecure_clone(),
        crate::helpers::WALLET_LAMPORTS,
        &[SeededSale {
            admin: wallet.pubkey(),
            total_tokens: 500,
            tokens_sold: 0,
        }],
    )
    .await;

    let status = run_cli_json(&env, &["status"]);

    assert_eq!(status["role"], "admin");
    assert_eq!(status["sale"]["admin"], wallet.pubkey().to_string());
    assert_eq!(status["sale"]["totalTokens"], 500);
}

#[tokio::test]
#[serial]
async fn test_lowest_sale_address_is_active() {
    let sales: Vec<SeededSale> = (0..3)
        .map(|i| SeededSale {
            admin: Pubkey::new_unique(),
            total_tokens: 100 * (i + 1),
            tokens_sold: 0,
        })
        .collect();
    let env = setup_test_env(&sales).await;

    let expected_admin = sales
        .iter()
        .min_by_key(|sale| get_sale_state_address(&sale.admin, &env.program_id))
        .unwrap()
        .admin;

    let status = run_cli_json(&env, &["status"]);
    assert_eq!(status["sale"]["admin"], expected_admin.to_string());

    // Pinning a sale overrides discovery
    let pinned = sales
        .iter()
        .find(|sale| sale.admin != expected_admin)
        .unwrap();
    let status = run_cli_json(
        &env,
        &["status", "--sale-admin", &pinned.admin.to_string()],
    );
    assert_eq!(status["sale"]["admin"], pinned.admin.to_string());
    assert_eq!(status["sale"]["totalTokens"], pinned.total_tokens);
}

//! Client interface for the ICO token sale program
#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod instruction;
pub mod state;

use {
    solana_pubkey::Pubkey,
    spl_associated_token_account_client::address::get_associated_token_address_with_program_id,
};

/// Number of decimals of the sale mint. Sale amounts are expressed in whole
/// tokens and scaled by `10^TOKEN_DECIMALS` by the program.
pub const TOKEN_DECIMALS: u8 = 9;

/// Price of one whole token, in lamports (0.001 SOL)
pub const LAMPORTS_PER_TOKEN: u64 = 1_000_000;

/// Lamports reserved on top of the purchase price to cover the network fee
pub const FEE_ALLOWANCE_LAMPORTS: u64 = 5_000;

const SALE_STATE_SEED: &[u8] = br"data";

/// Seeds of the sale-state account owned by `admin`
pub fn get_sale_state_seeds(admin: &Pubkey) -> [&[u8]; 2] {
    [SALE_STATE_SEED, admin.as_ref()]
}

/// Derive the sale-state address and bump seed for `admin`
pub fn get_sale_state_address_with_seed(admin: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&get_sale_state_seeds(admin), program_id)
}

/// Derive the sale-state address created by `admin`
pub fn get_sale_state_address(admin: &Pubkey, program_id: &Pubkey) -> Pubkey {
    get_sale_state_address_with_seed(admin, program_id).0
}

/// Seeds of the vault token account. The vault is keyed by the mint alone,
/// so there is one vault per mint per program deployment.
pub fn get_vault_seeds(mint: &Pubkey) -> [&[u8]; 1] {
    [mint.as_ref()]
}

/// Derive the vault address and bump seed. The bump is an argument of the
/// `buy_tokens` instruction.
pub fn get_vault_address_with_seed(mint: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&get_vault_seeds(mint), program_id)
}

/// Derive the vault address holding tokens for sale
pub fn get_vault_address(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    get_vault_address_with_seed(mint, program_id).0
}

/// Derive the associated token account of `owner` for the sale mint.
///
/// This is the associated token account program's derivation, not the sale
/// program's.
pub fn get_buyer_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &spl_token::id())
}

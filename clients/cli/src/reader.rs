//! Reads sale state and balances from the cluster.
//!
//! Read paths treat missing accounts and query failures as absence: a wallet
//! whose sale cannot be found is not admin, and a token account that cannot
//! be read holds zero tokens.

use {
    crate::{
        config::{AdminPolicy, SaleConfig},
        Error,
    },
    ico_sale_interface::{get_buyer_token_address, get_sale_state_address, state::SaleState},
    log::{debug, warn},
    serde_derive::{Deserialize, Serialize},
    solana_account_decoder_client_types::{UiAccountEncoding, UiDataSliceConfig},
    solana_client::{
        nonblocking::rpc_client::RpcClient,
        rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
        rpc_filter::{Memcmp, RpcFilterType},
    },
    solana_program_pack::Pack,
    solana_pubkey::Pubkey,
};

/// A sale state together with the address it was read from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListedSale {
    pub address: Pubkey,
    pub state: SaleState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    /// The wallet created the sale
    Admin,
    /// No sale exists yet and the wallet may create one
    AdminEligible,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AdminStatus {
    pub role: Role,
    pub active_sale: Option<ListedSale>,
}

/// Fetches the sale state at `address`, `None` if the account does not exist
pub async fn fetch_sale_state(
    rpc_client: &RpcClient,
    address: &Pubkey,
) -> Result<Option<SaleState>, Error> {
    let account = rpc_client
        .get_account_with_commitment(address, rpc_client.commitment())
        .await?
        .value;
    match account {
        Some(account) => {
            let state = SaleState::unpack(&account.data)
                .map_err(|_| format!("Account {} is not a sale state", address))?;
            Ok(Some(*state))
        }
        None => Ok(None),
    }
}

/// Query for every sale state owned by the program. Only the meaningful
/// prefix of each account is requested.
pub fn sale_listing_config() -> RpcProgramAccountsConfig {
    RpcProgramAccountsConfig {
        filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
            0,
            SaleState::DISCRIMINATOR.to_vec(),
        ))]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            data_slice: Some(UiDataSliceConfig {
                offset: 0,
                length: SaleState::LEN,
            }),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    }
}

/// Lists every sale state owned by the program, ordered by address
pub async fn list_sales(rpc_client: &RpcClient, program_id: &Pubkey) -> Result<Vec<ListedSale>, Error> {
    let config = sale_listing_config();
    let accounts = rpc_client
        .get_program_accounts_with_config(program_id, config)
        .await?;

    let sales = accounts
        .into_iter()
        .filter_map(|(address, account)| match SaleState::unpack(&account.data) {
            Ok(state) => Some(ListedSale {
                address,
                state: *state,
            }),
            Err(e) => {
                debug!("Skipping account {}: {}", address, e);
                None
            }
        })
        .collect();
    Ok(order_sales(sales))
}

/// Several sales may exist under one deployment. The one with the lowest
/// sale-state address is treated as the active sale.
pub fn order_sales(mut sales: Vec<ListedSale>) -> Vec<ListedSale> {
    sales.sort_by_key(|sale| sale.address);
    sales
}

/// Candidate sales for discovery: the pinned sale when one is configured,
/// otherwise every listed sale
async fn discover_sales(
    rpc_client: &RpcClient,
    sale: &SaleConfig,
) -> Result<Vec<ListedSale>, Error> {
    match sale.sale_admin {
        Some(admin) => {
            let address = get_sale_state_address(&admin, &sale.program_id);
            Ok(fetch_sale_state(rpc_client, &address)
                .await?
                .map(|state| ListedSale { address, state })
                .into_iter()
                .collect())
        }
        None => list_sales(rpc_client, &sale.program_id).await,
    }
}

/// The sale used for display and purchases
pub async fn fetch_active_sale(
    rpc_client: &RpcClient,
    sale: &SaleConfig,
) -> Result<Option<ListedSale>, Error> {
    Ok(discover_sales(rpc_client, sale).await?.into_iter().next())
}

/// Re-reads the active sale once a transaction has landed. A failed read is
/// logged and reported as no sale rather than failing the command.
pub async fn refresh_active_sale(rpc_client: &RpcClient, sale: &SaleConfig) -> Option<ListedSale> {
    fetch_active_sale(rpc_client, sale)
        .await
        .unwrap_or_else(|e| {
            warn!("Could not refresh sale state: {}", e);
            None
        })
}

/// Decides the wallet's role from its own sale state (if any) and the
/// discovered sales
pub fn resolve_admin_status(
    wallet: &Pubkey,
    own_sale: Option<ListedSale>,
    discovered: &[ListedSale],
    policy: AdminPolicy,
) -> AdminStatus {
    if let Some(own_sale) = own_sale {
        if own_sale.state.admin == *wallet {
            return AdminStatus {
                role: Role::Admin,
                active_sale: Some(own_sale),
            };
        }
    }

    match discovered.first() {
        Some(first) => AdminStatus {
            role: Role::User,
            active_sale: Some(*first),
        },
        None => AdminStatus {
            role: match policy {
                AdminPolicy::FirstComer => Role::AdminEligible,
                AdminPolicy::ExistingOnly => Role::User,
            },
            active_sale: None,
        },
    }
}

/// Works out whether `wallet` administers the sale. Never fails: query errors
/// leave the wallet as a plain user.
pub async fn check_admin_status(
    rpc_client: &RpcClient,
    sale: &SaleConfig,
    wallet: &Pubkey,
) -> AdminStatus {
    let own_address = get_sale_state_address(wallet, &sale.program_id);
    let own_sale = match fetch_sale_state(rpc_client, &own_address).await {
        Ok(state) => state.map(|state| ListedSale {
            address: own_address,
            state,
        }),
        Err(e) => {
            debug!("No sale state for {} at {}: {}", wallet, own_address, e);
            None
        }
    };

    if own_sale.is_some_and(|own| own.state.admin == *wallet) {
        return resolve_admin_status(wallet, own_sale, &[], sale.admin_policy);
    }

    match discover_sales(rpc_client, sale).await {
        Ok(discovered) => resolve_admin_status(wallet, own_sale, &discovered, sale.admin_policy),
        Err(e) => {
            warn!("Could not list sales: {}", e);
            AdminStatus {
                role: Role::User,
                active_sale: None,
            }
        }
    }
}

/// Raw token balance of `owner` for the sale mint. Zero when the associated
/// token account is missing or unreadable.
pub async fn fetch_token_balance(rpc_client: &RpcClient, owner: &Pubkey, mint: &Pubkey) -> u64 {
    let token_account = get_buyer_token_address(owner, mint);
    match rpc_client.get_account(&token_account).await {
        Ok(account) => match spl_token::state::Account::unpack(&account.data) {
            Ok(state) => state.amount,
            Err(e) => {
                warn!("Token account {} is unreadable: {}", token_account, e);
                0
            }
        },
        Err(e) => {
            debug!("Token account {} not found: {}", token_account, e);
            0
        }
    }
}

/// Whether the associated token account of `owner` for the sale mint exists
pub async fn token_account_exists(rpc_client: &RpcClient, owner: &Pubkey, mint: &Pubkey) -> bool {
    let token_account = get_buyer_token_address(owner, mint);
    rpc_client.get_account(&token_account).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(admin: Pubkey, total: u64, sold: u64) -> ListedSale {
        ListedSale {
            address: Pubkey::new_unique(),
            state: SaleState::new(admin, total, sold),
        }
    }

    #[test]
    fn wallet_with_own_sale_is_admin() {
        let wallet = Pubkey::new_unique();
        let own = sale(wallet, 100, 0);
        let status = resolve_admin_status(&wallet, Some(own), &[], AdminPolicy::FirstComer);
        assert_eq!(status.role, Role::Admin);
        assert_eq!(status.active_sale, Some(own));
    }

    #[test]
    fn first_wallet_is_admin_eligible_when_no_sale_exists() {
        let wallet = Pubkey::new_unique();
        let status = resolve_admin_status(&wallet, None, &[], AdminPolicy::FirstComer);
        assert_eq!(status.role, Role::AdminEligible);
        assert_eq!(status.active_sale, None);
    }

    #[test]
    fn existing_only_policy_never_grants_eligibility() {
        let wallet = Pubkey::new_unique();
        let status = resolve_admin_status(&wallet, None, &[], AdminPolicy::ExistingOnly);
        assert_eq!(status.role, Role::User);
        assert_eq!(status.active_sale, None);
    }

    #[test]
    fn other_wallet_is_user_and_sees_first_sale() {
        let admin = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let sales = order_sales(vec![sale(admin, 500, 20), sale(Pubkey::new_unique(), 10, 0)]);
        let status = resolve_admin_status(&wallet, None, &sales, AdminPolicy::FirstComer);
        assert_eq!(status.role, Role::User);
        assert_eq!(status.active_sale, Some(sales[0]));
    }

    #[test]
    fn sale_listing_requests_base64_prefix() {
        let config = sale_listing_config();
        // Binary encoding is refused for accounts over 128 bytes
        assert_eq!(config.account_config.encoding, Some(UiAccountEncoding::Base64));
        let slice = config.account_config.data_slice.unwrap();
        assert_eq!((slice.offset, slice.length), (0, SaleState::LEN));

        let filters = config.filters.unwrap();
        assert_eq!(filters.len(), 1);
        match &filters[0] {
            RpcFilterType::Memcmp(memcmp) => {
                assert_eq!(memcmp.offset(), 0);
                assert_eq!(
                    memcmp.bytes().unwrap().as_slice(),
                    &SaleState::DISCRIMINATOR[..]
                );
            }
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn sales_are_ordered_by_address() {
        let mut sales: Vec<ListedSale> = (0..5).map(|_| sale(Pubkey::new_unique(), 1, 0)).collect();
        sales.reverse();
        let ordered = order_sales(sales.clone());
        assert_eq!(ordered.len(), 5);
        assert!(ordered.windows(2).all(|w| w[0].address < w[1].address));
        for listed in &sales {
            assert!(ordered.contains(listed));
        }
    }
}

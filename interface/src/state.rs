//! Program state

use {
    bytemuck::{Pod, Zeroable},
    solana_program_error::ProgramError,
    solana_pubkey::Pubkey,
    spl_pod::primitives::PodU64,
};

/// Sale state
///
/// Created by `create_ico_ata` at `get_sale_state_address(admin)`. The
/// program allocates more space than it uses; only the first
/// [`SaleState::LEN`] bytes carry data.
///
/// `total_tokens` and `tokens_sold` count whole tokens, not raw units.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SaleState {
    /// Account discriminator, must equal [`SaleState::DISCRIMINATOR`]
    pub discriminator: [u8; 8],
    /// Administrator that created the sale and receives payments
    pub admin: Pubkey,
    /// Tokens committed to the sale so far
    pub total_tokens: PodU64,
    /// Tokens bought so far
    pub tokens_sold: PodU64,
}

impl SaleState {
    /// First 8 bytes of `sha256("account:Data")`
    pub const DISCRIMINATOR: [u8; 8] = [206, 156, 59, 188, 18, 79, 240, 232];

    /// Length of the meaningful prefix of the account data
    pub const LEN: usize = std::mem::size_of::<Self>();

    /// Creates a sale state as the program would write it
    pub fn new(admin: Pubkey, total_tokens: u64, tokens_sold: u64) -> Self {
        Self {
            discriminator: Self::DISCRIMINATOR,
            admin,
            total_tokens: total_tokens.into(),
            tokens_sold: tokens_sold.into(),
        }
    }

    /// Reads a sale state from raw account data
    pub fn unpack(data: &[u8]) -> Result<&Self, ProgramError> {
        let prefix = data
            .get(..Self::LEN)
            .ok_or(ProgramError::InvalidAccountData)?;
        let state = bytemuck::try_from_bytes::<Self>(prefix)
            .map_err(|_| ProgramError::InvalidAccountData)?;
        if state.discriminator != Self::DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(state)
    }

    /// Tokens committed to the sale
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens.into()
    }

    /// Tokens already bought
    pub fn tokens_sold(&self) -> u64 {
        self.tokens_sold.into()
    }

    /// Tokens still available for purchase
    pub fn available_tokens(&self) -> u64 {
        self.total_tokens().saturating_sub(self.tokens_sold())
    }
}

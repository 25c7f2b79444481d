//! Program instructions

use {
    solana_instruction::{AccountMeta, Instruction},
    solana_program_error::ProgramError,
    solana_pubkey::Pubkey,
    solana_sdk_ids::{system_program, sysvar},
    std::convert::TryInto,
};

/// Instructions supported by the ICO program.
///
/// The program is built with Anchor: instruction data starts with an 8-byte
/// sighash (`sha256("global:<instruction name>")[..8]`) followed by the
/// Borsh-encoded arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum IcoInstruction {
    /// Create the sale state and the vault, and move the initial tokens from
    /// the admin into the vault.
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[w]` Vault token account to create, address must be:
    ///    `get_vault_address(mint)`
    /// 1. `[w]` Sale state account to create, address must be:
    ///    `get_sale_state_address(admin)`
    /// 2. `[]` Sale mint
    /// 3. `[w]` Admin token account for the sale mint
    /// 4. `[ws]` Admin
    /// 5. `[]` System program
    /// 6. `[]` SPL Token program
    /// 7. `[]` Rent sysvar
    CreateIcoAta {
        /// Whole tokens to commit to the sale
        amount: u64,
    },

    /// Deposit more tokens into the vault. Only the sale admin may deposit.
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[w]` Vault token account
    /// 1. `[w]` Sale state account
    /// 2. `[]` Sale mint
    /// 3. `[w]` Admin token account for the sale mint
    /// 4. `[ws]` Admin
    /// 5. `[]` SPL Token program
    DepositIcoInAta {
        /// Whole tokens to add to the sale
        amount: u64,
    },

    /// Buy tokens. Transfers `amount * LAMPORTS_PER_TOKEN` lamports from the
    /// buyer to the admin and `amount` whole tokens from the vault to the
    /// buyer.
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[w]` Vault token account
    /// 1. `[w]` Sale state account
    /// 2. `[]` Sale mint
    /// 3. `[w]` Buyer token account for the sale mint, must exist
    /// 4. `[ws]` Buyer
    /// 5. `[w]` Sale admin, receives the payment
    /// 6. `[]` SPL Token program
    /// 7. `[]` System program
    BuyTokens {
        /// Bump seed of the vault address
        vault_bump: u8,
        /// Whole tokens to buy
        amount: u64,
    },
}

impl IcoInstruction {
    /// Sighash of `create_ico_ata`
    pub const CREATE_ICO_ATA_DISCRIMINATOR: [u8; 8] = [66, 83, 250, 92, 218, 161, 143, 223];
    /// Sighash of `deposit_ico_in_ata`
    pub const DEPOSIT_ICO_IN_ATA_DISCRIMINATOR: [u8; 8] = [48, 0, 248, 161, 100, 149, 210, 57];
    /// Sighash of `buy_tokens`
    pub const BUY_TOKENS_DISCRIMINATOR: [u8; 8] = [189, 21, 230, 133, 247, 2, 110, 42];

    /// Packs an [`IcoInstruction`] into a byte array.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(17);
        match self {
            IcoInstruction::CreateIcoAta { amount } => {
                buf.extend_from_slice(&Self::CREATE_ICO_ATA_DISCRIMINATOR);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            IcoInstruction::DepositIcoInAta { amount } => {
                buf.extend_from_slice(&Self::DEPOSIT_ICO_IN_ATA_DISCRIMINATOR);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            IcoInstruction::BuyTokens { vault_bump, amount } => {
                buf.extend_from_slice(&Self::BUY_TOKENS_DISCRIMINATOR);
                buf.push(*vault_bump);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
        }
        buf
    }

    /// Unpacks a byte array into an [`IcoInstruction`].
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        if input.len() < 8 {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (discriminator, rest) = input.split_at(8);
        match (discriminator, rest.len()) {
            (d, 8) if d == Self::CREATE_ICO_ATA_DISCRIMINATOR => Ok(IcoInstruction::CreateIcoAta {
                amount: unpack_u64(rest)?,
            }),
            (d, 8) if d == Self::DEPOSIT_ICO_IN_ATA_DISCRIMINATOR => {
                Ok(IcoInstruction::DepositIcoInAta {
                    amount: unpack_u64(rest)?,
                })
            }
            (d, 9) if d == Self::BUY_TOKENS_DISCRIMINATOR => Ok(IcoInstruction::BuyTokens {
                vault_bump: rest[0],
                amount: unpack_u64(&rest[1..])?,
            }),
            _ => Err(ProgramError::InvalidInstructionData),
        }
    }
}

fn unpack_u64(input: &[u8]) -> Result<u64, ProgramError> {
    input
        .try_into()
        .map(u64::from_le_bytes)
        .map_err(|_| ProgramError::InvalidInstructionData)
}

/// Creates a `CreateIcoAta` instruction.
pub fn create_ico_ata(
    program_id: &Pubkey,
    vault_address: &Pubkey,
    sale_state_address: &Pubkey,
    mint_address: &Pubkey,
    admin_token_account: &Pubkey,
    admin: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*vault_address, false),
        AccountMeta::new(*sale_state_address, false),
        AccountMeta::new_readonly(*mint_address, false),
        AccountMeta::new(*admin_token_account, false),
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: IcoInstruction::CreateIcoAta { amount }.pack(),
    }
}

/// Creates a `DepositIcoInAta` instruction.
pub fn deposit_ico_in_ata(
    program_id: &Pubkey,
    vault_address: &Pubkey,
    sale_state_address: &Pubkey,
    mint_address: &Pubkey,
    admin_token_account: &Pubkey,
    admin: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*vault_address, false),
        AccountMeta::new(*sale_state_address, false),
        AccountMeta::new_readonly(*mint_address, false),
        AccountMeta::new(*admin_token_account, false),
        AccountMeta::new(*admin, true),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: IcoInstruction::DepositIcoInAta { amount }.pack(),
    }
}

/// Creates a `BuyTokens` instruction.
#[allow(clippy::too_many_arguments)]
pub fn buy_tokens(
    program_id: &Pubkey,
    vault_address: &Pubkey,
    vault_bump: u8,
    sale_state_address: &Pubkey,
    mint_address: &Pubkey,
    buyer_token_account: &Pubkey,
    buyer: &Pubkey,
    sale_admin: &Pubkey,
    amount: u64,
) -> Instruction {
    let accounts = vec![
        AccountMeta::new(*vault_address, false),
        AccountMeta::new(*sale_state_address, false),
        AccountMeta::new_readonly(*mint_address, false),
        AccountMeta::new(*buyer_token_account, false),
        AccountMeta::new(*buyer, true),
        AccountMeta::new(*sale_admin, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: IcoInstruction::BuyTokens { vault_bump, amount }.pack(),
    }
}

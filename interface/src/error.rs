//! Error types

use {
    num_derive::FromPrimitive,
    num_traits::FromPrimitive,
    solana_decode_error::DecodeError,
    solana_program_error::ProgramError,
    thiserror::Error,
};

/// Anchor numbers user-defined errors from this offset
pub const ERROR_CODE_OFFSET: u32 = 6000;

/// Errors that may be returned by the ICO program.
#[derive(Clone, Debug, Eq, Error, PartialEq, FromPrimitive)]
#[repr(u32)]
pub enum IcoError {
    // 6000
    /// Checked arithmetic on a token or lamport amount overflowed
    #[error("Arithmetic overflow")]
    Overflow = 6000,
    /// Signer is not the administrator recorded in the sale state
    #[error("Invalid admin")]
    InvalidAdmin,
}

impl IcoError {
    /// Maps a custom program error code back to an [`IcoError`]
    pub fn from_code(code: u32) -> Option<Self> {
        if code < ERROR_CODE_OFFSET {
            return None;
        }
        Self::from_u32(code)
    }
}

impl From<IcoError> for ProgramError {
    fn from(e: IcoError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for IcoError {
    fn type_of() -> &'static str {
        "IcoError"
    }
}

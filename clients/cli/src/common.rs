use {
    crate::{config::Config, output::println_display, Error},
    clap::ArgMatches,
    ico_sale_interface::error::IcoError,
    log::warn,
    solana_clap_v3_utils::keypair::pubkey_from_path,
    solana_client::client_error::ClientError,
    solana_instruction::error::InstructionError,
    solana_pubkey::Pubkey,
    solana_signature::Signature,
    solana_transaction::Transaction,
    solana_transaction_error::TransactionError,
};

pub fn parse_pubkey(value: &str) -> Result<Pubkey, String> {
    parse_address(value, "pubkey")
}

fn parse_address(path: &str, name: &str) -> Result<Pubkey, String> {
    let mut wallet_manager = None;
    pubkey_from_path(&ArgMatches::default(), path, name, &mut wallet_manager)
        .map_err(|_| format!("Failed to load pubkey {} at {}", name, path))
}

/// Parses a whole-token amount entered by the user. Only positive integers
/// are accepted.
pub fn parse_amount(value: &str) -> Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(format!(
            "Invalid amount {:?}, please enter a positive whole number of tokens",
            value
        )),
    }
}

/// Client-side check that `balance` covers a purchase costing `required`
/// lamports. The program enforces payment on its own.
pub fn check_sufficient_funds(balance: u64, required: u64) -> Result<(), Error> {
    if balance < required {
        return Err(format!(
            "Insufficient balance. Need {} SOL including fee, wallet holds {} SOL",
            lamports_to_sol_string(required),
            lamports_to_sol_string(balance)
        )
        .into());
    }
    Ok(())
}

pub fn lamports_to_sol_string(lamports: u64) -> String {
    let sol = lamports / 1_000_000_000;
    let fraction = lamports % 1_000_000_000;
    format!("{}.{:09}", sol, fraction)
}

/// Message of an ICO program error carried by `err`, if any
pub fn program_error_message(err: &TransactionError) -> Option<String> {
    match err {
        TransactionError::InstructionError(index, InstructionError::Custom(code)) => {
            IcoError::from_code(*code)
                .map(|e| format!("instruction {} failed with program error {}: {}", index, code, e))
        }
        _ => None,
    }
}

fn annotate_client_error(err: ClientError) -> Error {
    match err
        .get_transaction_error()
        .as_ref()
        .and_then(program_error_message)
    {
        Some(message) => format!("{} ({})", err, message).into(),
        None => err.into(),
    }
}

pub async fn process_transaction(
    config: &Config,
    transaction: Transaction,
) -> Result<Option<Signature>, Error> {
    if config.dry_run {
        let simulation_data = config.rpc_client.simulate_transaction(&transaction).await?;

        if config.verbose() {
            if let Some(logs) = &simulation_data.value.logs {
                for log in logs {
                    println!("    {}", log);
                }
            }
        }

        if let Some(err) = simulation_data.value.err {
            let err: TransactionError = err.into();
            let message = program_error_message(&err).unwrap_or_else(|| err.to_string());
            return Err(format!("Simulation failed: {}", message).into());
        }

        if config.verbose() {
            println!(
                "\nSimulation succeeded, consumed {} compute units",
                simulation_data.value.units_consumed.unwrap_or_default()
            );
        } else {
            println_display(config, "Simulation succeeded".to_string());
        }

        Ok(None)
    } else {
        let signature = config
            .rpc_client
            .send_and_confirm_transaction_with_spinner(&transaction)
            .await
            .map_err(|err| {
                warn!("Transaction failed: {}", err);
                annotate_client_error(err)
            })?;
        Ok(Some(signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_positive_integers() {
        assert_eq!(parse_amount("1"), Ok(1));
        assert_eq!(parse_amount(" 250 "), Ok(250));
        assert_eq!(parse_amount("18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn parse_amount_rejects_invalid_input() {
        for value in ["", "0", "-3", "1.5", "12abc", "abc", "18446744073709551616"] {
            assert!(parse_amount(value).is_err(), "accepted {:?}", value);
        }
    }

    #[test]
    fn sufficient_funds_boundary() {
        let required = 10 * 1_000_000 + 5_000;
        assert!(check_sufficient_funds(required, required).is_ok());
        assert!(check_sufficient_funds(required + 1, required).is_ok());

        let err = check_sufficient_funds(required - 1, required).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient balance. Need 0.010005000 SOL including fee, wallet holds 0.010004999 SOL"
        );
    }

    #[test]
    fn lamports_formatting() {
        assert_eq!(lamports_to_sol_string(0), "0.000000000");
        assert_eq!(lamports_to_sol_string(1_000_000), "0.001000000");
        assert_eq!(lamports_to_sol_string(2_500_000_001), "2.500000001");
    }

    #[test]
    fn program_errors_are_described() {
        let err = TransactionError::InstructionError(0, InstructionError::Custom(6001));
        assert_eq!(
            program_error_message(&err).unwrap(),
            "instruction 0 failed with program error 6001: Invalid admin"
        );

        let unknown = TransactionError::InstructionError(1, InstructionError::Custom(1));
        assert_eq!(program_error_message(&unknown), None);
        assert_eq!(
            program_error_message(&TransactionError::AccountNotFound),
            None
        );
    }
}

use {
    crate::{config::Config, reader::ListedSale},
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_cli_output::{display::writeln_name_value, OutputFormat, QuietDisplay, VerboseDisplay},
    solana_pubkey::Pubkey,
    std::fmt::{Display, Formatter},
};

/// Sale state as shown to the user
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    #[serde_as(as = "DisplayFromStr")]
    pub sale_state_address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub admin: Pubkey,
    pub total_tokens: u64,
    pub tokens_sold: u64,
    pub available_tokens: u64,
}

impl From<ListedSale> for SaleSummary {
    fn from(sale: ListedSale) -> Self {
        Self {
            sale_state_address: sale.address,
            admin: sale.state.admin,
            total_tokens: sale.state.total_tokens(),
            tokens_sold: sale.state.tokens_sold(),
            available_tokens: sale.state.available_tokens(),
        }
    }
}

impl Display for SaleSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln_name_value(f, "Sale state:", &self.sale_state_address.to_string())?;
        writeln_name_value(f, "Sale admin:", &self.admin.to_string())?;
        writeln_name_value(f, "Total supply:", &format_whole_tokens(self.total_tokens))?;
        writeln_name_value(f, "Tokens sold:", &format_whole_tokens(self.tokens_sold))?;
        writeln_name_value(f, "Available:", &format_whole_tokens(self.available_tokens))
    }
}

pub fn parse_output_format(output_format: &str) -> OutputFormat {
    match output_format {
        "display" => OutputFormat::Display,
        "json" => OutputFormat::Json,
        "json-compact" => OutputFormat::JsonCompact,
        "quiet" => OutputFormat::DisplayQuiet,
        "verbose" => OutputFormat::DisplayVerbose,
        _ => unreachable!(),
    }
}

pub fn println_display(config: &Config, message: String) {
    match config.output_format {
        OutputFormat::Display | OutputFormat::DisplayVerbose => {
            println!("{}", message);
        }
        _ => {}
    }
}

pub fn format_output<T>(config: &Config, command_output: T) -> String
where
    T: serde::Serialize + Display + QuietDisplay + VerboseDisplay,
{
    config.output_format.formatted_string(&command_output)
}

/// Formats a raw token amount using the mint's decimals, e.g. `1.5`
pub fn format_token_amount(raw_amount: u64, decimals: u8) -> String {
    spl_token::amount_to_ui_amount_string_trimmed(raw_amount, decimals)
}

/// Formats whole tokens as `"<amount> tokens"`
pub fn format_whole_tokens(amount: u64) -> String {
    format!("{} tokens", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_summary_from_listed_sale() {
        let admin = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let summary = SaleSummary::from(ListedSale {
            address,
            state: ico_sale_interface::state::SaleState::new(admin, 1_000, 400),
        });
        assert_eq!(summary.sale_state_address, address);
        assert_eq!(summary.admin, admin);
        assert_eq!(summary.total_tokens, 1_000);
        assert_eq!(summary.tokens_sold, 400);
        assert_eq!(summary.available_tokens, 600);
    }

    #[test]
    fn token_amounts_use_mint_decimals() {
        assert_eq!(format_token_amount(0, 9), "0");
        assert_eq!(format_token_amount(1_500_000_000, 9), "1.5");
        assert_eq!(format_token_amount(42_000_000_000, 9), "42");
    }
}

use {
    crate::{cli::Cli, Error},
    anyhow::anyhow,
    clap::{ArgMatches, ValueEnum},
    ico_sale_interface::{FEE_ALLOWANCE_LAMPORTS, LAMPORTS_PER_TOKEN, TOKEN_DECIMALS},
    solana_clap_v3_utils::keypair::{signer_from_path, signer_from_source},
    solana_cli_output::OutputFormat,
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_commitment_config::CommitmentConfig,
    solana_pubkey::Pubkey,
    solana_remote_wallet::remote_wallet::RemoteWalletManager,
    solana_signer::Signer,
    std::{
        path::{Path, PathBuf},
        rc::Rc,
        sync::Arc,
    },
};

/// Who may act as admin when the connected wallet has no sale of its own
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AdminPolicy {
    /// Any wallet may create the sale while none exists
    FirstComer,
    /// Only a wallet whose own sale state exists is admin
    ExistingOnly,
}

/// Sale parameters, fixed for the lifetime of the process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaleConfig {
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub lamports_per_token: u64,
    pub fee_allowance: u64,
    pub token_decimals: u8,
    pub admin_policy: AdminPolicy,
    pub sale_admin: Option<Pubkey>,
}

impl SaleConfig {
    pub fn new(program_id: Pubkey, mint: Pubkey) -> Self {
        Self {
            program_id,
            mint,
            lamports_per_token: LAMPORTS_PER_TOKEN,
            fee_allowance: FEE_ALLOWANCE_LAMPORTS,
            token_decimals: TOKEN_DECIMALS,
            admin_policy: AdminPolicy::FirstComer,
            sale_admin: None,
        }
    }

    /// Lamports a buyer must hold to purchase `amount` whole tokens,
    /// `None` on overflow
    pub fn required_lamports(&self, amount: u64) -> Option<u64> {
        amount
            .checked_mul(self.lamports_per_token)?
            .checked_add(self.fee_allowance)
    }
}

pub struct Config {
    pub rpc_client: Arc<RpcClient>,
    pub fee_payer: Option<Arc<dyn Signer>>,
    pub output_format: OutputFormat,
    pub dry_run: bool,
    pub sale: SaleConfig,
    /// Directory holding the per-wallet operation lock files
    pub lock_dir: PathBuf,
}

impl Config {
    pub fn new(
        cli: Cli,
        matches: ArgMatches,
        wallet_manager: &mut Option<Rc<RemoteWalletManager>>,
    ) -> Result<Self, Error> {
        let program_id = cli.program_id.ok_or_else(|| {
            anyhow!("program id is required, pass --program-id or set ICO_PROGRAM_ID")
        })?;
        let mint = cli
            .mint
            .ok_or_else(|| anyhow!("sale mint is required, pass --mint or set ICO_MINT"))?;

        let cli_config = if let Some(config_file) = &cli.config_file {
            solana_cli_config::Config::load(config_file)
                .map_err(|e| anyhow!("Could not load config file: {}", e))?
        } else if let Some(config_file) = &*solana_cli_config::CONFIG_FILE {
            solana_cli_config::Config::load(config_file).unwrap_or_default()
        } else {
            solana_cli_config::Config::default()
        };

        let lock_dir = lock_dir(
            cli.config_file
                .as_deref()
                .or(solana_cli_config::CONFIG_FILE.as_deref()),
        );

        let rpc_client = Arc::new(RpcClient::new_with_commitment(
            cli.json_rpc_url.unwrap_or(cli_config.json_rpc_url),
            CommitmentConfig::confirmed(),
        ));

        let fee_payer = match &cli.fee_payer {
            Some(fee_payer_source) => {
                signer_from_source(&matches, fee_payer_source, "fee_payer", wallet_manager)
            }
            None => signer_from_path(
                &matches,
                &cli_config.keypair_path,
                "default",
                wallet_manager,
            ),
        }
        .ok()
        .map(Arc::from);

        let output_format = match (cli.output_format, cli.verbose) {
            (Some(format), _) => format,
            (None, true) => OutputFormat::DisplayVerbose,
            (None, false) => OutputFormat::Display,
        };

        let sale = SaleConfig {
            admin_policy: cli.admin_policy,
            sale_admin: cli.sale_admin,
            ..SaleConfig::new(program_id, mint)
        };

        Ok(Self {
            rpc_client,
            fee_payer,
            output_format,
            dry_run: cli.dry_run,
            sale,
            lock_dir,
        })
    }

    /// Returns `Ok(default signer)`, or Err if there is no default signer
    /// configured
    pub fn fee_payer(&self) -> Result<Arc<dyn Signer>, Error> {
        if let Some(fee_payer) = &self.fee_payer {
            Ok(fee_payer.clone())
        } else {
            Err(
                "wallet is required, please specify a valid wallet using the --fee-payer \
                 argument, or by identifying a valid configuration file using the --config \
                 argument, or by creating a valid config at the default location of \
                 ~/.config/solana/cli/config.yml using the solana config command"
                    .to_string()
                    .into(),
            )
        }
    }

    pub fn verbose(&self) -> bool {
        self.output_format == OutputFormat::DisplayVerbose
    }
}

/// Lock files live next to the CLI config file, or in the temp directory
/// when that directory does not exist
fn lock_dir(config_file: Option<&str>) -> PathBuf {
    config_file
        .and_then(|path| Path::new(path).parent())
        .filter(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir)
}

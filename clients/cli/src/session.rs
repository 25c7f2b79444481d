use {
    crate::{
        config::{Config, SaleConfig},
        Error,
    },
    fs2::FileExt,
    log::{debug, info},
    solana_client::nonblocking::rpc_client::RpcClient,
    solana_pubkey::Pubkey,
    solana_signer::Signer,
    std::{
        fs::{File, OpenOptions},
        path::{Path, PathBuf},
        sync::Arc,
    },
};

/// A connected wallet bound to the sale program.
///
/// Only exists while a wallet is available; commands that need to sign build
/// one through [`Session::connect`] and stop if that fails.
pub struct Session {
    pub wallet: Arc<dyn Signer>,
    pub rpc_client: Arc<RpcClient>,
    pub sale: SaleConfig,
    operation_lock: OperationLock,
}

impl Session {
    pub fn connect(config: &Config) -> Result<Self, Error> {
        let wallet = config.fee_payer()?;
        info!(
            "Connected wallet {} to program {} at {}",
            wallet.pubkey(),
            config.sale.program_id,
            config.rpc_client.url()
        );
        let operation_lock = OperationLock::for_wallet(&config.lock_dir, &wallet.pubkey());
        Ok(Self {
            wallet,
            rpc_client: config.rpc_client.clone(),
            sale: config.sale,
            operation_lock,
        })
    }

    pub fn wallet_address(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    /// Marks `operation` as in flight until the returned guard is dropped
    pub fn begin_operation(&self, operation: &'static str) -> Result<OperationGuard, Error> {
        self.operation_lock.try_begin(operation)
    }
}

/// Allows a single mutating operation at a time per wallet, across every
/// process sharing `lock_dir`
#[derive(Clone, Debug)]
pub struct OperationLock {
    path: PathBuf,
}

impl OperationLock {
    pub fn for_wallet(lock_dir: &Path, wallet: &Pubkey) -> Self {
        Self {
            path: lock_dir.join(format!("ico-sale-{}.lock", wallet)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn try_begin(&self, operation: &'static str) -> Result<OperationGuard, Error> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| format!("Could not open lock file {}: {}", self.path.display(), e))?;
        file.try_lock_exclusive().map_err(|e| {
            if e.kind() == fs2::lock_contended_error().kind() {
                format!("Cannot start {}: operation already in progress", operation)
            } else {
                format!("Could not lock {}: {}", self.path.display(), e)
            }
        })?;
        debug!("Started {}, holding {}", operation, self.path.display());
        Ok(OperationGuard {
            _file: file,
            operation,
        })
    }
}

/// Holds the lock file; closing it releases the lock
pub struct OperationGuard {
    _file: File,
    operation: &'static str,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        debug!("Finished {}", self.operation);
    }
}

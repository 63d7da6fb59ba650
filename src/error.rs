use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Estimation failed: {0}")]
    Estimation(String),

    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Price impact too high")]
    PriceImpactTooHigh,

    #[error("Transaction rejected in wallet")]
    UserRejected,

    #[error("Insufficient funds for this transaction")]
    InsufficientFunds,

    #[error("Gas estimation failed: {0}")]
    GasEstimation(String),

    #[error("Execution reverted: {0}")]
    ExecutionReverted(String),

    #[error("Invalid swap path: {0}")]
    InvalidPath(String),

    #[error("Bank account not found")]
    AccountNotFound,

    #[error("Bank verification failed: {0}")]
    BankVerification(String),

    #[error("No verified bank destination on file")]
    MissingBankDestination,

    #[error("Settlement failed")]
    SettlementFailed,

    #[error("Settlement cancelled")]
    SettlementCancelled,

    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("External API error: {0}")]
    ExternalAPI(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::ExternalAPI(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", e))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl AppError {
    /// Errors the user can act on by editing the form and pressing the button
    /// again. Nothing in the engine retries these on its own.
    pub fn is_user_retryable(&self) -> bool {
        !matches!(
            self,
            AppError::SettlementFailed | AppError::SettlementCancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

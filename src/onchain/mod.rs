//! Gateway contract boundary.
//!
//! The gateway is an external, pre-deployed collaborator; this module only
//! invokes its fixed ABI. Everything above it talks to the `GatewayChain`
//! trait so the orchestration stack can run against a fake chain in tests.

pub mod evm;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

use crate::error::AppError;
use crate::error::Result;

/// Parameters shared by all three order entry points.
#[derive(Debug, Clone)]
pub struct OrderParams {
    /// Source token contract. Ignored by the native entry point, where the
    /// amount rides along as transaction value.
    pub token: Address,
    pub amount: U256,
    pub min_output: U256,
    /// Quoted deal rate, fixed-point with two decimal places.
    pub rate: U256,
    /// Liquidity-provider wallet receiving the swapped stable asset.
    pub liquidity_provider: Address,
    /// Always the sender; funds come back here on-chain if the order dies.
    pub refund_address: Address,
}

#[async_trait]
pub trait GatewayChain: Send + Sync {
    /// Read-only multi-hop simulation; result in stable-asset base units.
    async fn estimate_swap_output(&self, path: &[Address], amount_in: U256) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Submit an approval and wait for it to be mined.
    async fn approve(&self, token: Address, amount: U256) -> Result<H256>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    /// Direct order: source already is the stable asset.
    async fn create_order(&self, params: &OrderParams) -> Result<H256>;

    /// Native-asset order: `params.amount` is carried as transaction value.
    async fn create_order_with_swap(&self, params: &OrderParams) -> Result<H256>;

    /// Multi-hop order for any other ERC-20.
    async fn create_order_with_custom_path(
        &self,
        params: &OrderParams,
        path: &[Address],
    ) -> Result<H256>;

    /// Connected wallet address.
    fn sender(&self) -> Address;
}

/// Fold a raw provider/wallet error string into the user-facing taxonomy.
/// Wallets and RPC nodes disagree on wording, so this matches substrings.
pub fn classify_chain_error(raw: &str) -> AppError {
    let lowered = raw.to_ascii_lowercase();

    if lowered.contains("user rejected")
        || lowered.contains("user denied")
        || lowered.contains("rejected the request")
    {
        return AppError::UserRejected;
    }
    if lowered.contains("insufficient funds") || lowered.contains("insufficient balance") {
        return AppError::InsufficientFunds;
    }
    if lowered.contains("insufficient liquidity") {
        return AppError::InsufficientLiquidity;
    }
    if lowered.contains("price impact") {
        return AppError::PriceImpactTooHigh;
    }
    if lowered.contains("cannot estimate gas")
        || lowered.contains("gas required exceeds")
        || lowered.contains("intrinsic gas too low")
    {
        return AppError::GasEstimation(raw.to_string());
    }
    if lowered.contains("revert") {
        return AppError::ExecutionReverted(raw.to_string());
    }
    AppError::BlockchainRPC(raw.to_string())
}

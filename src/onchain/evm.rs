use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};

use super::{classify_chain_error, GatewayChain, OrderParams};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::tokens::parse_address;

abigen!(
    AbokiGateway,
    r#"[
        function createOrder(address token, uint256 amount, uint256 rate, address liquidityProvider, address refundAddress) returns (bytes32)
        function createOrderWithSwap(address tokenOut, uint256 minOutput, uint256 rate, address liquidityProvider, address refundAddress) payable returns (bytes32)
        function createOrderWithCustomPath(address[] path, uint256 amountIn, uint256 minOutput, uint256 rate, address liquidityProvider, address refundAddress) returns (bytes32)
        function estimateSwapOutput(address tokenIn, uint256 amountIn) view returns (uint256)
        function estimateSwapOutputWithPath(address[] path, uint256 amountIn) view returns (uint256)
    ]"#
);

abigen!(
    Erc20,
    r#"[
        function approve(address spender, uint256 amount) returns (bool)
        function allowance(address owner, address spender) view returns (uint256)
        function balanceOf(address owner) view returns (uint256)
    ]"#
);

type EvmClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct EvmGateway {
    client: Arc<EvmClient>,
    gateway_address: Address,
}

impl EvmGateway {
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config.wallet_private_key.as_deref().ok_or_else(|| {
            AppError::Internal("WALLET_PRIVATE_KEY is required for on-chain calls".to_string())
        })?;

        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid RPC URL: {}", e)))?;
        let wallet = key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| AppError::Internal(format!("Invalid wallet key: {}", e)))?
            .with_chain_id(config.chain_id);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            gateway_address: parse_address(&config.gateway_address)?,
        })
    }

    fn gateway(&self) -> AbokiGateway<EvmClient> {
        AbokiGateway::new(self.gateway_address, self.client.clone())
    }

    fn erc20(&self, token: Address) -> Erc20<EvmClient> {
        Erc20::new(token, self.client.clone())
    }
}

#[async_trait]
impl GatewayChain for EvmGateway {
    async fn estimate_swap_output(&self, path: &[Address], amount_in: U256) -> Result<U256> {
        self.gateway()
            .estimate_swap_output_with_path(path.to_vec(), amount_in)
            .call()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))
    }

    async fn allowance(&self, token: Address, owner: Address) -> Result<U256> {
        self.erc20(token)
            .allowance(owner, self.gateway_address)
            .call()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))
    }

    async fn approve(&self, token: Address, amount: U256) -> Result<H256> {
        let call = self.erc20(token).approve(self.gateway_address, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))?;
        let tx_hash = pending.tx_hash();

        // The approval must be mined before the swap can spend it.
        let receipt = pending
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))?
            .ok_or_else(|| AppError::BlockchainRPC("Approval transaction dropped".to_string()))?;
        if receipt.status != Some(1u64.into()) {
            return Err(AppError::ExecutionReverted(format!(
                "Approval reverted in {:?}",
                tx_hash
            )));
        }
        Ok(tx_hash)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.erc20(token)
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))
    }

    async fn create_order(&self, params: &OrderParams) -> Result<H256> {
        let call = self.gateway().create_order(
            params.token,
            params.amount,
            params.rate,
            params.liquidity_provider,
            params.refund_address,
        );
        let pending = call
            .send()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))?;
        // The hash alone is enough to begin settlement tracking; mining is
        // observed off-chain by the remote service.
        Ok(pending.tx_hash())
    }

    async fn create_order_with_swap(&self, params: &OrderParams) -> Result<H256> {
        let call = self
            .gateway()
            .create_order_with_swap(
                params.token,
                params.min_output,
                params.rate,
                params.liquidity_provider,
                params.refund_address,
            )
            .value(params.amount);
        let pending = call
            .send()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))?;
        Ok(pending.tx_hash())
    }

    async fn create_order_with_custom_path(
        &self,
        params: &OrderParams,
        path: &[Address],
    ) -> Result<H256> {
        if path.len() < 2 {
            return Err(AppError::InvalidPath(format!(
                "Path needs at least two hops, got {}",
                path.len()
            )));
        }
        let call = self.gateway().create_order_with_custom_path(
            path.to_vec(),
            params.amount,
            params.min_output,
            params.rate,
            params.liquidity_provider,
            params.refund_address,
        );
        let pending = call
            .send()
            .await
            .map_err(|e| classify_chain_error(&e.to_string()))?;
        Ok(pending.tx_hash())
    }

    fn sender(&self) -> Address {
        self.client.address()
    }
}

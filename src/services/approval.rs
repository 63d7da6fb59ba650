use std::sync::Arc;

use ethers::types::{H256, U256};

use crate::error::Result;
use crate::onchain::GatewayChain;
use crate::tokens::{parse_address, AssetClass, TokenDescriptor};

/// Ensures the gateway may move the source amount from the user's wallet.
///
/// Split into a check and an action so the flow only surfaces an approval
/// step when a transaction will actually be sent; the native asset and a
/// live allowance both skip it.
pub struct ApprovalStep {
    chain: Arc<dyn GatewayChain>,
}

impl ApprovalStep {
    pub fn new(chain: Arc<dyn GatewayChain>) -> Self {
        Self { chain }
    }

    pub async fn needs_approval(
        &self,
        token: &TokenDescriptor,
        required: U256,
    ) -> Result<bool> {
        if token.class == AssetClass::Native {
            return Ok(false);
        }
        let current = self
            .chain
            .allowance(parse_address(token.address)?, self.chain.sender())
            .await?;
        Ok(current < required)
    }

    /// Grants an effectively unlimited allowance so subsequent swaps skip
    /// this step. Blocks until the approval transaction is mined.
    pub async fn approve_unlimited(&self, token: &TokenDescriptor) -> Result<H256> {
        self.chain
            .approve(parse_address(token.address)?, U256::MAX)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::testutil::MockChain;
    use crate::tokens::find_token;

    #[tokio::test]
    async fn native_asset_never_requests_approval() {
        let chain = Arc::new(MockChain::new());
        let step = ApprovalStep::new(chain.clone());
        let eth = find_token("ETH").unwrap();

        // Idempotent: repeated checks succeed without a transaction.
        for _ in 0..2 {
            assert!(!step.needs_approval(eth, U256::from(1_000u64)).await.unwrap());
        }
        assert_eq!(chain.approve_calls(), 0);
    }

    #[tokio::test]
    async fn erc20_approves_unlimited_once() {
        let chain = Arc::new(MockChain::new());
        let step = ApprovalStep::new(chain.clone());
        let usdc = find_token("USDC").unwrap();

        assert!(step.needs_approval(usdc, U256::from(500u64)).await.unwrap());
        step.approve_unlimited(usdc).await.unwrap();
        assert_eq!(chain.approve_calls(), 1);

        // Unlimited allowance now covers any later amount.
        assert!(!step
            .needs_approval(usdc, U256::from(u64::MAX))
            .await
            .unwrap());
        assert_eq!(chain.approve_calls(), 1);
    }

    #[tokio::test]
    async fn wallet_rejection_is_classified() {
        let chain = Arc::new(MockChain::new());
        chain.fail_approvals("user rejected transaction");
        let step = ApprovalStep::new(chain);
        let usdc = find_token("USDC").unwrap();

        let err = step.approve_unlimited(usdc).await.unwrap_err();
        assert!(matches!(err, AppError::UserRejected));
    }
}

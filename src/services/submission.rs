use std::sync::Arc;

use ethers::types::H256;

use crate::constants::{SLIPPAGE_SUBMIT_BPS, TOKEN_USDC};
use crate::error::{AppError, Result};
use crate::models::{RateEstimate, SwapIntent};
use crate::onchain::{GatewayChain, OrderParams};
use crate::tokens::{parse_address, swap_path_to_stable, AssetClass};
use crate::utils::{apply_slippage, scale_rate, to_base_units};

/// Submits exactly one gateway transaction per intent, chosen by the
/// source asset class.
pub struct SwapSubmitter {
    chain: Arc<dyn GatewayChain>,
}

impl SwapSubmitter {
    pub fn new(chain: Arc<dyn GatewayChain>) -> Self {
        Self { chain }
    }

    pub async fn submit(
        &self,
        intent: &SwapIntent,
        estimate: &RateEstimate,
        lp_address: &str,
    ) -> Result<H256> {
        let token = intent.source_token;
        let amount = to_base_units(intent.source_amount, token.decimals)?;

        // Token balances are checked up front; the native balance is left
        // to the node, which rejects underfunded value transfers itself.
        if token.class != AssetClass::Native {
            let held = self
                .chain
                .balance_of(parse_address(token.address)?, self.chain.sender())
                .await?;
            if held < amount {
                return Err(AppError::InsufficientFunds);
            }
        }

        let params = OrderParams {
            token: match token.class {
                // The native entry point targets the stable asset.
                AssetClass::Native => parse_address(TOKEN_USDC)?,
                _ => parse_address(token.address)?,
            },
            amount,
            min_output: match token.class {
                // No conversion, no slippage.
                AssetClass::Stable => amount,
                // Quoted buffer from the estimator.
                AssetClass::Native => estimate.min_amount_out,
                // Wider buffer for the extra hop.
                AssetClass::Erc20 => apply_slippage(estimate.amount_out, SLIPPAGE_SUBMIT_BPS),
            },
            rate: scale_rate(intent.quoted_rate)?,
            liquidity_provider: parse_address(lp_address)?,
            refund_address: self.chain.sender(),
        };

        match token.class {
            AssetClass::Stable => self.chain.create_order(&params).await,
            AssetClass::Native => self.chain.create_order_with_swap(&params).await,
            AssetClass::Erc20 => {
                let path = swap_path_to_stable(token)?;
                self.chain
                    .create_order_with_custom_path(&params, &path)
                    .await
            }
        }
    }
}

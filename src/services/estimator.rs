use std::sync::Arc;

use rust_decimal::Decimal;

use crate::constants::SLIPPAGE_ESTIMATE_BPS;
use crate::error::{AppError, Result};
use crate::models::RateEstimate;
use crate::onchain::GatewayChain;
use crate::tokens::{swap_path_to_stable, AssetClass, TokenDescriptor};
use crate::utils::{apply_slippage, to_base_units};

/// Estimates the stable-asset output for a source token and amount.
pub struct RateEstimator {
    chain: Arc<dyn GatewayChain>,
}

impl RateEstimator {
    pub fn new(chain: Arc<dyn GatewayChain>) -> Self {
        Self { chain }
    }

    /// Point estimate plus minimum acceptable output, in stable base units.
    ///
    /// The stable asset converts by identity with no contract call; it
    /// still needs spending approval later, unlike the native asset.
    pub async fn estimate(
        &self,
        token: &'static TokenDescriptor,
        amount: Decimal,
    ) -> Result<RateEstimate> {
        let amount_in = to_base_units(amount, token.decimals)?;
        if amount_in.is_zero() {
            return Err(AppError::BadRequest("Amount must be positive".to_string()));
        }

        if token.class == AssetClass::Stable {
            return Ok(RateEstimate {
                amount_out: amount_in,
                min_amount_out: amount_in,
                identity: true,
            });
        }

        let path = swap_path_to_stable(token)?;
        let amount_out = self
            .chain
            .estimate_swap_output(&path, amount_in)
            .await
            .map_err(|e| match e {
                AppError::InsufficientLiquidity | AppError::PriceImpactTooHigh => e,
                AppError::ExecutionReverted(msg) | AppError::BlockchainRPC(msg) => {
                    AppError::Estimation(msg)
                }
                other => other,
            })?;

        if amount_out.is_zero() {
            return Err(AppError::InsufficientLiquidity);
        }

        Ok(RateEstimate {
            amount_out,
            min_amount_out: apply_slippage(amount_out, SLIPPAGE_ESTIMATE_BPS),
            identity: false,
        })
    }
}

// Amount and rate conversion helpers shared by the estimator, the
// submission step, and the CLI.

use ethers::types::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::{BPS_DENOMINATOR, RATE_SCALE};
use crate::error::{AppError, Result};

/// Convert a human-entered decimal amount into base units of a token.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256> {
    if amount.is_sign_negative() {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }
    let mut scaled = amount;
    scaled.rescale(decimals);
    if scaled.scale() != decimals {
        return Err(AppError::BadRequest(format!(
            "Amount {} cannot be represented in {} decimals",
            amount, decimals
        )));
    }
    let mantissa = scaled.mantissa();
    if mantissa < 0 {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }
    Ok(U256::from(mantissa as u128))
}

/// Convert base units back into a display decimal.
pub fn from_base_units(amount: U256, decimals: u32) -> Result<Decimal> {
    let raw: u128 = amount
        .try_into()
        .map_err(|_| AppError::Internal("Amount exceeds displayable range".to_string()))?;
    if raw > i128::MAX as u128 {
        return Err(AppError::Internal(
            "Amount exceeds displayable range".to_string(),
        ));
    }
    let mut value = Decimal::from_i128_with_scale(raw as i128, decimals);
    value.normalize_assign();
    Ok(value)
}

/// Apply a slippage buffer: returns the minimum acceptable output for a
/// point estimate. Strictly below the estimate for any positive input.
pub fn apply_slippage(estimate: U256, bps: u64) -> U256 {
    estimate * U256::from(BPS_DENOMINATOR - bps) / U256::from(BPS_DENOMINATOR)
}

/// Scale a quoted fiat rate to the fixed-point integer the gateway expects.
pub fn scale_rate(rate: Decimal) -> Result<U256> {
    if rate <= Decimal::ZERO {
        return Err(AppError::BadRequest("Rate must be positive".to_string()));
    }
    let mut scaled = rate;
    scaled.rescale(RATE_SCALE);
    let mantissa = scaled
        .mantissa()
        .to_u128()
        .ok_or_else(|| AppError::Internal("Rate out of range".to_string()))?;
    Ok(U256::from(mantissa))
}

/// Parse the amount field of a swap form. Rejects empty, non-numeric and
/// non-positive entries before an intent is created.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Amount is required".to_string()));
    }
    let amount: Decimal = trimmed
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid amount: {}", input)))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("Amount must be positive".to_string()));
    }
    Ok(amount)
}

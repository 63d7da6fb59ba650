use ethers::types::Address;
use serde::{Deserialize, Serialize};

use crate::constants::{TOKEN_CNGN, TOKEN_NATIVE, TOKEN_USDC, TOKEN_WETH};
use crate::error::{AppError, Result};

/// How the gateway treats a source asset. Drives approval requirements and
/// the choice of order entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// Base currency of the chain, sent as transaction value. No approval.
    Native,
    /// The USD-pegged settlement token. Approval required, no conversion.
    Stable,
    /// Any other ERC-20. Approval required, swapped through a hop path.
    Erc20,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub symbol: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub decimals: u32,
    pub class: AssetClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyDescriptor {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

// Static reference data; never mutated at runtime.
pub const TOKENS: &[TokenDescriptor] = &[
    TokenDescriptor {
        symbol: "ETH",
        name: "Ether",
        address: TOKEN_NATIVE,
        decimals: 18,
        class: AssetClass::Native,
    },
    TokenDescriptor {
        symbol: "WETH",
        name: "Wrapped Ether",
        address: TOKEN_WETH,
        decimals: 18,
        class: AssetClass::Erc20,
    },
    TokenDescriptor {
        symbol: "USDC",
        name: "USD Coin",
        address: TOKEN_USDC,
        decimals: 6,
        class: AssetClass::Stable,
    },
    TokenDescriptor {
        symbol: "CNGN",
        name: "Crypto Naira",
        address: TOKEN_CNGN,
        decimals: 6,
        class: AssetClass::Erc20,
    },
];

pub const CURRENCIES: &[CurrencyDescriptor] = &[
    CurrencyDescriptor {
        code: "NGN",
        name: "Nigerian Naira",
        symbol: "₦",
    },
    CurrencyDescriptor {
        code: "GHS",
        name: "Ghanaian Cedi",
        symbol: "₵",
    },
    CurrencyDescriptor {
        code: "KES",
        name: "Kenyan Shilling",
        symbol: "KSh",
    },
];

pub fn find_token(symbol: &str) -> Result<&'static TokenDescriptor> {
    let wanted = symbol.trim().to_ascii_uppercase();
    TOKENS
        .iter()
        .find(|t| t.symbol == wanted)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported token: {}", symbol)))
}

pub fn find_currency(code: &str) -> Result<&'static CurrencyDescriptor> {
    let wanted = code.trim().to_ascii_uppercase();
    CURRENCIES
        .iter()
        .find(|c| c.code == wanted)
        .ok_or_else(|| AppError::BadRequest(format!("Unsupported currency: {}", code)))
}

pub fn parse_address(value: &str) -> Result<Address> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| AppError::Internal(format!("Invalid address {}: {}", value, e)))
}

/// Fixed hop path from a source token to the stable settlement asset.
///
/// The native asset and WETH swap directly against USDC; every other ERC-20
/// routes through the wrapped-native intermediate because no direct pool is
/// guaranteed to exist.
pub fn swap_path_to_stable(token: &TokenDescriptor) -> Result<Vec<Address>> {
    let usdc = parse_address(TOKEN_USDC)?;
    let weth = parse_address(TOKEN_WETH)?;

    match token.class {
        AssetClass::Stable => Err(AppError::InvalidPath(
            "Stable asset needs no swap path".to_string(),
        )),
        AssetClass::Native => Ok(vec![weth, usdc]),
        AssetClass::Erc20 => {
            let source = parse_address(token.address)?;
            if source == weth {
                Ok(vec![weth, usdc])
            } else {
                Ok(vec![source, weth, usdc])
            }
        }
    }
}

pub fn stable_token() -> &'static TokenDescriptor {
    TOKENS
        .iter()
        .find(|t| t.class == AssetClass::Stable)
        .expect("registry always contains the stable asset")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_token_is_case_insensitive() {
        assert_eq!(find_token("usdc").unwrap().symbol, "USDC");
        assert_eq!(find_token(" Eth ").unwrap().class, AssetClass::Native);
        assert!(find_token("DOGE").is_err());
    }

    #[test]
    fn stable_asset_has_no_swap_path() {
        let usdc = find_token("USDC").unwrap();
        assert!(swap_path_to_stable(usdc).is_err());
    }

    #[test]
    fn native_path_is_single_hop_through_weth() {
        let eth = find_token("ETH").unwrap();
        let path = swap_path_to_stable(eth).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], parse_address(TOKEN_WETH).unwrap());
        assert_eq!(path[1], parse_address(TOKEN_USDC).unwrap());
    }

    #[test]
    fn other_erc20_routes_through_wrapped_native() {
        let cngn = find_token("CNGN").unwrap();
        let path = swap_path_to_stable(cngn).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], parse_address(TOKEN_WETH).unwrap());
    }
}

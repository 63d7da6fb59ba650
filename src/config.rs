use serde::Deserialize;
use std::env;

use crate::constants::{DEFAULT_API_BASE_URL, SETTLEMENT_POLL_INTERVAL_SECS};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Environment
    pub environment: String,

    // Remote API
    pub api_base_url: String,

    // Blockchain
    pub rpc_url: String,
    pub chain_id: u64,
    pub gateway_address: String,

    // Wallet. Optional so read-only commands (rates, history) work without
    // a signer configured.
    pub wallet_private_key: Option<String>,

    // Local device store
    pub storage_path: String,

    // Settlement polling
    pub poll_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            api_base_url: env::var("ABOKI_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),

            rpc_url: env::var("RPC_URL")?,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| "8453".to_string())
                .parse()?,
            gateway_address: env::var("GATEWAY_ADDRESS")?,

            wallet_private_key: env::var("WALLET_PRIVATE_KEY").ok(),

            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| ".aboki-store.json".to_string()),

            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(SETTLEMENT_POLL_INTERVAL_SECS),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("ABOKI_API_BASE_URL is empty");
        }
        if self.rpc_url.trim().is_empty() {
            anyhow::bail!("RPC_URL is empty");
        }
        if self.gateway_address.trim().is_empty() {
            anyhow::bail!("GATEWAY_ADDRESS is empty");
        }

        if self.gateway_address.starts_with("0x0000") {
            tracing::warn!("Using placeholder gateway contract address");
        }
        if self.wallet_private_key.is_none() {
            tracing::warn!("No wallet key configured; swap submission is disabled");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        if self.environment == "development" || self.environment == "testnet" {
            return true;
        }
        // Base Sepolia
        self.chain_id == 84532
    }
}

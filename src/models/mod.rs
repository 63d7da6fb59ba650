pub mod bank;
pub mod swap;

pub use bank::{BankDestination, Institution, VerifiedAccount};
pub use swap::{
    OrderStatus, RateEstimate, SettlementStatus, SwapIntent, SwapProgress, SwapStage,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer session obtained by exchanging the wallet address with the remote
/// auth endpoint. Mirrored into the local store for the session lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub bearer_token: String,
    pub expires_at: DateTime<Utc>,
    pub wallet_address: String,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Moment at which the proactive one-shot refresh fires.
    pub fn refresh_deadline(&self) -> DateTime<Utc> {
        self.expires_at - chrono::Duration::seconds(crate::constants::AUTH_REFRESH_LEAD_SECS)
    }
}

/// Liquidity-provider destination issued by the offramp API for one order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositAddress {
    pub order_id: String,
    pub lp_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_type: String,
    pub status: String,
    pub token: String,
    pub amount: String,
    pub fiat_currency: Option<String>,
    pub fiat_amount: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
    pub order_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

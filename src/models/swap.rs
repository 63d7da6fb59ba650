use ethers::types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BankDestination;
use crate::tokens::TokenDescriptor;

/// One user-confirmed swap request. Immutable once handed to the
/// orchestrator; discarded when the flow closes or completes.
#[derive(Debug, Clone)]
pub struct SwapIntent {
    pub source_token: &'static TokenDescriptor,
    pub source_amount: Decimal,
    pub fiat_currency: String,
    pub quoted_rate: Decimal,
    pub bank_destination: Option<BankDestination>,
}

/// Point estimate plus the minimum acceptable output after the slippage
/// buffer, both in base units of the stable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateEstimate {
    pub amount_out: U256,
    pub min_amount_out: U256,
    /// True when the source already is the stable asset and no contract
    /// call was made.
    pub identity: bool,
}

/// Explicit stage machine for one in-flight swap. Replaces the scattered
/// boolean flags of the original flow; every derived "is X in progress"
/// question is answered from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStage {
    Estimating,
    Approval,
    Swap,
    Converting,
    Complete,
}

impl SwapStage {
    pub fn percent_complete(&self) -> u8 {
        match self {
            SwapStage::Estimating => 10,
            SwapStage::Approval => 30,
            SwapStage::Swap => 55,
            SwapStage::Converting => 80,
            SwapStage::Complete => 100,
        }
    }
}

/// Live progress of the single active swap in a session.
#[derive(Debug, Clone)]
pub struct SwapProgress {
    pub stage: SwapStage,
    pub transaction_hash: Option<String>,
    pub settlement_order_id: Option<String>,
    pub settlement_status: Option<OrderStatus>,
}

impl SwapProgress {
    pub fn new() -> Self {
        Self {
            stage: SwapStage::Estimating,
            transaction_hash: None,
            settlement_order_id: None,
            settlement_status: None,
        }
    }

    pub fn percent_complete(&self) -> u8 {
        self.stage.percent_complete()
    }
}

impl Default for SwapProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Remote settlement status vocabulary. Unknown strings are preserved so a
/// new backend status keeps the poller looping instead of crashing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => OrderStatus::Pending,
            "PROCESSING" => OrderStatus::Processing,
            "COMPLETED" => OrderStatus::Completed,
            "FAILED" => OrderStatus::Failed,
            "CANCELLED" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One response from the order status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementStatus {
    pub status: OrderStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default, rename = "transactionHash")]
    pub transaction_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_parses_case_insensitively() {
        assert_eq!(OrderStatus::from("completed".to_string()), OrderStatus::Completed);
        assert_eq!(OrderStatus::from(" FAILED ".to_string()), OrderStatus::Failed);
        assert_eq!(
            OrderStatus::from("SETTLING".to_string()),
            OrderStatus::Other("SETTLING".to_string())
        );
    }

    #[test]
    fn only_completed_failed_cancelled_are_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Other("SETTLING".to_string()).is_terminal());
    }

    #[test]
    fn stage_progress_is_monotonic() {
        let stages = [
            SwapStage::Estimating,
            SwapStage::Approval,
            SwapStage::Swap,
            SwapStage::Converting,
            SwapStage::Complete,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].percent_complete() < pair[1].percent_complete());
        }
        assert_eq!(SwapStage::Complete.percent_complete(), 100);
    }
}

use serde::Deserialize;

use super::{DepositAddressRequest, HttpApi};
use crate::error::Result;
use crate::models::{DepositAddress, SettlementStatus};

#[derive(Debug, Deserialize)]
struct DepositAddressData {
    #[serde(rename = "orderId")]
    order_id: String,
    // Field name kept from the remote contract: the "deposit address" is
    // the liquidity provider's wallet that receives the swapped stable
    // asset for matching against the fiat payout.
    #[serde(rename = "lpAddress", alias = "depositAddress")]
    lp_address: String,
}

impl HttpApi {
    /// Issue an offramp order and obtain the liquidity-provider routing
    /// address the gateway transaction must target.
    pub async fn create_deposit_address(
        &self,
        req: &DepositAddressRequest,
    ) -> Result<DepositAddress> {
        let data: DepositAddressData = self
            .post_json("offramp/deposit-address", req, "deposit address")
            .await?;
        Ok(DepositAddress {
            order_id: data.order_id,
            lp_address: data.lp_address,
        })
    }

    pub async fn fetch_order_status(&self, order_id: &str) -> Result<SettlementStatus> {
        self.get_json(
            &format!("offramp/orders/{}/status", order_id),
            &[],
            "order status",
        )
        .await
    }

    /// Tell the remote service to begin tracking the paired fiat payout.
    pub async fn notify_start_tracking(&self, order_id: &str) -> Result<()> {
        self.post_empty(
            &format!("offramp/orders/{}/start-polling", order_id),
            "start tracking",
        )
        .await
    }

    /// Best-effort counterpart fired on completion or teardown.
    pub async fn notify_stop_tracking(&self, order_id: &str) -> Result<()> {
        self.post_empty(
            &format!("offramp/orders/{}/stop-polling", order_id),
            "stop tracking",
        )
        .await
    }
}

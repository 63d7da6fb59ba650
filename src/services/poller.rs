//! Off-chain settlement poller.
//!
//! Once the swap transaction hash exists, the paired fiat payout is
//! tracked by interval-polling the order status endpoint until a terminal
//! state. Teardown is structural: dropping the handle aborts the task, so
//! no timer outlives its owner.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::AbokiApi;
use crate::error::{AppError, Result};
use crate::models::OrderStatus;

pub struct SettlementPoller {
    api: Arc<dyn AbokiApi>,
    interval: Duration,
}

impl SettlementPoller {
    pub fn new(api: Arc<dyn AbokiApi>, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Poll until the settlement reaches a terminal state.
    ///
    /// Returns the settlement transaction reference on `COMPLETED`.
    /// `FAILED` and `CANCELLED` halt with the matching error. A transient
    /// query failure is logged and the loop continues; there is no retry
    /// cap and no overall timeout.
    pub async fn run(&self, order_id: &str) -> Result<String> {
        if let Err(e) = self.api.start_tracking(order_id).await {
            tracing::warn!("Start-tracking notification failed for {}: {}", order_id, e);
        }

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;

            let status = match self.api.order_status(order_id).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("Transient status query failure for {}: {}", order_id, e);
                    continue;
                }
            };

            tracing::debug!(
                "Order {} status {} ({}%)",
                order_id,
                status.status.as_str(),
                status.progress
            );

            match status.status {
                OrderStatus::Completed => {
                    if let Err(e) = self.api.stop_tracking(order_id).await {
                        tracing::warn!("Stop-tracking notification failed: {}", e);
                    }
                    return Ok(status.transaction_hash.unwrap_or_default());
                }
                OrderStatus::Failed => return Err(AppError::SettlementFailed),
                OrderStatus::Cancelled => return Err(AppError::SettlementCancelled),
                _ => {}
            }
        }
    }

    /// Run the poll loop as an owned task.
    pub fn spawn(&self, order_id: &str) -> PollerHandle {
        let poller = SettlementPoller {
            api: self.api.clone(),
            interval: self.interval,
        };
        let id = order_id.to_string();
        let task_id = id.clone();
        let task = tokio::spawn(async move { poller.run(&task_id).await });
        PollerHandle {
            order_id: id,
            api: self.api.clone(),
            task: Some(task),
            detached: false,
        }
    }
}

/// Owning handle for one in-flight poll loop.
pub struct PollerHandle {
    order_id: String,
    api: Arc<dyn AbokiApi>,
    task: Option<JoinHandle<Result<String>>>,
    detached: bool,
}

impl PollerHandle {
    /// Wait for the settlement to reach a terminal state.
    ///
    /// The task stays owned by the handle while waiting, so abandoning
    /// this future (flow teardown mid-conversion) still runs the drop
    /// teardown instead of orphaning the poll loop.
    pub async fn wait(mut self) -> Result<String> {
        let task = self.task.as_mut().expect("task present until consumed");
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(AppError::Internal(format!("Poller task failed: {}", e))),
        };
        self.task = None;
        self.detached = true;
        result
    }

    /// Stop local polling but leave remote settlement tracking untouched.
    /// This is the "minimize during conversion" affordance: the settlement
    /// proceeds server-side and can be picked up from order history.
    pub fn minimize(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.detached = true;
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Best-effort stop-tracking on teardown.
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            let api = self.api.clone();
            let order_id = self.order_id.clone();
            rt.spawn(async move {
                if let Err(e) = api.stop_tracking(&order_id).await {
                    tracing::debug!("Teardown stop-tracking failed for {}: {}", order_id, e);
                }
            });
        }
    }
}

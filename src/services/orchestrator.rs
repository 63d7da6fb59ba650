//! Token→fiat swap orchestrator.
//!
//! Drives one intent through estimate → bank gate → approval → submission
//! → settlement polling. Stages advance strictly forward; every failure is
//! caught at its stage boundary and leaves the flow in a retryable state.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::H256;

use crate::api::{AbokiApi, DepositAddressRequest};
use crate::error::{AppError, Result};
use crate::models::{
    BankDestination, Institution, OrderStatus, RateEstimate, SwapIntent, SwapProgress, SwapStage,
};
use crate::onchain::GatewayChain;
use crate::services::approval::ApprovalStep;
use crate::services::bank_resolver::{BankDestinationResolver, BankGate};
use crate::services::estimator::RateEstimator;
use crate::services::poller::SettlementPoller;
use crate::services::submission::SwapSubmitter;
use crate::utils::to_base_units;

/// Result of confirming an intent against the bank gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Ready,
    /// Swap paused; run the verification sub-flow, then call `execute`
    /// directly. The flow resumes at confirmation, not at estimation.
    VerificationRequired,
}

#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub transaction_hash: H256,
    pub order_id: String,
    /// Transaction reference of the fiat settlement.
    pub settlement_reference: String,
}

struct PendingSwap {
    intent: SwapIntent,
    estimate: RateEstimate,
    destination: Option<BankDestination>,
}

pub struct SwapOrchestrator {
    api: Arc<dyn AbokiApi>,
    estimator: RateEstimator,
    approval: ApprovalStep,
    submitter: SwapSubmitter,
    bank_gate: BankDestinationResolver,
    poll_interval: Duration,

    progress: SwapProgress,
    stage_history: Vec<SwapStage>,
    pending: Option<PendingSwap>,
    tx_in_flight: bool,
    deposit_fetch_in_flight: bool,
}

impl SwapOrchestrator {
    pub fn new(
        chain: Arc<dyn GatewayChain>,
        api: Arc<dyn AbokiApi>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            estimator: RateEstimator::new(chain.clone()),
            approval: ApprovalStep::new(chain.clone()),
            submitter: SwapSubmitter::new(chain),
            bank_gate: BankDestinationResolver::new(api.clone()),
            api,
            poll_interval,
            progress: SwapProgress::new(),
            stage_history: vec![SwapStage::Estimating],
            pending: None,
            tx_in_flight: false,
            deposit_fetch_in_flight: false,
        }
    }

    pub fn progress(&self) -> &SwapProgress {
        &self.progress
    }

    pub fn stage_history(&self) -> &[SwapStage] {
        &self.stage_history
    }

    /// Whether the flow may be closed right now. Closing during conversion
    /// is a minimize: remote settlement tracking is left untouched.
    pub fn can_close(&self) -> bool {
        close_allowed(
            self.progress.stage,
            self.tx_in_flight,
            self.deposit_fetch_in_flight,
        )
    }

    fn set_stage(&mut self, stage: SwapStage) {
        tracing::info!(
            "Swap stage {:?} → {:?} ({}%)",
            self.progress.stage,
            stage,
            stage.percent_complete()
        );
        self.progress.stage = stage;
        self.stage_history.push(stage);
    }

    /// Stage 1: produce a usable estimate. The flow stays in `Estimating`
    /// until this succeeds; the primary action stays disabled without it.
    pub async fn quote(&mut self, intent: &SwapIntent) -> Result<RateEstimate> {
        self.progress = SwapProgress::new();
        self.stage_history = vec![SwapStage::Estimating];
        self.pending = None;
        self.estimator
            .estimate(intent.source_token, intent.source_amount)
            .await
    }

    /// Confirmation gate: a settlement-ready bank destination must exist
    /// before anything is submitted on-chain.
    pub async fn confirm(
        &mut self,
        intent: SwapIntent,
        estimate: RateEstimate,
    ) -> Result<Confirmation> {
        let gate = self.bank_gate.resolve(intent.bank_destination.as_ref()).await?;
        let (destination, confirmation) = match gate {
            BankGate::Ready(dest) => (Some(dest), Confirmation::Ready),
            BankGate::VerificationRequired => (None, Confirmation::VerificationRequired),
        };
        self.pending = Some(PendingSwap {
            intent,
            estimate,
            destination,
        });
        Ok(confirmation)
    }

    pub async fn institutions(&self) -> Result<Vec<Institution>> {
        self.bank_gate.institutions().await
    }

    /// Verification sub-flow completion: attaches the verified destination
    /// to the paused swap so `execute` can pick up where it stopped.
    pub async fn complete_verification(
        &mut self,
        institution: &Institution,
        account_number: &str,
    ) -> Result<BankDestination> {
        let destination = self.bank_gate.verify(institution, account_number).await?;
        if let Some(pending) = self.pending.as_mut() {
            pending.destination = Some(destination.clone());
        }
        Ok(destination)
    }

    /// Stages 2-5: approval (when needed), deposit-address fetch, on-chain
    /// submission, then settlement polling to a terminal state.
    pub async fn execute(&mut self) -> Result<SwapOutcome> {
        let (intent, estimate, destination) = {
            let pending = self
                .pending
                .as_ref()
                .ok_or_else(|| AppError::BadRequest("No confirmed swap to execute".to_string()))?;
            let destination = pending
                .destination
                .clone()
                .ok_or(AppError::MissingBankDestination)?;
            (pending.intent.clone(), pending.estimate, destination)
        };

        let token = intent.source_token;
        let amount_in = to_base_units(intent.source_amount, token.decimals)?;

        // Approval stage only appears when an approval transaction is
        // actually needed; native assets and live allowances skip it.
        if self.approval.needs_approval(token, amount_in).await? {
            self.set_stage(SwapStage::Approval);
            self.tx_in_flight = true;
            let result = self.approval.approve_unlimited(token).await;
            self.tx_in_flight = false;
            result?;
        }

        self.set_stage(SwapStage::Swap);

        // Closing is blocked while this fetch is in flight: an issued
        // deposit address implies a live order on the remote side.
        self.deposit_fetch_in_flight = true;
        let deposit = self
            .api
            .request_deposit_address(&DepositAddressRequest {
                token: token.symbol.to_string(),
                amount: intent.source_amount.to_string(),
                currency: intent.fiat_currency.clone(),
                account_number: destination.account_number.clone(),
                bank_code: destination.bank_code.clone(),
                account_name: destination.account_name.clone(),
            })
            .await;
        self.deposit_fetch_in_flight = false;
        let deposit = deposit?;
        self.progress.settlement_order_id = Some(deposit.order_id.clone());

        self.tx_in_flight = true;
        let submitted = self
            .submitter
            .submit(&intent, &estimate, &deposit.lp_address)
            .await;
        self.tx_in_flight = false;
        let tx_hash = submitted?;
        self.progress.transaction_hash = Some(format!("{:?}", tx_hash));

        // The hash alone starts off-chain tracking; mining is observed by
        // the remote service.
        self.set_stage(SwapStage::Converting);
        let poller = SettlementPoller::new(self.api.clone(), self.poll_interval);
        let settlement = poller.spawn(&deposit.order_id).wait().await;

        let reference = match settlement {
            Ok(reference) => reference,
            Err(e) => {
                self.progress.settlement_status = Some(match e {
                    AppError::SettlementFailed => OrderStatus::Failed,
                    AppError::SettlementCancelled => OrderStatus::Cancelled,
                    _ => OrderStatus::Other("UNKNOWN".to_string()),
                });
                self.pending = None;
                return Err(e);
            }
        };

        self.progress.settlement_status = Some(OrderStatus::Completed);
        self.set_stage(SwapStage::Complete);
        self.pending = None;

        Ok(SwapOutcome {
            transaction_hash: tx_hash,
            order_id: deposit.order_id,
            settlement_reference: reference,
        })
    }
}

/// Close policy: a pending blockchain transaction or deposit-address fetch
/// blocks close; everything else, including conversion, allows it.
fn close_allowed(stage: SwapStage, tx_in_flight: bool, deposit_fetch_in_flight: bool) -> bool {
    match stage {
        SwapStage::Approval | SwapStage::Swap => !tx_in_flight && !deposit_fetch_in_flight,
        SwapStage::Estimating | SwapStage::Converting | SwapStage::Complete => true,
    }
}

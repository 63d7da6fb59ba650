//! In-memory fakes for the chain and API seams, used across service tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use rust_decimal::Decimal;

use crate::api::{AbokiApi, DepositAddressRequest};
use crate::error::{AppError, Result};
use crate::models::{
    AuthSession, BankDestination, DepositAddress, HistoryQuery, Institution, OrderRecord,
    OrderStatus, Paginated, SettlementStatus, VerifiedAccount,
};
use crate::onchain::{classify_chain_error, GatewayChain, OrderParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmittedOrder {
    Direct,
    WithSwap,
    CustomPath(usize),
}

pub struct MockChain {
    sender: Address,
    estimate_output: Mutex<U256>,
    estimate_error: Mutex<Option<String>>,
    estimate_calls: AtomicUsize,
    allowance: Mutex<U256>,
    balance: Mutex<U256>,
    approve_calls: AtomicUsize,
    approve_error: Mutex<Option<String>>,
    submit_error: Mutex<Option<String>>,
    pub orders: Mutex<Vec<SubmittedOrder>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            sender: Address::from_low_u64_be(0xBEEF),
            estimate_output: Mutex::new(U256::from(1_000_000u64)),
            estimate_error: Mutex::new(None),
            estimate_calls: AtomicUsize::new(0),
            allowance: Mutex::new(U256::zero()),
            balance: Mutex::new(U256::MAX),
            approve_calls: AtomicUsize::new(0),
            approve_error: Mutex::new(None),
            submit_error: Mutex::new(None),
            orders: Mutex::new(Vec::new()),
        }
    }

    pub fn set_estimate_output(&self, value: U256) {
        *self.estimate_output.lock().unwrap() = value;
    }

    pub fn fail_estimates(&self, raw_error: &str) {
        *self.estimate_error.lock().unwrap() = Some(raw_error.to_string());
    }

    pub fn set_allowance(&self, value: U256) {
        *self.allowance.lock().unwrap() = value;
    }

    pub fn set_balance(&self, value: U256) {
        *self.balance.lock().unwrap() = value;
    }

    pub fn fail_approvals(&self, raw_error: &str) {
        *self.approve_error.lock().unwrap() = Some(raw_error.to_string());
    }

    pub fn fail_submissions(&self, raw_error: &str) {
        *self.submit_error.lock().unwrap() = Some(raw_error.to_string());
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimate_calls.load(Ordering::SeqCst)
    }

    pub fn approve_calls(&self) -> usize {
        self.approve_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SubmittedOrder> {
        self.orders.lock().unwrap().clone()
    }

    fn record_order(&self, order: SubmittedOrder) -> Result<H256> {
        if let Some(raw) = self.submit_error.lock().unwrap().as_deref() {
            return Err(classify_chain_error(raw));
        }
        self.orders.lock().unwrap().push(order);
        Ok(H256::from_low_u64_be(0xABC))
    }
}

#[async_trait]
impl GatewayChain for MockChain {
    async fn estimate_swap_output(&self, _path: &[Address], _amount_in: U256) -> Result<U256> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(raw) = self.estimate_error.lock().unwrap().as_deref() {
            return Err(classify_chain_error(raw));
        }
        Ok(*self.estimate_output.lock().unwrap())
    }

    async fn allowance(&self, _token: Address, _owner: Address) -> Result<U256> {
        Ok(*self.allowance.lock().unwrap())
    }

    async fn approve(&self, _token: Address, amount: U256) -> Result<H256> {
        self.approve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(raw) = self.approve_error.lock().unwrap().as_deref() {
            return Err(classify_chain_error(raw));
        }
        *self.allowance.lock().unwrap() = amount;
        Ok(H256::from_low_u64_be(0xA11))
    }

    async fn balance_of(&self, _token: Address, _owner: Address) -> Result<U256> {
        Ok(*self.balance.lock().unwrap())
    }

    async fn create_order(&self, _params: &OrderParams) -> Result<H256> {
        self.record_order(SubmittedOrder::Direct)
    }

    async fn create_order_with_swap(&self, _params: &OrderParams) -> Result<H256> {
        self.record_order(SubmittedOrder::WithSwap)
    }

    async fn create_order_with_custom_path(
        &self,
        _params: &OrderParams,
        path: &[Address],
    ) -> Result<H256> {
        self.record_order(SubmittedOrder::CustomPath(path.len()))
    }

    fn sender(&self) -> Address {
        self.sender
    }
}

pub fn ready_destination() -> BankDestination {
    BankDestination {
        account_name: "Ada Obi".to_string(),
        account_number: "0123456789".to_string(),
        bank_name: "GTBank".to_string(),
        bank_code: "058".to_string(),
        country: "NG".to_string(),
        account_type: "savings".to_string(),
    }
}

pub struct MockApi {
    pub bank: Mutex<Option<BankDestination>>,
    pub statuses: Mutex<VecDeque<SettlementStatus>>,
    pub status_calls: AtomicUsize,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub verify_fails_with_not_found: Mutex<bool>,
    pub auth_calls: AtomicUsize,
    pub session_ttl: Mutex<chrono::Duration>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            bank: Mutex::new(Some(ready_destination())),
            statuses: Mutex::new(VecDeque::new()),
            status_calls: AtomicUsize::new(0),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            verify_fails_with_not_found: Mutex::new(false),
            auth_calls: AtomicUsize::new(0),
            session_ttl: Mutex::new(chrono::Duration::hours(1)),
        }
    }

    pub fn without_bank_details(self) -> Self {
        *self.bank.lock().unwrap() = None;
        self
    }

    pub fn queue_status(&self, status: OrderStatus, progress: u8, tx_hash: Option<&str>) {
        self.statuses.lock().unwrap().push_back(SettlementStatus {
            status,
            progress,
            transaction_hash: tx_hash.map(|s| s.to_string()),
        });
    }

    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AbokiApi for MockApi {
    async fn authenticate(&self, wallet_address: &str) -> Result<AuthSession> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthSession {
            bearer_token: format!("token-{}", self.auth_calls.load(Ordering::SeqCst)),
            expires_at: chrono::Utc::now() + *self.session_ttl.lock().unwrap(),
            wallet_address: wallet_address.to_string(),
        })
    }

    async fn set_session_token(&self, _token: &str) {}

    async fn clear_session_token(&self) {}

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        Ok(vec![Institution {
            name: "GTBank".to_string(),
            code: "058".to_string(),
            country: "NG".to_string(),
        }])
    }

    async fn verify_account(
        &self,
        bank_code: &str,
        account_number: &str,
    ) -> Result<VerifiedAccount> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if *self.verify_fails_with_not_found.lock().unwrap() {
            return Err(AppError::AccountNotFound);
        }
        Ok(VerifiedAccount {
            account_name: "Ada Obi".to_string(),
            account_number: account_number.to_string(),
            bank_code: bank_code.to_string(),
        })
    }

    async fn bank_details(&self) -> Result<Option<BankDestination>> {
        Ok(self.bank.lock().unwrap().clone())
    }

    async fn conversion_rate(&self, _token: &str, _currency: &str) -> Result<Decimal> {
        Ok(Decimal::from(1595))
    }

    async fn request_deposit_address(
        &self,
        _req: &DepositAddressRequest,
    ) -> Result<DepositAddress> {
        Ok(DepositAddress {
            order_id: "order-1".to_string(),
            lp_address: format!("{:?}", Address::from_low_u64_be(0x1122)),
        })
    }

    async fn order_status(&self, _order_id: &str) -> Result<SettlementStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.statuses.lock().unwrap();
        if queue.len() > 1 {
            Ok(queue.pop_front().expect("non-empty"))
        } else {
            queue
                .front()
                .cloned()
                .ok_or_else(|| AppError::ExternalAPI("no status queued".to_string()))
        }
    }

    async fn start_tracking(&self, _order_id: &str) -> Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_tracking(&self, _order_id: &str) -> Result<()> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn order_history(&self, query: &HistoryQuery) -> Result<Paginated<OrderRecord>> {
        Ok(Paginated {
            items: Vec::new(),
            page: query.page.max(1),
            limit: query.limit,
            total: 0,
        })
    }
}

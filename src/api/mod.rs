//! Client for the remote Aboki REST API.
//!
//! Every response is normalized into an explicit typed shape at this
//! boundary; the loose `data.data` duck-typing of the remote service never
//! leaks past this module.

pub mod auth;
pub mod banks;
pub mod offramp;
pub mod orders;
pub mod rates;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants::{API_CONNECT_TIMEOUT_SECS, API_REQUEST_TIMEOUT_SECS};
use crate::error::{AppError, Result};
use crate::models::{
    AuthSession, BankDestination, DepositAddress, HistoryQuery, Institution, OrderRecord,
    Paginated, SettlementStatus, VerifiedAccount,
};

/// Everything the engine needs from the remote service, as one seam so the
/// orchestrator and poller can run against an in-memory fake in tests.
#[async_trait]
pub trait AbokiApi: Send + Sync {
    async fn authenticate(&self, wallet_address: &str) -> Result<AuthSession>;

    /// Adopt a bearer token restored from the local store.
    async fn set_session_token(&self, token: &str);
    async fn clear_session_token(&self);

    async fn list_institutions(&self) -> Result<Vec<Institution>>;
    async fn verify_account(
        &self,
        bank_code: &str,
        account_number: &str,
    ) -> Result<VerifiedAccount>;
    async fn bank_details(&self) -> Result<Option<BankDestination>>;

    async fn conversion_rate(&self, token: &str, currency: &str) -> Result<Decimal>;

    async fn request_deposit_address(&self, req: &DepositAddressRequest) -> Result<DepositAddress>;
    async fn order_status(&self, order_id: &str) -> Result<SettlementStatus>;
    async fn start_tracking(&self, order_id: &str) -> Result<()>;
    async fn stop_tracking(&self, order_id: &str) -> Result<()>;

    async fn order_history(&self, query: &HistoryQuery) -> Result<Paginated<OrderRecord>>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressRequest {
    pub token: String,
    pub amount: String,
    pub currency: String,
    pub account_number: String,
    pub bank_code: String,
    pub account_name: String,
}

/// Response envelope used by every Aboki endpoint. `success`/`status` vary
/// by endpoint, so both are tolerated and folded into one check.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: Option<bool>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub(crate) fn into_data(self, context: &str) -> Result<T> {
        let failed = self.success == Some(false)
            || self
                .status
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("error"))
                .unwrap_or(false);
        if failed {
            return Err(AppError::ExternalAPI(format!(
                "{}: {}",
                context,
                self.message.unwrap_or_else(|| "request failed".to_string())
            )));
        }
        self.data
            .ok_or_else(|| AppError::ExternalAPI(format!("{}: empty response body", context)))
    }
}

pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
    bearer_token: RwLock<Option<String>>,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(API_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(API_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("HTTP client init failed: {}", e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bearer_token: RwLock::new(None),
        })
    }

    pub async fn set_bearer_token(&self, token: &str) {
        *self.bearer_token.write().await = Some(token.to_string());
    }

    pub async fn clear_bearer_token(&self) {
        *self.bearer_token.write().await = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token.read().await.as_deref() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T> {
        let req = self.client.get(self.url(path)).query(query);
        let resp = self.authorize(req).await.send().await?;
        Self::decode(resp, context).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        context: &str,
    ) -> Result<T> {
        let req = self.client.post(self.url(path)).json(body);
        let resp = self.authorize(req).await.send().await?;
        Self::decode(resp, context).await
    }

    pub(crate) async fn post_empty(&self, path: &str, context: &str) -> Result<()> {
        let req = self.client.post(self.url(path));
        let resp = self.authorize(req).await.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Self::status_error(status, &body, context))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response, context: &str) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body, context));
        }
        let envelope: Envelope<T> = resp.json().await.map_err(|e| {
            AppError::ExternalAPI(format!("{}: malformed response: {}", context, e))
        })?;
        envelope.into_data(context)
    }

    fn status_error(status: StatusCode, body: &str, context: &str) -> AppError {
        let message = extract_message(body).unwrap_or_else(|| status.to_string());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(message),
            _ => AppError::ExternalAPI(format!("{}: {}", context, message)),
        }
    }
}

#[async_trait]
impl AbokiApi for HttpApi {
    async fn authenticate(&self, wallet_address: &str) -> Result<AuthSession> {
        self.authenticate_wallet(wallet_address).await
    }

    async fn set_session_token(&self, token: &str) {
        self.set_bearer_token(token).await;
    }

    async fn clear_session_token(&self) {
        self.clear_bearer_token().await;
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        self.fetch_institutions().await
    }

    async fn verify_account(
        &self,
        bank_code: &str,
        account_number: &str,
    ) -> Result<VerifiedAccount> {
        self.verify_bank_account(bank_code, account_number).await
    }

    async fn bank_details(&self) -> Result<Option<BankDestination>> {
        self.fetch_bank_details().await
    }

    async fn conversion_rate(&self, token: &str, currency: &str) -> Result<Decimal> {
        self.fetch_conversion_rate(token, currency).await
    }

    async fn request_deposit_address(&self, req: &DepositAddressRequest) -> Result<DepositAddress> {
        self.create_deposit_address(req).await
    }

    async fn order_status(&self, order_id: &str) -> Result<SettlementStatus> {
        self.fetch_order_status(order_id).await
    }

    async fn start_tracking(&self, order_id: &str) -> Result<()> {
        self.notify_start_tracking(order_id).await
    }

    async fn stop_tracking(&self, order_id: &str) -> Result<()> {
        self.notify_stop_tracking(order_id).await
    }

    async fn order_history(&self, query: &HistoryQuery) -> Result<Paginated<OrderRecord>> {
        self.fetch_order_history(query).await
    }
}

/// Pull a human-readable message out of an error body, if there is one.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

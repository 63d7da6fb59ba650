use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;

use super::HttpApi;
use crate::error::{AppError, Result};
use crate::models::AuthSession;

#[derive(Debug, Deserialize)]
struct DirectAuthData {
    token: String,
    /// Seconds of validity. Some deployments return an absolute
    /// `expiresAt` instead; both are accepted.
    #[serde(default, rename = "expiresIn")]
    expires_in: Option<i64>,
    #[serde(default, rename = "expiresAt")]
    expires_at: Option<chrono::DateTime<Utc>>,
}

impl HttpApi {
    /// Exchange a wallet address for a bearer token. The remote service
    /// trusts the connected wallet provider for possession of the address.
    pub async fn authenticate_wallet(&self, wallet_address: &str) -> Result<AuthSession> {
        let address = wallet_address.trim();
        if address.is_empty() {
            return Err(AppError::Auth("Wallet address is empty".to_string()));
        }

        let data: DirectAuthData = self
            .post_json(
                "auth/direct-wallet-auth",
                &json!({ "walletAddress": address }),
                "wallet auth",
            )
            .await
            .map_err(|e| match e {
                AppError::ExternalAPI(msg) => AppError::Auth(msg),
                other => other,
            })?;

        let expires_at = match (data.expires_at, data.expires_in) {
            (Some(at), _) => at,
            (None, Some(secs)) => Utc::now() + Duration::seconds(secs),
            (None, None) => Utc::now() + Duration::hours(24),
        };

        let session = AuthSession {
            bearer_token: data.token,
            expires_at,
            wallet_address: address.to_string(),
        };
        self.set_bearer_token(&session.bearer_token).await;
        Ok(session)
    }

    pub async fn logout(&self) {
        self.clear_bearer_token().await;
    }
}

//! Local device store.
//!
//! The browser front-end kept session scraps in localStorage under ad hoc
//! string keys. This is the same data as a JSON file behind typed accessors,
//! so callers never touch raw keys. Access is single-threaded per session;
//! two processes sharing one store file can still race (last write wins),
//! which mirrors the unresolved multi-tab behavior of the original.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::constants::{
    KEY_AUTH_TOKEN, KEY_CURRENT_ORDER_ID, KEY_ESTIMATED_USDC, KEY_ORDER_STATUS, KEY_ORDER_TYPE,
    KEY_TOKEN_EXPIRY, KEY_WALLET_ADDRESS,
};
use crate::error::{AppError, Result};

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Storage(format!("Corrupt store file: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    /// Best-effort persistence: a failed write is logged, never fatal. The
    /// store only mirrors session state that can be refetched.
    fn persist(&self) {
        match serde_json::to_string_pretty(&self.values) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!("Failed to persist local store: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize local store: {}", e),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }

    // ---- typed accessors ----

    pub fn auth_token(&self) -> Option<&str> {
        self.get(KEY_AUTH_TOKEN)
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.set(KEY_AUTH_TOKEN, token.to_string());
    }

    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.get(KEY_TOKEN_EXPIRY)
            .and_then(|raw| raw.parse::<DateTime<Utc>>().ok())
    }

    pub fn set_token_expiry(&mut self, expiry: DateTime<Utc>) {
        self.set(KEY_TOKEN_EXPIRY, expiry.to_rfc3339());
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.get(KEY_WALLET_ADDRESS)
    }

    pub fn set_wallet_address(&mut self, address: &str) {
        self.set(KEY_WALLET_ADDRESS, address.to_string());
    }

    pub fn current_order_id(&self) -> Option<&str> {
        self.get(KEY_CURRENT_ORDER_ID)
    }

    pub fn set_current_order(&mut self, order_id: &str, status: &str, order_type: &str) {
        self.set(KEY_CURRENT_ORDER_ID, order_id.to_string());
        self.set(KEY_ORDER_STATUS, status.to_string());
        self.set(KEY_ORDER_TYPE, order_type.to_string());
    }

    pub fn order_status(&self) -> Option<&str> {
        self.get(KEY_ORDER_STATUS)
    }

    pub fn set_order_status(&mut self, status: &str) {
        self.set(KEY_ORDER_STATUS, status.to_string());
    }

    pub fn estimated_usdc(&self) -> Option<&str> {
        self.get(KEY_ESTIMATED_USDC)
    }

    pub fn set_estimated_usdc(&mut self, amount: &str) {
        self.set(KEY_ESTIMATED_USDC, amount.to_string());
    }

    pub fn clear_order(&mut self) {
        self.remove(KEY_CURRENT_ORDER_ID);
        self.remove(KEY_ORDER_STATUS);
        self.remove(KEY_ORDER_TYPE);
        self.remove(KEY_ESTIMATED_USDC);
    }

    /// Drops everything tied to the authenticated session. Used on logout
    /// and on detected token expiry.
    pub fn clear_session(&mut self) {
        self.remove(KEY_AUTH_TOKEN);
        self.remove(KEY_TOKEN_EXPIRY);
        self.remove(KEY_WALLET_ADDRESS);
        self.clear_order();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn temp_store() -> LocalStore {
        let path = std::env::temp_dir().join(format!(
            "aboki-store-test-{}-{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let _ = std::fs::remove_file(&path);
        LocalStore::open(path).unwrap()
    }

    #[test]
    fn round_trips_session_values() {
        let mut store = temp_store();
        store.set_auth_token("token-123");
        store.set_wallet_address("0xabc");
        let expiry = Utc::now() + Duration::hours(1);
        store.set_token_expiry(expiry);

        let reopened = LocalStore::open(&store.path).unwrap();
        assert_eq!(reopened.auth_token(), Some("token-123"));
        assert_eq!(reopened.wallet_address(), Some("0xabc"));
        assert_eq!(
            reopened.token_expiry().unwrap().timestamp(),
            expiry.timestamp()
        );
        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn clear_session_removes_order_state_too() {
        let mut store = temp_store();
        store.set_auth_token("t");
        store.set_current_order("order-1", "PENDING", "offramp");
        store.set_estimated_usdc("100");
        store.clear_session();
        assert!(store.auth_token().is_none());
        assert!(store.current_order_id().is_none());
        assert!(store.order_status().is_none());
        assert!(store.estimated_usdc().is_none());
        let _ = std::fs::remove_file(&store.path);
    }
}

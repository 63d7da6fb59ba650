//! Wallet-address session lifecycle.
//!
//! Authentication is a bearer-token exchange keyed on the wallet address.
//! The token and its expiry are mirrored into the local store so a later
//! run can restore the session, and a one-shot refresh task re-authenticates
//! shortly before expiry.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::api::AbokiApi;
use crate::error::Result;
use crate::models::AuthSession;
use crate::services::SharedStore;

pub struct SessionManager {
    api: Arc<dyn AbokiApi>,
    store: SharedStore,
    // Shared with the refresh task so a proactive refresh replaces the
    // live session, not just the stored copy.
    session: Arc<Mutex<Option<AuthSession>>>,
    refresh_task: Option<JoinHandle<()>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn AbokiApi>, store: SharedStore) -> Self {
        Self {
            api,
            store,
            session: Arc::new(Mutex::new(None)),
            refresh_task: None,
        }
    }

    pub fn session(&self) -> Option<AuthSession> {
        self.session.lock().expect("session lock").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .lock()
            .expect("session lock")
            .as_ref()
            .map(|s| !s.is_expired(Utc::now()))
            .unwrap_or(false)
    }

    /// Exchange the wallet address for a bearer session, persist it, and
    /// schedule the proactive refresh.
    pub async fn login(&mut self, wallet_address: &str) -> Result<()> {
        let session = self.api.authenticate(wallet_address).await?;
        self.api.set_session_token(&session.bearer_token).await;
        self.adopt(session);
        Ok(())
    }

    /// Rehydrate a previous session from the local store. Expired or
    /// incomplete entries are ignored and cleared.
    pub async fn restore(&mut self) -> Result<bool> {
        let stored = {
            let store = self.store.lock().expect("store lock");
            match (
                store.auth_token().map(str::to_string),
                store.token_expiry(),
                store.wallet_address().map(str::to_string),
            ) {
                (Some(token), Some(expiry), Some(wallet)) => Some(AuthSession {
                    bearer_token: token,
                    expires_at: expiry,
                    wallet_address: wallet,
                }),
                _ => None,
            }
        };

        let Some(session) = stored else {
            return Ok(false);
        };
        if session.is_expired(Utc::now()) {
            tracing::info!("Stored session for {} has expired", session.wallet_address);
            self.store.lock().expect("store lock").clear_session();
            return Ok(false);
        }

        self.api.set_session_token(&session.bearer_token).await;
        self.adopt(session);
        Ok(true)
    }

    pub async fn logout(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        *self.session.lock().expect("session lock") = None;
        self.api.clear_session_token().await;
        self.store.lock().expect("store lock").clear_session();
    }

    fn adopt(&mut self, session: AuthSession) {
        {
            let mut store = self.store.lock().expect("store lock");
            store.set_auth_token(&session.bearer_token);
            store.set_token_expiry(session.expires_at);
            store.set_wallet_address(&session.wallet_address);
        }
        self.schedule_refresh(&session);
        *self.session.lock().expect("session lock") = Some(session);
    }

    /// One-shot refresh shortly before expiry. Re-authenticating replaces
    /// the task, so at most one refresh is ever pending.
    fn schedule_refresh(&mut self, session: &AuthSession) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }

        let lead = session.refresh_deadline() - Utc::now();
        let Ok(delay) = lead.to_std() else {
            // Deadline already passed; refresh on next login instead of
            // hammering the auth endpoint from here.
            tracing::warn!(
                "Session for {} is within its refresh window",
                session.wallet_address
            );
            return;
        };

        let api = self.api.clone();
        let store = self.store.clone();
        let slot = self.session.clone();
        let wallet = session.wallet_address.clone();
        self.refresh_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match api.authenticate(&wallet).await {
                Ok(refreshed) => {
                    api.set_session_token(&refreshed.bearer_token).await;
                    {
                        let mut store = store.lock().expect("store lock");
                        store.set_auth_token(&refreshed.bearer_token);
                        store.set_token_expiry(refreshed.expires_at);
                    }
                    *slot.lock().expect("session lock") = Some(refreshed);
                    tracing::info!("Session refreshed for {}", wallet);
                }
                Err(e) => {
                    tracing::warn!("Session refresh failed for {}: {}", wallet, e);
                }
            }
        }));
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::MockApi;
    use crate::storage::LocalStore;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn temp_store(name: &str) -> SharedStore {
        let path = std::env::temp_dir().join(format!(
            "aboki-session-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Arc::new(Mutex::new(LocalStore::open(path).unwrap()))
    }

    #[tokio::test]
    async fn login_persists_the_session() {
        let api = Arc::new(MockApi::new());
        let store = temp_store("login");
        let mut manager = SessionManager::new(api.clone(), store.clone());

        manager.login("0xwallet").await.unwrap();

        assert!(manager.is_authenticated());
        let store = store.lock().unwrap();
        assert_eq!(store.auth_token(), Some("token-1"));
        assert_eq!(store.wallet_address(), Some("0xwallet"));
        assert!(store.token_expiry().is_some());
    }

    #[tokio::test]
    async fn restore_adopts_an_unexpired_session() {
        let api = Arc::new(MockApi::new());
        let store = temp_store("restore");
        {
            let mut first = SessionManager::new(api.clone(), store.clone());
            first.login("0xwallet").await.unwrap();
        }

        let mut second = SessionManager::new(api.clone(), store);
        assert!(second.restore().await.unwrap());
        assert!(second.is_authenticated());
        // Restored from the store, not re-authenticated.
        assert_eq!(api.auth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn proactive_refresh_replaces_the_live_session() {
        let api = Arc::new(MockApi::new());
        // Expiry just past the refresh lead, so the one-shot task fires
        // almost immediately.
        *api.session_ttl.lock().unwrap() = chrono::Duration::milliseconds(300_050);
        let store = temp_store("refresh");
        let mut manager = SessionManager::new(api.clone(), store.clone());

        manager.login("0xwallet").await.unwrap();
        let first_expiry = manager.session().unwrap().expires_at;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(api.auth_calls.load(Ordering::SeqCst), 2);
        // The live session was replaced, not just the stored copy.
        assert!(manager.session().unwrap().expires_at > first_expiry);
        assert!(manager.is_authenticated());
        assert_eq!(store.lock().unwrap().auth_token(), Some("token-2"));
    }

    #[tokio::test]
    async fn restore_rejects_an_expired_session() {
        let api = Arc::new(MockApi::new());
        let store = temp_store("expired");
        {
            let mut s = store.lock().unwrap();
            s.set_auth_token("stale");
            s.set_token_expiry(Utc::now() - chrono::Duration::hours(1));
            s.set_wallet_address("0xwallet");
        }

        let mut manager = SessionManager::new(api, store.clone());
        assert!(!manager.restore().await.unwrap());
        assert!(!manager.is_authenticated());
        // The stale entries were cleared.
        assert!(store.lock().unwrap().auth_token().is_none());
    }

    #[tokio::test]
    async fn restore_with_empty_store_is_a_no_op() {
        let api = Arc::new(MockApi::new());
        let mut manager = SessionManager::new(api, temp_store("empty"));
        assert!(!manager.restore().await.unwrap());
    }

    #[tokio::test]
    async fn logout_clears_session_and_store() {
        let api = Arc::new(MockApi::new());
        let store = temp_store("logout");
        let mut manager = SessionManager::new(api, store.clone());

        manager.login("0xwallet").await.unwrap();
        manager.logout().await;

        assert!(!manager.is_authenticated());
        let store = store.lock().unwrap();
        assert!(store.auth_token().is_none());
        assert!(store.wallet_address().is_none());
    }
}

use std::sync::Arc;

use crate::api::AbokiApi;
use crate::constants::{HISTORY_DEFAULT_PAGE_SIZE, HISTORY_MAX_PAGE_SIZE};
use crate::error::Result;
use crate::models::{HistoryQuery, OrderRecord, Paginated};
use crate::services::SharedStore;

/// Last order this device touched, rehydrated from the local store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastKnownOrder {
    pub order_id: String,
    pub status: Option<String>,
    pub estimated_usdc: Option<String>,
}

/// Paginated order history plus the locally remembered current order.
pub struct OrderHistoryService {
    api: Arc<dyn AbokiApi>,
    store: SharedStore,
}

impl OrderHistoryService {
    pub fn new(api: Arc<dyn AbokiApi>, store: SharedStore) -> Self {
        Self { api, store }
    }

    pub async fn list(&self, query: &HistoryQuery) -> Result<Paginated<OrderRecord>> {
        let query = HistoryQuery {
            page: query.page.max(1),
            limit: normalize_limit(query.limit),
            status: query.status.clone(),
            order_type: query.order_type.clone(),
        };
        self.api.order_history(&query).await
    }

    /// Remember the order an in-flight swap produced so a later run can
    /// point the user back at it.
    pub fn remember_current(&self, order_id: &str, status: &str, order_type: &str) {
        self.store
            .lock()
            .expect("store lock")
            .set_current_order(order_id, status, order_type);
    }

    pub fn remember_estimate(&self, estimated_usdc: &str) {
        self.store
            .lock()
            .expect("store lock")
            .set_estimated_usdc(estimated_usdc);
    }

    pub fn update_status(&self, status: &str) {
        self.store
            .lock()
            .expect("store lock")
            .set_order_status(status);
    }

    pub fn last_known_order(&self) -> Option<LastKnownOrder> {
        let store = self.store.lock().expect("store lock");
        let order_id = store.current_order_id()?.to_string();
        Some(LastKnownOrder {
            order_id,
            status: store.order_status().map(str::to_string),
            estimated_usdc: store.estimated_usdc().map(str::to_string),
        })
    }

    pub fn forget_current(&self) {
        self.store.lock().expect("store lock").clear_order();
    }
}

fn normalize_limit(limit: u32) -> u32 {
    if limit == 0 {
        HISTORY_DEFAULT_PAGE_SIZE
    } else {
        limit.min(HISTORY_MAX_PAGE_SIZE)
    }
}

use serde::Deserialize;

use super::HttpApi;
use crate::constants::{HISTORY_DEFAULT_PAGE_SIZE, HISTORY_MAX_PAGE_SIZE};
use crate::error::Result;
use crate::models::{HistoryQuery, OrderRecord, Paginated};

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(default)]
    orders: Vec<OrderRecord>,
    #[serde(default)]
    total: u64,
}

impl HttpApi {
    /// Order history with pagination and optional status/type filters.
    pub async fn fetch_order_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Paginated<OrderRecord>> {
        let (page, limit) = clamp_page(query.page, query.limit);

        let mut params = vec![
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(status) = &query.status {
            params.push(("status", status.clone()));
        }
        if let Some(order_type) = &query.order_type {
            params.push(("type", order_type.clone()));
        }

        let data: HistoryData = self
            .get_json("offramp/orders", &params, "order history")
            .await?;

        Ok(Paginated {
            items: data.orders,
            page,
            limit,
            total: data.total,
        })
    }
}

fn clamp_page(page: u32, limit: u32) -> (u32, u32) {
    let page = page.max(1);
    let limit = if limit == 0 {
        HISTORY_DEFAULT_PAGE_SIZE
    } else {
        limit.min(HISTORY_MAX_PAGE_SIZE)
    };
    (page, limit)
}

use rust_decimal::Decimal;
use serde_json::Value;

use super::HttpApi;
use crate::error::{AppError, Result};

impl HttpApi {
    /// Quoted exchange rate, source token → fiat currency.
    ///
    /// The endpoint's payload shape drifted over time: `data` is sometimes
    /// a bare number or string, sometimes an object carrying a `rate`
    /// field. All of them normalize to a `Decimal` right here.
    pub async fn fetch_conversion_rate(&self, token: &str, currency: &str) -> Result<Decimal> {
        let data: Value = self
            .get_json(
                "rates/conversion",
                &[
                    ("token", token.to_string()),
                    ("currency", currency.to_string()),
                ],
                "rate lookup",
            )
            .await?;

        parse_rate_payload(&data).ok_or_else(|| {
            AppError::ExternalAPI(format!("rate lookup: unrecognized payload: {}", data))
        })
    }
}

fn parse_rate_payload(data: &Value) -> Option<Decimal> {
    let candidate = match data {
        Value::Object(map) => map.get("rate").or_else(|| map.get("data"))?,
        other => other,
    };
    let rate = match candidate {
        Value::String(s) => s.trim().parse::<Decimal>().ok()?,
        Value::Number(n) => n.to_string().parse::<Decimal>().ok()?,
        Value::Object(inner) => return parse_rate_payload(&Value::Object(inner.clone())),
        _ => return None,
    };
    (rate > Decimal::ZERO).then_some(rate)
}

//! Exchange-rate maintenance for `res.currency`.
//!
//! The feed is caller-supplied ([`RateFeed`]): fetch and parse the source
//! (e.g. the ECB daily reference rates) however fits the application, then
//! let [`update_exchange_rates`] reconcile it against the server's currency
//! records through any client.

use crate::api::ModelApi;
use crate::error::Error;
use chrono::NaiveDate;
use odoo_rpc_core::{CallOptions, SearchQuery};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// One day's exchange rates relative to a base currency.
#[derive(Clone, Debug, PartialEq)]
pub struct RateFeed {
    /// Date the rates are valid for.
    pub date: NaiveDate,
    /// Currency the rates are expressed against; it carries the fixed
    /// rate 1.
    pub base: String,
    /// Quoted rates by currency code.
    pub rates: BTreeMap<String, f64>,
}

impl RateFeed {
    /// Create an empty feed for `date` with `base` as the base currency.
    pub fn new<S: Into<String>>(date: NaiveDate, base: S) -> Self {
        Self {
            date,
            base: base.into(),
            rates: BTreeMap::new(),
        }
    }

    /// Add one quoted rate.
    pub fn rate<S: Into<String>>(mut self, code: S, rate: f64) -> Self {
        self.rates.insert(code.into(), rate);
        self
    }

    /// The rate for `code`: 1 for the base currency, the quoted rate
    /// otherwise.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        if code == self.base {
            Some(1.0)
        } else {
            self.rates.get(code).copied()
        }
    }
}

/// Create `res.currency.rate` records for every currency whose stored rate
/// is older than the feed.
///
/// Currencies without a feed rate are left alone. A stored `date` counts
/// as older when it is absent (the server reports an empty field as
/// `false`) or strictly before the feed date. Returns the applied rates by
/// currency code.
pub async fn update_exchange_rates<C: ModelApi>(
    client: &mut C,
    feed: &RateFeed,
) -> Result<BTreeMap<String, f64>, Error> {
    let currencies = client
        .search_read("res.currency", SearchQuery::new(), CallOptions::new())
        .await?;

    let mut updated = BTreeMap::new();
    let rows = match currencies {
        Value::Array(rows) => rows,
        // The web search_read endpoint wraps its rows.
        Value::Object(mut wrapper) => match wrapper.remove("records") {
            Some(Value::Array(rows)) => rows,
            _ => return Ok(updated),
        },
        _ => return Ok(updated),
    };

    for row in rows {
        let Some(code) = row.get("name").and_then(Value::as_str) else {
            continue;
        };
        let Some(rate) = feed.rate_for(code) else {
            continue;
        };
        if stored_date(&row).is_some_and(|stored| stored >= feed.date) {
            continue; // already up to date
        }

        let mut fields = Map::new();
        fields.insert(
            "currency_id".to_string(),
            row.get("id").cloned().unwrap_or(Value::Null),
        );
        fields.insert("name".to_string(), json!(format!("{} 00:00:00", feed.date)));
        fields.insert("rate".to_string(), json!(rate));
        client.create("res.currency.rate", fields).await?;

        updated.insert(code.to_string(), rate);
    }
    Ok(updated)
}

/// The record's `date` field as a date; `false`, absent, or unparseable
/// all count as no stored date.
fn stored_date(row: &Value) -> Option<NaiveDate> {
    row.get("date")
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct MockApi {
        currencies: Value,
        creates: Vec<(String, Map<String, Value>)>,
    }

    impl MockApi {
        fn new(currencies: Value) -> Self {
            Self {
                currencies,
                creates: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ModelApi for MockApi {
        async fn search_read(
            &mut self,
            _model: &str,
            _query: SearchQuery,
            _options: CallOptions,
        ) -> Result<Value, Error> {
            Ok(self.currencies.clone())
        }

        async fn read(
            &mut self,
            _model: &str,
            _ids: Value,
            _fields: Vec<String>,
            _options: CallOptions,
        ) -> Result<Value, Error> {
            Ok(Value::Null)
        }

        async fn create(
            &mut self,
            model: &str,
            fields: Map<String, Value>,
        ) -> Result<Value, Error> {
            self.creates.push((model.to_string(), fields));
            Ok(json!(901))
        }
    }

    fn feed() -> RateFeed {
        RateFeed::new(NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(), "EUR")
            .rate("NOK", 11.4)
            .rate("USD", 1.08)
    }

    #[test]
    fn test_base_currency_rate_is_one() {
        assert_eq!(feed().rate_for("EUR"), Some(1.0));
        assert_eq!(feed().rate_for("NOK"), Some(11.4));
        assert_eq!(feed().rate_for("XYZ"), None);
    }

    #[tokio::test]
    async fn test_creates_rates_for_stale_currencies() {
        let mut api = MockApi::new(json!([
            {"id": 1, "name": "NOK", "date": "2026-01-10"},
            {"id": 2, "name": "EUR", "date": false},
            {"id": 3, "name": "USD", "date": "2026-02-03"},
        ]));

        let updated = update_exchange_rates(&mut api, &feed()).await.unwrap();

        assert_eq!(updated.get("NOK"), Some(&11.4));
        assert_eq!(updated.get("EUR"), Some(&1.0)); // no stored date, base rate
        assert_eq!(updated.get("USD"), None); // same-day rate already stored

        assert_eq!(api.creates.len(), 2);
        let (model, fields) = &api.creates[0];
        assert_eq!(model, "res.currency.rate");
        assert_eq!(fields["currency_id"], json!(1));
        assert_eq!(fields["name"], json!("2026-02-03 00:00:00"));
        assert_eq!(fields["rate"], json!(11.4));
    }

    #[tokio::test]
    async fn test_unwraps_the_web_endpoint_result() {
        let mut api = MockApi::new(json!({
            "length": 1,
            "records": [{"id": 1, "name": "NOK", "date": false}],
        }));

        let updated = update_exchange_rates(&mut api, &feed()).await.unwrap();

        assert_eq!(updated.get("NOK"), Some(&11.4));
        assert_eq!(api.creates.len(), 1);
    }

    #[tokio::test]
    async fn test_skips_currencies_without_feed_rate() {
        let mut api = MockApi::new(json!([
            {"id": 9, "name": "XYZ", "date": false},
        ]));

        let updated = update_exchange_rates(&mut api, &feed()).await.unwrap();

        assert!(updated.is_empty());
        assert!(api.creates.is_empty());
    }

    #[tokio::test]
    async fn test_newer_stored_rate_is_kept() {
        let mut api = MockApi::new(json!([
            {"id": 1, "name": "NOK", "date": "2026-02-04"},
        ]));

        let updated = update_exchange_rates(&mut api, &feed()).await.unwrap();

        assert!(updated.is_empty());
        assert!(api.creates.is_empty());
    }
}
